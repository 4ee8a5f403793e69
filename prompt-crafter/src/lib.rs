//! Compose system prompts from titled sections.

use std::fmt;

/// A component of a prompt.
pub trait PromptComponent {
    /// The text this component contributes to the prompt.
    fn render(&self) -> String;
}

/// A prompt made of components separated by blank lines.
pub struct Prompt {
    components: Vec<Box<dyn PromptComponent>>,
}

impl Prompt {
    pub fn builder() -> PromptBuilder {
        PromptBuilder::new()
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .components
            .iter()
            .map(|c| c.render())
            .collect::<Vec<String>>()
            .join("\n\n");
        f.write_str(&rendered)
    }
}

/// A builder for creating prompts.
#[derive(Default)]
pub struct PromptBuilder {
    components: Vec<Box<dyn PromptComponent>>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, component: impl PromptComponent + 'static) -> Self {
        self.components.push(Box::new(component));
        self
    }

    pub fn build(self) -> Prompt {
        Prompt {
            components: self.components,
        }
    }
}

fn section(title: &str, text: &str) -> String {
    format!("### {} ###\n{}", title, text.trim())
}

macro_rules! section_component {
    ($(#[$doc:meta])* $name:ident, $title:literal) => {
        $(#[$doc])*
        pub struct $name {
            text: String,
        }

        impl $name {
            pub fn new(text: &str) -> Self {
                Self {
                    text: text.to_string(),
                }
            }
        }

        impl PromptComponent for $name {
            fn render(&self) -> String {
                section($title, &self.text)
            }
        }
    };
}

section_component!(
    /// Who the model is.
    Persona,
    "Persona"
);
section_component!(
    /// Background the model should know.
    Context,
    "Context"
);
section_component!(
    /// What the model must do.
    Instruction,
    "Instruction"
);
