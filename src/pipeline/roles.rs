use prompt_crafter::{Context, Instruction, Persona, Prompt};

/// The three model roles of the triage pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    /// Reads the email and summarizes it.
    Reader,
    /// Decides whether a reply is needed and of which kind.
    Decider,
    /// Writes the reply.
    Drafter,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [AgentRole::Reader, AgentRole::Decider, AgentRole::Drafter];

    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::Reader => "Email Reader",
            AgentRole::Decider => "Response Decider",
            AgentRole::Drafter => "Email Drafter",
        }
    }

    pub fn goal(&self) -> &'static str {
        match self {
            AgentRole::Reader => {
                "Read recent emails and summarize key points clearly and concisely."
            }
            AgentRole::Decider => {
                "Determine whether this email requires a reply. If it does, classify the response \
                 type such as 'follow-up', 'thank you', or 'information request'. If it does NOT \
                 require a reply (e.g., promotions, confirmations, newsletters, receipts), simply \
                 return 'no reply needed'."
            }
            AgentRole::Drafter => {
                "Write a polite, context-aware draft reply ONLY if a reply is needed."
            }
        }
    }

    pub fn backstory(&self) -> &'static str {
        match self {
            AgentRole::Reader => {
                "An AI assistant that reviews emails and extracts important insights from them."
            }
            AgentRole::Decider => {
                "A logical decision-maker that categorizes emails and determines whether a \
                 response is necessary."
            }
            AgentRole::Drafter => {
                "An AI writer that crafts natural, professional responses to real emails."
            }
        }
    }

    /// The system prompt for an agent playing this role.
    pub fn preamble(&self) -> String {
        Prompt::builder()
            .add(Persona::new(&format!("You are the {}.", self.name())))
            .add(Context::new(self.backstory()))
            .add(Instruction::new(self.goal()))
            .build()
            .to_string()
    }
}
