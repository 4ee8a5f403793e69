// Task prompts for the three triage steps, rendered with Handlebars.

use crate::utils::{TEngine, TEngineError};

pub const SUMMARIZE: &str = "summarize";
pub const CLASSIFY: &str = "classify";
pub const DRAFT: &str = "draft";

const SUMMARIZE_TEMPLATE: &str = "\
Summarize this email:

Subject: {{subject}}
From: {{sender}}

Body:
{{body}}

Expected output: A short summary of the latest email in plain English.";

const CLASSIFY_TEMPLATE: &str = "\
Based on this email content:

{{body}}

Decide what type of response is appropriate, e.g. {{#each labels}}'{{this}}'{{#unless @last}}, {{/unless}}{{/each}}.

Expected output: One of: {{#each labels}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}.";

const DRAFT_TEMPLATE: &str = "\
Using this email content:

{{body}}

and the decision result ({{label}}), write a polite, professional email draft. \
DO NOT send it, just return the draft text.

Expected output: A professional email draft based on the decision above.";

/// Labels offered to the decider.
pub const REPLY_LABELS: [&str; 4] = [
    "follow-up",
    "thank you",
    "information request",
    "no reply needed",
];

/// Creates a template engine with the three step prompts registered.
pub fn prompt_engine() -> Result<TEngine, TEngineError> {
    let mut engine = TEngine::new();
    engine.register_template_string(SUMMARIZE, SUMMARIZE_TEMPLATE)?;
    engine.register_template_string(CLASSIFY, CLASSIFY_TEMPLATE)?;
    engine.register_template_string(DRAFT, DRAFT_TEMPLATE)?;
    Ok(engine)
}
