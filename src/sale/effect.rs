//! Effects produced by state transitions

use crate::processor::DepositRequest;

/// How the chat transport should render a prompt's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// One button: what the user sees and the token sent back when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub token: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Outbound chat message, optionally with mutually exclusive choice buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub format: TextFormat,
    /// Button rows; empty when the prompt expects free text
    pub choices: Vec<Vec<Choice>>,
}

impl Prompt {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            choices: vec![],
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Markdown,
            choices: vec![],
        }
    }

    #[must_use]
    pub fn with_choices(mut self, rows: Vec<Vec<Choice>>) -> Self {
        self.choices = rows;
        self
    }

    #[cfg(test)]
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().flatten().map(|c| c.token.as_str())
    }
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Send a prompt to the user's chat
    Reply(Prompt),

    /// Send an image by URL to the user's chat
    SendPhoto { url: String, caption: String },

    /// Send a plain message to the admin chat
    NotifyAdmin { text: String },

    /// Ask the processor for a deposit address (spawned, result comes back as an event)
    RequestDeposit(DepositRequest),
}

#[cfg(test)]
impl Effect {
    pub fn prompt(&self) -> Option<&Prompt> {
        match self {
            Effect::Reply(prompt) => Some(prompt),
            _ => None,
        }
    }
}
