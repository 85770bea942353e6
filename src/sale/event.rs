//! Events that drive a sale conversation

use crate::processor::DepositAddress;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Commands
    /// `/start`: greet the user and drop any sale in progress
    Welcome { profile: UserProfile },
    /// `/sell` or the menu entry: begin a new sale
    StartSale,
    /// `/cancel`
    Cancel,

    // User input
    /// Inline button press carrying its machine token
    Select { token: String },
    /// Free-text reply
    Text { text: String },

    // Processor outcomes
    DepositCreated { deposit: DepositAddress },
    DepositFailed { message: String },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Welcome { .. } => "welcome",
            Event::StartSale => "start_sale",
            Event::Cancel => "cancel",
            Event::Select { .. } => "select",
            Event::Text { .. } => "text",
            Event::DepositCreated { .. } => "deposit_created",
            Event::DepositFailed { .. } => "deposit_failed",
        }
    }

    /// Events produced by the user, as opposed to the processor
    pub fn is_user_input(&self) -> bool {
        !matches!(self, Event::DepositCreated { .. } | Event::DepositFailed { .. })
    }
}

/// Who sent `/start`, used for the greeting and the admin alert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}
