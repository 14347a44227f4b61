use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outbound mail request; templating happens in the mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub recipient: String,
    pub template: String,
    pub parameters: BTreeMap<String, String>,
}

impl MailMessage {
    pub fn new(recipient: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            template: template.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Outbound mail hook invoked once the triggering writes are saved.
pub trait MailSender: Send + Sync {
    fn send(&self, message: MailMessage) -> Result<(), MailError>;
}
