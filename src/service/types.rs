//! Common types for command service interactions

use serde::{Deserialize, Serialize};

/// A command suggestion returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[allow(dead_code)] // Constructors used by tests and downstream callers
impl Suggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
            url: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// An outbound call to the command service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Confirm,
    Objective(String),
    Suggest(String),
}

impl ServiceCall {
    /// The command name as sent over the wire and recorded in session state
    pub fn name(&self) -> &'static str {
        match self {
            ServiceCall::Confirm => "confirm",
            ServiceCall::Objective(_) => "objective",
            ServiceCall::Suggest(_) => "suggest",
        }
    }

    /// The objective argument, if this call carries one
    pub fn objective(&self) -> Option<&str> {
        match self {
            ServiceCall::Confirm => None,
            ServiceCall::Objective(text) | ServiceCall::Suggest(text) => Some(text.as_str()),
        }
    }
}
