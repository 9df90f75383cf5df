//! Events the call worker sends to the window, and how engine errors are worded.

use client_core::settings::SETTINGS_FILE;
use client_core::CallSessionSnapshot;

#[derive(Debug, Clone)]
pub enum UiEvent {
    BackendReady { target: String },
    Info(String),
    Error(UiError),
    SessionChanged(CallSessionSnapshot),
    StartFailed(String),
    StopFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    StartCall,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("invalid key")
            || message_lower.contains("credential")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("timed out")
            || message_lower.contains("did not acknowledge")
            || message_lower.contains("failed to reach")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("dns")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("not found")
            || message_lower.contains("400")
            || message_lower.contains("404")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Banner text for the call panel.
    pub fn user_message(&self) -> String {
        if self.context == UiErrorContext::BackendStartup {
            return format!(
                "Backend worker startup failure; check {SETTINGS_FILE} and CALLPAD__* settings: {}",
                self.message
            );
        }
        match self.category {
            UiErrorCategory::Auth => {
                "Call engine rejected the client credential; check public_key and retry.".to_string()
            }
            UiErrorCategory::Transport => {
                "Call engine unreachable; check network/api_base and retry.".to_string()
            }
            UiErrorCategory::Validation => {
                format!("Call engine rejected the request: {}", self.message)
            }
            UiErrorCategory::Unknown => format!("Call failed to start: {}", self.message),
        }
    }
}
