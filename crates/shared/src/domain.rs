use std::fmt;

use serde::{Deserialize, Serialize};

/// Public client key the demo ships with.
pub const DEFAULT_CLIENT_CREDENTIAL: &str = "9261dd01-2f22-4716-b5e6-4940e540b603";
/// Assistant configuration the demo connects to.
pub const DEFAULT_SESSION_TARGET: &str = "ba32a3aa-f13b-4914-83b5-0118959c03f3";

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(SessionTargetId);
string_newtype!(ClientCredential);

impl Default for SessionTargetId {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TARGET)
    }
}

impl Default for ClientCredential {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_CREDENTIAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    Idle,
    Active,
}

impl CallStatus {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}
