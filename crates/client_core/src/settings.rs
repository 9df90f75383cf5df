use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use call_engine::{CallEngine, HttpCallEngine, SimulatedCallEngine, DEFAULT_API_BASE};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use shared::domain::{
    ClientCredential, SessionTargetId, DEFAULT_CLIENT_CREDENTIAL, DEFAULT_SESSION_TARGET,
};
use url::Url;

pub const SETTINGS_FILE: &str = "callpad.toml";
pub const ENV_PREFIX: &str = "CALLPAD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Http,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CallSettings {
    pub engine: EngineKind,
    pub api_base: String,
    pub public_key: String,
    pub session_target: String,
    pub start_timeout_secs: Option<u64>,
    pub simulated_latency_ms: u64,
    pub simulated_fail_start: Option<String>,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            engine: EngineKind::Http,
            api_base: DEFAULT_API_BASE.into(),
            public_key: DEFAULT_CLIENT_CREDENTIAL.into(),
            session_target: DEFAULT_SESSION_TARGET.into(),
            start_timeout_secs: None,
            simulated_latency_ms: 400,
            simulated_fail_start: None,
        }
    }
}

/// Defaults, then `callpad.toml` in the working directory, then `CALLPAD__*`.
pub fn load_settings() -> anyhow::Result<CallSettings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<CallSettings> {
    let raw = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("failed to read call settings from '{}'", path.display()))?;

    raw.try_deserialize()
        .context("invalid call settings")
}

impl CallSettings {
    pub fn session_target(&self) -> SessionTargetId {
        SessionTargetId::new(self.session_target.trim())
    }

    pub fn credential(&self) -> ClientCredential {
        ClientCredential::new(self.public_key.trim())
    }

    /// Zero means no timeout.
    pub fn start_timeout(&self) -> Option<Duration> {
        self.start_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn build_engine(&self) -> anyhow::Result<Arc<dyn CallEngine>> {
        match self.engine {
            EngineKind::Http => {
                let api_base = Url::parse(self.api_base.trim())
                    .with_context(|| format!("invalid api_base '{}'", self.api_base))?;
                Ok(Arc::new(HttpCallEngine::new(&api_base, self.credential())?))
            }
            EngineKind::Simulated => {
                let latency = Duration::from_millis(self.simulated_latency_ms);
                match &self.simulated_fail_start {
                    Some(reason) => Ok(Arc::new(SimulatedCallEngine::failing(
                        latency,
                        reason.clone(),
                    ))),
                    None => Ok(Arc::new(SimulatedCallEngine::new(latency))),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
