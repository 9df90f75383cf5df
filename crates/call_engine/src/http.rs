use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::domain::{ClientCredential, SessionTargetId};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use crate::{CallEngine, CallEngineEvent, EngineCall, ENGINE_EVENT_CAPACITY};

pub const DEFAULT_API_BASE: &str = "https://api.vapi.ai";

const WEB_CALL_PATH: &str = "call/web";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebCallRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebCallResponse {
    id: String,
    #[serde(default)]
    web_call_url: Option<String>,
}

/// Starts web calls through the engine's REST API.
///
/// Only call creation goes over HTTP. Joining and leaving the media room belongs
/// to the transport that consumes `EngineCall::join_url`, so `end` just releases
/// the locally tracked call.
pub struct HttpCallEngine {
    http: Client,
    web_call_url: Url,
    credential: ClientCredential,
    open_calls: Mutex<Vec<String>>,
    events: broadcast::Sender<CallEngineEvent>,
}

impl HttpCallEngine {
    pub fn new(api_base: &Url, credential: ClientCredential) -> anyhow::Result<Self> {
        let web_call_url = endpoint(api_base, WEB_CALL_PATH)?;
        let (events, _) = broadcast::channel(ENGINE_EVENT_CAPACITY);
        Ok(Self {
            http: Client::new(),
            web_call_url,
            credential,
            open_calls: Mutex::new(Vec::new()),
            events,
        })
    }

    pub fn web_call_url(&self) -> &Url {
        &self.web_call_url
    }
}

fn endpoint(api_base: &Url, path: &str) -> anyhow::Result<Url> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .with_context(|| format!("invalid call engine api base '{api_base}'"))
}

#[async_trait]
impl CallEngine for HttpCallEngine {
    async fn begin(&self, target: &SessionTargetId) -> anyhow::Result<EngineCall> {
        let res = self
            .http
            .post(self.web_call_url.clone())
            .bearer_auth(self.credential.as_str())
            .json(&WebCallRequest {
                assistant_id: target.as_str(),
            })
            .send()
            .await
            .context("failed to reach call engine")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = format!("call engine rejected start ({status}): {body}");
            let _ = self.events.send(CallEngineEvent::Error(message.clone()));
            return Err(anyhow!(message));
        }

        let body: WebCallResponse = res
            .json()
            .await
            .context("malformed call engine start response")?;

        {
            let mut open_calls = self.open_calls.lock().await;
            if !open_calls.is_empty() {
                warn!(open = open_calls.len(), "call engine: web call created while others are open");
            }
            open_calls.push(body.id.clone());
        }
        info!(call_id = %body.id, target = %target, "call engine: web call created");
        let _ = self.events.send(CallEngineEvent::SessionStarted {
            call_id: body.id.clone(),
        });

        Ok(EngineCall {
            call_id: body.id,
            join_url: body.web_call_url,
        })
    }

    async fn end(&self, call_id: &str) -> anyhow::Result<()> {
        {
            let mut open_calls = self.open_calls.lock().await;
            let Some(index) = open_calls.iter().position(|open| open == call_id) else {
                debug!(call_id, "call engine: end for untracked web call ignored");
                return Ok(());
            };
            open_calls.remove(index);
        }
        info!(call_id, "call engine: web call released");
        let _ = self.events.send(CallEngineEvent::SessionEnded {
            call_id: call_id.to_string(),
        });
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<CallEngineEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
