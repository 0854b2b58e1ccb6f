use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::model::ChatBackend;
use crate::session::ChatSession;

const NOT_FOUND_SIGNATURE: &str = "not found for API version";
const MODELS_PATH_SIGNATURE: &str = "models/";

/// Classifies a send failure as "this model identifier is not served".
///
/// The API reports this condition in prose, e.g.
/// `models/gemini-2.5-pro is not found for API version v1beta`, so the
/// match is textual. This is the only place that knows the signature;
/// swap in the structured error code here if the API ever exposes one.
pub fn is_model_not_found(err: &anyhow::Error) -> bool {
    let msg = format!("{err:#}");
    msg.contains(NOT_FOUND_SIGNATURE) && msg.contains(MODELS_PATH_SIGNATURE)
}

/// Sends `prompt` on `session`, falling back across `cfg.fallback_models`
/// when the session's model is not served.
///
/// Only a model-not-found failure triggers fallback; anything else
/// propagates unchanged without a single fallback attempt. Each fallback
/// candidate gets a fresh session and one attempt, in list order, and the
/// first success wins. If every candidate fails, the primary's original
/// error is the one surfaced; candidate errors only move the iteration
/// along.
pub async fn send_with_fallback<B: ChatBackend>(
    client: &Client,
    cfg: &Config,
    backend: &B,
    mut session: ChatSession,
    prompt: &str,
) -> Result<(ChatSession, String)> {
    let primary_err = match session.send(client, cfg, backend, prompt).await {
        Ok(reply) => return Ok((session, reply)),
        Err(err) if is_model_not_found(&err) => err,
        Err(err) => return Err(err),
    };

    warn!(
        model = %session.model(),
        fallback_count = cfg.fallback_models.len(),
        "model not served, trying fallback models"
    );

    for fallback in &cfg.fallback_models {
        let mut candidate = ChatSession::new(fallback);
        match candidate.send(client, cfg, backend, prompt).await {
            Ok(reply) => {
                info!(model = %fallback, "fallback model answered");
                return Ok((candidate, reply));
            }
            Err(err) => {
                warn!(model = %fallback, error = %err, "fallback model failed, trying next");
            }
        }
    }

    Err(primary_err)
}
