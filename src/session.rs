use anyhow::Result;
use reqwest::Client;

use crate::config::Config;
use crate::model::{ChatBackend, Message};

/// Stateful handle for one conversation bound to a single model name.
///
/// Building a session allocates nothing but the handle; the first network
/// call happens on the first `send`. Generation parameters and the system
/// instruction travel with the immutable `Config` and are attached to
/// every request this session issues.
#[derive(Debug)]
pub struct ChatSession {
    model: String,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            history: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Sends one user turn. History is committed only on success, so a
    /// failed turn leaves the session exactly as it was.
    pub async fn send<B: ChatBackend>(
        &mut self,
        client: &Client,
        cfg: &Config,
        backend: &B,
        prompt: &str,
    ) -> Result<String> {
        let mut messages = self.history.clone();
        messages.push(Message::user(prompt));

        let reply = backend.generate(client, cfg, &self.model, &messages).await?;

        self.history = messages;
        self.history.push(Message::model(reply.clone()));
        Ok(reply)
    }
}
