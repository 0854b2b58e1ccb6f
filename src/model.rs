use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::providers;

/// Conversation roles as the Gemini API names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a>>;

/// Seam between the session/dispatch layer and the HTTP provider, so both
/// can be exercised against stub backends in tests.
pub trait ChatBackend {
    fn generate<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        model: &'a str,
        messages: &'a [Message],
    ) -> GenerateFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpChatBackend;

impl ChatBackend for HttpChatBackend {
    fn generate<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        model: &'a str,
        messages: &'a [Message],
    ) -> GenerateFuture<'a> {
        Box::pin(async move {
            debug!(
                model = %model,
                message_count = messages.len(),
                "dispatching generate request"
            );
            providers::gemini::generate(client, cfg, model, messages).await
        })
    }
}
