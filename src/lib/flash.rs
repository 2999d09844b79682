//! One-shot notifications surviving the post/redirect/get boundary.
//!
//! Messages are queued against an opaque session id carried in the `sid`
//! cookie and drained the next time the list page renders.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, text)
    }
}

/// Pending messages per session. Process-local; messages queued here are
/// gone after a restart, which is acceptable for one-shot notices.
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    messages: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, session: &str, message: Message) {
        let mut messages = self.messages.write().expect("flash store lock poisoned");
        messages.entry(session.to_string()).or_default().push(message);
    }

    /// Takes and clears the session's pending messages.
    pub fn drain(&self, session: &str) -> Vec<Message> {
        let mut messages = self.messages.write().expect("flash store lock poisoned");
        messages.remove(session).unwrap_or_default()
    }
}

/// Session id extracted from the `sid` cookie; a fresh id is minted when
/// the cookie is missing or empty, and `fresh` tells the response layer
/// to set it.
#[derive(Debug, Clone)]
pub struct SessionId {
    pub value: String,
    pub fresh: bool,
}

impl SessionId {
    /// `Set-Cookie` value pinning this session to the client.
    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; HttpOnly", self.value)
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(cookies) = parts.headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
            for pair in cookies.split(';') {
                let mut kv = pair.trim().splitn(2, '=');
                if kv.next() == Some(SESSION_COOKIE) {
                    if let Some(value) = kv.next().filter(|v| !v.is_empty()) {
                        return Ok(Self {
                            value: value.to_string(),
                            fresh: false,
                        });
                    }
                }
            }
        }
        Ok(Self {
            value: Uuid::new_v4().to_string(),
            fresh: true,
        })
    }
}
