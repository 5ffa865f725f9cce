//! Flash messages.
//!
//! A flash is queued in the session by one request (usually right before a
//! redirect) and shown exactly once by the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

/// Severity of a flash message, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    /// CSS class applied to the message in templates.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash flash-success",
            Self::Error => "flash flash-error",
            Self::Info => "flash flash-info",
        }
    }
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }
}

/// Queue a flash message for the next rendered page.
///
/// A failure to write the session is logged and otherwise ignored: losing a
/// message must never fail the request that produced it.
pub async fn push_flash(session: &Session, flash: Flash) {
    let mut queued: Vec<Flash> = session
        .get(session_keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(flash);

    if let Err(e) = session.insert(session_keys::FLASHES, queued).await {
        tracing::warn!(error = %e, "Failed to queue flash message");
    }
}

/// Take (and clear) all queued flash messages.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    match session.get::<Vec<Flash>>(session_keys::FLASHES).await {
        Ok(Some(flashes)) => {
            if let Err(e) = session.remove::<Vec<Flash>>(session_keys::FLASHES).await {
                tracing::warn!(error = %e, "Failed to clear flash messages");
            }
            flashes
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}
