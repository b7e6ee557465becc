//! One-shot messages carried across a redirect in a cookie.
//!
//! The cookie holds the pending messages as JSON, base64url encoded so the
//! value never needs cookie quoting. Reading the messages clears the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use shared::TrackerError;
use tracing::debug;

pub const FLASH_COOKIE: &str = "folio_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    /// CSS class used by the layout.
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }

    pub fn for_error(err: &TrackerError) -> Self {
        match err {
            TrackerError::NoChanges(_) => FlashLevel::Info,
            TrackerError::Conflict(_) | TrackerError::MarketData(_) => FlashLevel::Warning,
            TrackerError::NotFound(_)
            | TrackerError::Validation(_)
            | TrackerError::Database(_) => FlashLevel::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn from_error(err: &TrackerError) -> Self {
        Self::new(FlashLevel::for_error(err), err.to_string())
    }
}

fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_else(|| {
            debug!("Ignoring unreadable flash cookie");
            Vec::new()
        })
}

fn encode(flashes: &[Flash]) -> String {
    // Serializing a Vec of plain structs cannot fail
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn pending(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

/// Queues a message for the next rendered page.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut flashes = pending(&jar);
    flashes.push(flash);

    let mut cookie = Cookie::new(FLASH_COOKIE, encode(&flashes));
    cookie.set_path("/");
    cookie.set_http_only(true);
    jar.add(cookie)
}

pub fn success(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    push(jar, Flash::new(FlashLevel::Success, message))
}

pub fn info(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    push(jar, Flash::new(FlashLevel::Info, message))
}

pub fn warning(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    push(jar, Flash::new(FlashLevel::Warning, message))
}

pub fn error(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    push(jar, Flash::new(FlashLevel::Error, message))
}

/// Takes every pending message and clears the cookie, readable or not.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }
    let flashes = pending(&jar);
    let mut removal = Cookie::from(FLASH_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), flashes)
}
