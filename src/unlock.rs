//! Signed, short-lived cookie that unlocks the song request page.
//!
//! Token format: `<expiry unix seconds>.<base64url HMAC-SHA256(expiry)>`.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const UNLOCK_COOKIE: &str = "req_unlocked";
pub const UNLOCK_TTL_SECS: i64 = 60 * 60 * 8;

const KEY_LENGTH: usize = 32;

#[derive(Clone)]
pub struct UnlockSigner {
    key: Vec<u8>,
}

impl UnlockSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    /// Tokens signed with a random key die with the process.
    pub fn with_random_key() -> Self {
        use rand::RngCore;
        let mut key = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key: key.to_vec() }
    }

    fn mac(&self) -> Hmac<Sha256> {
        <Hmac<Sha256>>::new_from_slice(&self.key).expect("hmac accepts any key length")
    }

    pub fn issue_at(&self, now: DateTime<Utc>) -> String {
        let expires = now.timestamp() + UNLOCK_TTL_SECS;
        let mut mac = self.mac();
        mac.update(expires.to_string().as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{expires}.{signature}")
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        let Some((expires, signature)) = token.split_once('.') else {
            return false;
        };
        let Ok(expiry) = expires.parse::<i64>() else {
            return false;
        };
        let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };

        let mut mac = self.mac();
        mac.update(expires.as_bytes());
        mac.verify_slice(&signature).is_ok() && now.timestamp() < expiry
    }

    pub fn issue(&self) -> String {
        self.issue_at(Utc::now())
    }

    pub fn verify(&self, token: &str) -> bool {
        self.verify_at(token, Utc::now())
    }
}

pub fn set_cookie_header(token: &str) -> String {
    format!("{UNLOCK_COOKIE}={token}; Path=/; Max-Age={UNLOCK_TTL_SECS}; Secure; SameSite=Lax")
}

pub fn clear_cookie_header() -> String {
    format!("{UNLOCK_COOKIE}=0; Path=/; Max-Age=0")
}

/// Value of `name` from the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
