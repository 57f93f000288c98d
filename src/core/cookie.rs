//! Signed session cookie codec
//!
//! Cookie value layout: `<hex HMAC-SHA256(payload)>-<payload>`, where the
//! payload is `k1=v1&k2=v2` with every key and value percent-encoded.

use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SessionError;
use crate::types::Session;

type HmacSha256 = Hmac<Sha256>;

/// Hex length of an HMAC-SHA256 tag
const SIGNATURE_HEX_LEN: usize = 64;

/// Encodes and verifies session cookies
#[derive(Clone)]
pub struct SessionCodec {
    secret: Vec<u8>,
    cookie_name: String,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    pub fn new(secret: impl AsRef<[u8]>, cookie_name: impl Into<String>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Serialize and sign a session
    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let payload = encode_payload(session);
        let signature = hex::encode(self.sign(payload.as_bytes())?);
        Ok(format!("{}-{}", signature, payload))
    }

    /// Verify and deserialize a cookie value
    pub fn decode(&self, value: &str) -> Result<Session, SessionError> {
        let (signature, payload) = value.split_once('-').ok_or(SessionError::Malformed)?;
        if signature.len() != SIGNATURE_HEX_LEN {
            return Err(SessionError::Malformed);
        }
        let tag = hex::decode(signature).map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag).map_err(|_| SessionError::BadSignature)?;

        decode_payload(payload)
    }

    /// Session from a raw `Cookie` request header.
    ///
    /// No cookie means an empty session; an invalid one is reported.
    pub fn from_cookie_header(&self, header: &str) -> Result<Session, SessionError> {
        let value = Cookie::split_parse(header)
            .filter_map(Result::ok)
            .filter(|c| c.name() == self.cookie_name)
            .last()
            .map(|c| c.value().to_string());

        match value {
            Some(value) if !value.is_empty() => self.decode(&value),
            _ => Ok(Session::new()),
        }
    }

    /// `Set-Cookie` value carrying the session. An empty session clears it.
    pub fn set_cookie(&self, session: &Session) -> Result<String, SessionError> {
        if session.is_empty() {
            return Ok(self.removal_cookie());
        }
        let cookie = Cookie::build((self.cookie_name.clone(), self.encode(session)?))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        Ok(cookie.to_string())
    }

    /// `Set-Cookie` value that discards the session cookie
    pub fn removal_cookie(&self) -> String {
        Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .max_age(cookie::time::Duration::ZERO)
            .build()
            .to_string()
    }

    /// Session from a `Set-Cookie` response header, if it names our cookie
    pub fn from_set_cookie(&self, header: &str) -> Option<Result<Session, SessionError>> {
        let cookie = Cookie::parse(header).ok()?;
        if cookie.name() != self.cookie_name {
            return None;
        }
        if cookie.value().is_empty() {
            return Some(Ok(Session::new()));
        }
        Some(self.decode(cookie.value()))
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::InvalidKey)
    }

    fn sign(&self, data: &[u8]) -> Result<[u8; 32], SessionError> {
        let mut mac = self.mac()?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }
}

fn encode_payload(session: &Session) -> String {
    session
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_payload(payload: &str) -> Result<Session, SessionError> {
    let mut session = Session::new();
    for pair in payload.split('&').filter(|p| !p.is_empty()) {
        let (k, v) = pair.split_once('=').ok_or(SessionError::Malformed)?;
        let k = urlencoding::decode(k).map_err(|_| SessionError::Encoding)?;
        let v = urlencoding::decode(v).map_err(|_| SessionError::Encoding)?;
        session = session.with(k, v);
    }
    Ok(session)
}

// =============================================================================
// TESTS
// =============================================================================
