//! HMAC signing key resolution for session tokens.
//!
//! The secret comes from configuration first, then from the file named by
//! `COURIER_JWT_SECRET_FILE`. Debug builds otherwise fall back to a random
//! per-process key, which invalidates every token on restart; setting
//! `COURIER_JWT_ALLOW_EPHEMERAL=0` turns that fallback off. Release builds
//! never use an ephemeral key.

use std::fmt;
use std::path::PathBuf;

use mockable::Env;
use rand::RngCore as _;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const KEY_FILE_ENV: &str = "COURIER_JWT_SECRET_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "COURIER_JWT_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const EPHEMERAL_KEY_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;

/// Shortest secret accepted in release builds.
pub const SIGNING_KEY_MIN_LEN: usize = 32;

/// Build mode for signing key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing secret and warn.
    Debug,
    /// Release builds require an explicit secret of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while resolving the signing key.
#[derive(thiserror::Error, Debug)]
pub enum SigningKeyError {
    /// No secret was configured and ephemeral keys are not allowed.
    #[error("no JWT secret configured; set COURIER_JWT_SECRET or COURIER_JWT_SECRET_FILE")]
    Missing,
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read JWT secret at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret is too short for release builds.
    #[error("JWT secret too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort { length: usize, min_len: usize },
    /// Release builds must not allow ephemeral keys.
    #[error("COURIER_JWT_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Secret bytes used to sign and verify session tokens. Zeroed on drop.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl SigningKey {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Generate a random key for a single process lifetime.
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; EPHEMERAL_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Secret material.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Truncated SHA-256 of the secret as 16 lowercase hex characters.
    ///
    /// Safe to log; lets operators confirm which secret is active.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_backend::outbound::security::SigningKey;
    ///
    /// let fp = SigningKey::from_bytes(vec![b'a'; 32]).fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Resolve the signing key from an optional configured secret and the
/// environment.
///
/// # Examples
///
/// ```
/// use courier_backend::outbound::security::{BuildMode, signing_key_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let secret = "0123456789abcdef0123456789abcdef";
/// let key = signing_key_from_env(&env, BuildMode::Release, Some(secret)).unwrap();
/// assert_eq!(key.as_bytes(), secret.as_bytes());
/// ```
pub fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    configured: Option<&str>,
) -> Result<SigningKey, SigningKeyError> {
    if let Some(secret) = configured.filter(|value| !value.is_empty()) {
        return checked(mode, secret.as_bytes().to_vec());
    }

    if let Some(path) = env.string(KEY_FILE_ENV).map(PathBuf::from) {
        return match std::fs::read(&path) {
            Ok(bytes) => checked(mode, bytes),
            Err(source) => Err(SigningKeyError::KeyRead { path, source }),
        };
    }

    if allow_ephemeral_from_env(env, mode)? {
        warn!("no JWT secret configured; using a temporary key (dev only)");
        return Ok(SigningKey::generate());
    }
    Err(SigningKeyError::Missing)
}

fn checked(mode: BuildMode, mut bytes: Vec<u8>) -> Result<SigningKey, SigningKeyError> {
    let length = bytes.len();
    if length == 0 || (mode == BuildMode::Release && length < SIGNING_KEY_MIN_LEN) {
        bytes.zeroize();
        return Err(SigningKeyError::KeyTooShort {
            length,
            min_len: SIGNING_KEY_MIN_LEN,
        });
    }
    Ok(SigningKey { bytes })
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SigningKeyError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(mode.is_debug());
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(SigningKeyError::EphemeralNotAllowed),
        Some(false) => Ok(false),
        None => Err(SigningKeyError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "signing_key_tests.rs"]
mod tests;
