//! Time-based one-time passwords (RFC 6238) for SmartAPI login.
//!
//! HMAC-SHA1 over a 30 s counter, truncated to 6 digits. Seeds are base32 as
//! shown by authenticator apps; padding, spaces and case are ignored.

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::error::AngelOneError;

const STEP_SECS: i64 = 30;
const DIGITS: u32 = 6;

/// TOTP code for `seed` at `unix_secs`.
pub fn generate_totp(seed: &str, unix_secs: i64) -> Result<String, AngelOneError> {
    if unix_secs < 0 {
        return Err(AngelOneError::Totp("time before epoch".to_string()));
    }
    let key = decode_seed(seed)?;
    let counter = (unix_secs / STEP_SECS) as u64;

    let mut mac = Hmac::<Sha1>::new_from_slice(&key)
        .map_err(|e| AngelOneError::Totp(e.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let binary = (u32::from(digest[offset]) & 0x7f) << 24
        | u32::from(digest[offset + 1]) << 16
        | u32::from(digest[offset + 2]) << 8
        | u32::from(digest[offset + 3]);
    let code = binary % 10_u32.pow(DIGITS);

    Ok(format!("{code:0width$}", width = DIGITS as usize))
}

fn decode_seed(seed: &str) -> Result<Vec<u8>, AngelOneError> {
    let normalized: String = seed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        return Err(AngelOneError::Totp("empty seed".to_string()));
    }
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|e| AngelOneError::Totp(format!("invalid base32 seed: {e}")))
}
