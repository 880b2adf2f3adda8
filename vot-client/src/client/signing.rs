//! Request signing and anti-replay tokens

use crate::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "Vtrans-Signature";
/// Header carrying the per-request token
pub const TOKEN_HEADER: &str = "Sec-Vtrans-Token";

/// HMAC-SHA256 of `body` under `key`, lowercase hex
pub fn sign_body(key: &[u8], body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::Config(format!("Invalid signing key: {}", e)))?;
    mac.update(body);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Random token shaped like a v4 UUID (122 random bits)
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}
