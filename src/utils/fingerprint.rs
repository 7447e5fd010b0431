use sha2::{Digest, Sha256};

/// Length of a visitor fingerprint, in hex characters.
pub const FINGERPRINT_LEN: usize = 32;

const DELIMITER: char = '|';

/// Derive a stable visitor fingerprint from the client-reported attributes.
///
/// The attributes are joined with `|` and hashed with SHA-256; the token is the
/// first [FINGERPRINT_LEN] hex characters of the digest. Attributes are not
/// escaped, so two tuples that concatenate to the same string share a token.
pub fn derive_fingerprint(
    user_agent: &str,
    accept_language: &str,
    screen_resolution: &str,
    timezone: &str,
    platform: &str,
) -> String {
    let joined = [
        user_agent,
        accept_language,
        screen_resolution,
        timezone,
        platform,
    ]
    .join(&DELIMITER.to_string());

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    let result = hasher.finalize();

    let mut token = format!("{:x}", result);
    token.truncate(FINGERPRINT_LEN);
    token
}
