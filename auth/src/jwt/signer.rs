use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Issues and verifies compact signed tokens (HS256 JWT).
///
/// Stateless and immutable after construction; safe to share behind an
/// `Arc` across concurrent request handlers. Signature comparison is
/// constant-time (handled inside `jsonwebtoken`).
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenSigner {
    /// Create a signer from the pre-shared secret.
    ///
    /// The secret should be at least 256 bits for HS256 and is loaded
    /// once from configuration at process start.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign a claim set, returning the encoded token and its expiry.
    ///
    /// `iat` and `exp` are filled only when the caller has not set them
    /// already; both defaults anchor to the current time, so a caller
    /// supplying a back-dated `iat` still gets a full `ttl` of validity.
    ///
    /// # Errors
    /// * `EncodingFailed` - serialization or signing failed
    pub fn issue(&self, mut claims: Claims, ttl: Duration) -> Result<(String, i64), JwtError> {
        let now = Utc::now().timestamp();
        claims.iat.get_or_insert(now);
        let exp = *claims.exp.get_or_insert(now + ttl.num_seconds());

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok((token, exp))
    }

    /// Verify a token and return its claim set unmodified.
    ///
    /// # Errors
    /// * `Malformed` - the encoding is structurally invalid
    /// * `SignatureInvalid` - the signature does not match
    /// * `Expired` - `exp <= now`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        let claims = token_data.claims;

        // jsonwebtoken treats exp == now as still valid; the contract here
        // counts the boundary as expired.
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}
