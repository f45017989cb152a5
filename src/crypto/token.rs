use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Mints and checks stateless session tokens.
///
/// A token is `base64url(claims) "." base64url(signature)`, signed with an
/// Ed25519 key that lives for the whole process. Verification never touches
/// the datastore, so a token outlives its user until it expires.
pub struct TokenIssuer {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: [u8; 32], ttl_hours: i64) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let verifying_key = signing_key.verifying_key();

        TokenIssuer {
            signing_key,
            verifying_key,
            ttl_secs: ttl_hours.saturating_mul(3600),
        }
    }

    /// Build from a base64 secret, or a random one when none is configured
    pub fn from_secret(secret: Option<&str>, ttl_hours: i64) -> Result<Self, AppError> {
        if ttl_hours <= 0 {
            return Err(AppError::Config("TOKEN_TTL_HOURS must be positive".to_string()));
        }

        // Expiry must stay representable for every token issued from now on
        ttl_hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(chrono::Utc::now().timestamp()))
            .ok_or_else(|| AppError::Config("TOKEN_TTL_HOURS is too large".to_string()))?;

        let secret = match secret {
            Some(encoded) => {
                let bytes = base64_simd::STANDARD
                    .decode_to_vec(encoded.trim())
                    .map_err(|e| AppError::Config(format!("Invalid TOKEN_SECRET: {}", e)))?;

                <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
                    AppError::Config("TOKEN_SECRET must decode to exactly 32 bytes".to_string())
                })?
            }
            None => {
                tracing::warn!("⚠️ TOKEN_SECRET not set, using an ephemeral signing key");
                rand::thread_rng().gen()
            }
        };

        Ok(Self::new(secret, ttl_hours))
    }

    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_at(username, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, username: &str, now: i64) -> Result<String, AppError> {
        let exp = now
            .checked_add(self.ttl_secs)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp,
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| AppError::Internal(format!("Failed to encode claims: {}", e)))?;
        let signature = self.signing_key.sign(&payload);

        Ok(format!(
            "{}.{}",
            base64_simd::URL_SAFE_NO_PAD.encode_to_string(&payload),
            base64_simd::URL_SAFE_NO_PAD.encode_to_string(signature.to_bytes()),
        ))
    }

    /// Resolve a token to the username it was issued to
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
            .map(|claims| claims.sub)
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AppError> {
        let invalid = || AppError::Unauthorized("Invalid or expired session".to_string());

        let (payload_b64, signature_b64) = token.split_once('.').ok_or_else(invalid)?;

        let payload = base64_simd::URL_SAFE_NO_PAD
            .decode_to_vec(payload_b64)
            .map_err(|_| invalid())?;
        let signature_bytes = base64_simd::URL_SAFE_NO_PAD
            .decode_to_vec(signature_b64)
            .map_err(|_| invalid())?;
        let signature = Signature::from_slice(&signature_bytes).map_err(|_| invalid())?;

        self.verifying_key
            .verify_strict(&payload, &signature)
            .map_err(|_| invalid())?;

        // Only signed bytes are ever parsed
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| invalid())?;

        if claims.exp <= now {
            tracing::debug!("Rejected expired token for {}", claims.sub);
            return Err(invalid());
        }

        Ok(claims)
    }
}
