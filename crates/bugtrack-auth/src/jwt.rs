//! JWT (JSON Web Token) handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims identifying an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role ("user" or "admin")
    pub role: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration time (unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: String, email: String, role: String, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id,
            email,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// A token is expired once the current time reaches its expiry claim.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(jsonwebtoken::errors::Error),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,
}

/// Issues and verifies HS256-signed bearer tokens.
///
/// Verification checks signature and expiration only. Expired tokens are
/// rejected even when the signature is valid, and the two failures are
/// reported as distinct errors so callers can log them separately.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service with a symmetric secret and a fixed token
    /// lifetime applied to every issued token.
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        // No leeway: expiry is exact, not fuzzy
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// The lifetime applied to issued tokens.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a signed token for the given identity.
    ///
    /// Two tokens issued for the same identity at different instants differ,
    /// since the issued-at claim is stamped at call time.
    pub fn issue(&self, user_id: &str, email: &str, role: &str) -> Result<String, JwtError> {
        let claims = Claims::new(
            user_id.to_string(),
            email.to_string(),
            role.to_string(),
            self.lifetime,
        );
        self.encode(&claims)
    }

    /// Sign a prepared set of claims. Mostly useful in tests that need
    /// control over the expiry window.
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key).map_err(JwtError::EncodingError)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    _ => JwtError::Malformed,
                }
            })?;

        // jsonwebtoken treats exp == now as still valid; the contract here
        // is current time >= expiry means expired
        if token_data.claims.is_expired() {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}
