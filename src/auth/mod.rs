use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by every bearer token. Both identity claims are required;
/// a token missing either one, or carrying them with the wrong JSON type,
/// fails to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn new(user_id: i32, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            iat: Some(Utc::now().timestamp()),
            exp: None,
        }
    }

    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.exp = Some((Utc::now() + ttl).timestamp());
        self
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key is empty")]
    EmptyKey,

    #[error("token generation failed: {0}")]
    Generation(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short category for logs. Never includes token contents.
    pub fn kind(&self) -> &'static str {
        use jsonwebtoken::errors::ErrorKind;

        match self {
            TokenError::EmptyKey => "empty key",
            TokenError::Generation(_) => "generation",
            TokenError::Invalid(e) => match e.kind() {
                ErrorKind::InvalidSignature => "bad signature",
                ErrorKind::InvalidAlgorithm => "unexpected algorithm",
                ErrorKind::ExpiredSignature => "expired",
                ErrorKind::Json(_) => "malformed claims",
                _ => "malformed token",
            },
        }
    }
}

/// The HMAC family is the only one a shared secret can verify
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Signing and verification keys derived from the shared secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptyKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // exp is optional, but still enforced when present
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        // No audience is configured, so none is checked
        validation.validate_aud = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Generation)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

/// Issue an HS256 token for the given identity
pub fn generate_token(user_id: i32, username: &str, secret: &[u8]) -> Result<String, TokenError> {
    JwtKeys::from_secret(secret)?.sign(&Claims::new(user_id, username))
}
