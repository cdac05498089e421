use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Role, User},
};

/// JWT claims issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

/// HS256 token issuer and validator.
pub struct Auth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl Auth {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, 24 * 60 * 60)
    }

    pub fn with_ttl(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issues a token for `user`.
    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let iat = Utc::now().timestamp().max(0) as usize;
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat,
            exp: iat + self.ttl_secs as usize,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}
