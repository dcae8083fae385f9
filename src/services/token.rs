use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::plugin::UserAuth;

// Errors returned by token signing / verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token salt is not configured")]
    MissingSalt,
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// HMAC token signer / verifier keyed by the shared salt.
///
/// - Debug never prints key material.
/// - Any HS* algorithm is accepted on verification; signing uses HS256.
/// - `exp` / `nbf` are checked only when present, without leeway.
/// - `aud` is not validated.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    empty_salt: bool,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(salt: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(salt.as_bytes()),
            decoding_key: DecodingKey::from_secret(salt.as_bytes()),
            validation,
            empty_salt: salt.is_empty(),
        }
    }

    /// Verify the signature and time claims, then decode the identity.
    pub fn verify(&self, token: &str) -> Result<UserAuth, TokenError> {
        if self.empty_salt {
            return Err(TokenError::MissingSalt);
        }
        let data = jsonwebtoken::decode::<UserAuth>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    pub fn sign(&self, user: &UserAuth) -> Result<String, TokenError> {
        if self.empty_salt {
            return Err(TokenError::MissingSalt);
        }
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, user, &self.encoding_key)?)
    }
}
