/*
 * Responsibility
 * - token 発行 / me の request/response DTO
 */
use serde::{Deserialize, Serialize};

/// Default lifetime of an issued token.
pub const DEFAULT_TTL_SECONDS: i64 = 60 * 60;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub id: i64,
    /// Seconds; 0 means `DEFAULT_TTL_SECONDS`.
    pub ttl_seconds: i64,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id < 0 {
            return Err("id must be >= 0");
        }
        if self.ttl_seconds < 0 {
            return Err("ttl_seconds must be >= 0");
        }
        Ok(())
    }

    pub fn ttl(&self) -> chrono::Duration {
        match self.ttl_seconds {
            0 => chrono::Duration::seconds(DEFAULT_TTL_SECONDS),
            ttl => chrono::Duration::seconds(ttl),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: Option<u64>,
}

/// How the caller was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    Bearer,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: i64,
    pub name: String,
    pub credential: Credential,
}
