/*
 * Responsibility
 * - /echo の request/response DTO
 * - id は URI、page / tags / verbose は query、name / note は body から来ることを想定
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoRequest {
    pub id: i64,
    pub page: u32,
    pub tags: Vec<String>,
    pub verbose: bool,
    pub name: String,
    pub note: Option<String>,
}

impl EchoRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.chars().count() > 64 {
            return Err("name must be <= 64 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoResponse {
    pub method: String,
    pub id: i64,
    pub page: u32,
    pub tags: Vec<String>,
    pub verbose: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Authenticated user name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}
