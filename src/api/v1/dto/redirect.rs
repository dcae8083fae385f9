use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoRequest {
    pub to: String,
}

impl GoRequest {
    /// Only same-site absolute paths are followed.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.to.starts_with('/') || self.to.starts_with("//") {
            return Err("to must be a local path");
        }
        Ok(())
    }
}
