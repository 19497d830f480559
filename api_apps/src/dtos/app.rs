use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Active,
    Inactive,
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppStatus::Active => "active",
            AppStatus::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<AppStatus>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateKeyResponse {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AppStatus::Inactive).unwrap(),
            "\"inactive\""
        );
        assert_eq!(AppStatus::Active.to_string(), "active");
    }

    #[test]
    fn update_request_accepts_partial_payloads() {
        let req: UpdateAppRequest = serde_json::from_str(r#"{"status":"inactive"}"#).unwrap();
        assert!(req.name.is_none());
        assert!(req.description.is_none());
        assert_eq!(req.status, Some(AppStatus::Inactive));
    }
}
