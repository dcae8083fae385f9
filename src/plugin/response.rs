/*
 * Responsibility
 * - 全レスポンス共通の JSON envelope {code, data, message}
 * - HTTP status は常に 200。実際の結果は envelope の code で表す
 */
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            data: Some(data),
            message: String::new(),
        }
    }
}

impl Envelope<()> {
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self) {
            Ok(body) => json_ok(body),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize response envelope");
                let fallback = Envelope::failure(500, err.to_string());
                // `()` payload with a plain string message always serializes
                json_ok(serde_json::to_vec(&fallback).unwrap_or_default())
            }
        }
    }
}

fn json_ok(body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        )],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_empty_message() {
        let body = serde_json::to_value(Envelope::success(json!({"id": 1}))).unwrap();
        assert_eq!(body, json!({"code": 200, "data": {"id": 1}}));
    }

    #[test]
    fn failure_keeps_null_data() {
        let body = serde_json::to_value(Envelope::failure(401, "nope")).unwrap();
        assert_eq!(body, json!({"code": 401, "data": null, "message": "nope"}));
    }

    #[test]
    fn renders_with_status_ok() {
        let response = Envelope::failure(500, "boom").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn unserializable_data_becomes_internal_error() {
        use std::collections::HashMap;

        // non-string map keys cannot be JSON object keys
        let mut data = HashMap::new();
        data.insert(vec![1u8], 1);
        let response = Envelope::success(data).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
