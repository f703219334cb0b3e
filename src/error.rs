use lambda_http::{Body, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::StoreUnavailable(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        // Upstream failure details stay in the log, not the response body.
        let message = match &self {
            ApiError::StoreUnavailable(_) => "Store unavailable".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message }).to_string();

        Response::builder()
            .status(self.status_code())
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_per_variant() {
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::BadRequest("x".to_string()).status_code(), 400);
        assert_eq!(ApiError::Unauthorized("x".to_string()).status_code(), 401);
        assert_eq!(ApiError::StoreUnavailable("x".to_string()).status_code(), 502);
        assert_eq!(ApiError::Internal("x".to_string()).status_code(), 500);
    }

    #[test]
    fn store_failure_response_hides_details() {
        let resp = ApiError::StoreUnavailable("connection refused to 10.0.0.5".to_string())
            .into_response();
        assert_eq!(resp.status(), 502);

        let body = match resp.body() {
            Body::Text(t) => t.clone(),
            other => panic!("unexpected body: {other:?}"),
        };
        assert!(!body.contains("10.0.0.5"));
        assert!(body.contains("Store unavailable"));
    }

    #[test]
    fn json_parse_error_maps_to_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let api_err = ApiError::from(err);
        assert_eq!(api_err.status_code(), 400);
    }
}
