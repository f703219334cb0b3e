use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use lambda_http::{Request, RequestExt};

use crate::error::ApiError;

/// Resolves the caller's user id.
///
/// With an HTTP API JWT authorizer the verified claims arrive in the request
/// context, so that is checked first. Otherwise the `sub` claim is read
/// straight out of the bearer token's payload; signature verification is the
/// authorizer's job, not ours.
pub fn extract_user_id(req: &Request) -> Result<String, ApiError> {
    let context = req.request_context_ref();

    if let Some(lambda_http::request::RequestContext::ApiGatewayV2(ctx)) = context {
        if let Some(authorizer) = &ctx.authorizer {
            if let Some(jwt) = &authorizer.jwt {
                return jwt
                    .claims
                    .get("sub")
                    .cloned()
                    .ok_or_else(|| ApiError::Unauthorized("Missing sub claim".to_string()));
            }
        }
    }

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    subject_from_token(token)
}

fn subject_from_token(token: &str) -> Result<String, ApiError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ApiError::Unauthorized("Malformed token".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ApiError::Unauthorized("Malformed token payload".to_string()))?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::Unauthorized("Malformed token claims".to_string()))?;

    claims
        .get("sub")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized("Missing sub claim".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::Body;

    fn token_for(sub: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
        format!("{header}.{payload}.")
    }

    fn request_with_header(value: &str) -> Request {
        lambda_http::http::Request::builder()
            .uri("/todos")
            .header("Authorization", value)
            .body(Body::Empty)
            .unwrap()
    }

    #[test]
    fn reads_sub_from_bearer_token() {
        let req = request_with_header(&format!("Bearer {}", token_for("u1")));
        assert_eq!(extract_user_id(&req).unwrap(), "u1");
    }

    #[test]
    fn rejects_missing_header() {
        let req = lambda_http::http::Request::builder()
            .uri("/todos")
            .body(Body::Empty)
            .unwrap();
        let err = extract_user_id(&req).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn rejects_non_bearer_header() {
        let req = request_with_header("Basic dXNlcjpwYXNz");
        assert_eq!(extract_user_id(&req).unwrap_err().status_code(), 401);
    }

    #[test]
    fn rejects_garbled_token() {
        let req = request_with_header("Bearer not-a-jwt");
        assert_eq!(extract_user_id(&req).unwrap_err().status_code(), 401);
    }

    #[test]
    fn rejects_token_without_sub() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"email":"a@b.c"}"#);
        let req = request_with_header(&format!("Bearer h.{payload}.s"));
        assert_eq!(extract_user_id(&req).unwrap_err().status_code(), 401);
    }
}
