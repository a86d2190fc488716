use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const USER_HEADER: &str = "x-skilltree-user";
pub const USER_COOKIE: &str = "skilltree_user";

/// Identity of the requesting user, inserted by `identity_middleware`.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

/// Resolve the caller from the identity header, falling back to the
/// session cookie. Blank values count as missing.
pub fn caller_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(user) = headers.get(USER_HEADER).and_then(|v| v.to_str().ok()) {
        let user = user.trim();
        if !user.is_empty() {
            return Some(user.to_string());
        }
    }

    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(USER_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Attach a `Caller` to every `/api/*` request. Requests without an
/// identity get a JSON 401; `/api/health` is always public.
pub async fn identity_middleware(mut req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if !path.starts_with("/api/") || path == "/api/health" {
        return next.run(req).await;
    }

    let caller = caller_from_headers(req.headers());
    match caller {
        Some(user) => {
            req.extensions_mut().insert(Caller(user));
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "unauthorized" })),
        )
            .into_response(),
    }
}
