//! HTTP routing: `/api/status`, the `/ws` upgrade, and static dashboard files.

use super::{ws, ServerState};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub type Body = Full<Bytes>;

/// Served before any poll has completed
const EMPTY_STATUS: &str = r#"{"agents":[]}"#;

pub async fn handle(state: Arc<ServerState>, mut req: Request<Incoming>) -> Response<Body> {
    if req.method() != Method::GET {
        return text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }

    let path = req.uri().path().to_string();
    match path.as_str() {
        "/api/status" => status(&state).await,
        "/ws" => ws::upgrade(state, &mut req),
        _ => static_file(state.static_root(), &path).await,
    }
}

async fn status(state: &ServerState) -> Response<Body> {
    let json = state
        .latest_json()
        .await
        .unwrap_or_else(|| EMPTY_STATUS.to_string());

    let mut res = response(StatusCode::OK, Bytes::from(json), "application/json");
    res.headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    res
}

async fn static_file(root: &Path, url_path: &str) -> Response<Body> {
    let Some(path) = resolve_static(root, url_path) else {
        return text(StatusCode::FORBIDDEN, "Forbidden");
    };

    match tokio::fs::read(&path).await {
        Ok(data) => response(StatusCode::OK, Bytes::from(data), content_type(&path)),
        Err(_) => text(StatusCode::NOT_FOUND, "Not Found"),
    }
}

/// Map a request path onto a file under `root`. `None` if it would escape `root`.
pub fn resolve_static(root: &Path, url_path: &str) -> Option<PathBuf> {
    let relative = match url_path {
        "/" => "index.html",
        other => other.trim_start_matches('/'),
    };

    let relative = Path::new(relative);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    Some(root.join(relative))
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

pub(super) fn response(status: StatusCode, body: Bytes, content_type: &'static str) -> Response<Body> {
    let mut res = Response::new(Full::new(body));
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    res
}

pub(super) fn text(status: StatusCode, message: &'static str) -> Response<Body> {
    response(status, Bytes::from_static(message.as_bytes()), "text/plain")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        assert_eq!(
            resolve_static(Path::new("/srv/office"), "/"),
            Some(PathBuf::from("/srv/office/index.html"))
        );
    }

    #[test]
    fn nested_assets_resolve_under_root() {
        assert_eq!(
            resolve_static(Path::new("/srv/office"), "/sprites/desk-with-pc.png"),
            Some(PathBuf::from("/srv/office/sprites/desk-with-pc.png"))
        );
    }

    #[test]
    fn traversal_is_rejected() {
        let root = Path::new("/srv/office");
        assert_eq!(resolve_static(root, "/../etc/passwd"), None);
        assert_eq!(resolve_static(root, "/sprites/../../secret"), None);
        assert_eq!(resolve_static(root, "/./config.json"), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type(Path::new("index.html")), "text/html");
        assert_eq!(content_type(Path::new("a.png")), "image/png");
        assert_eq!(content_type(Path::new("status.json")), "application/json");
        assert_eq!(content_type(Path::new("notes")), "application/octet-stream");
    }
}
