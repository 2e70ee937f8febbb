use super::WidgetAppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Served when the request names a directory
const INDEX_DOCUMENT: &str = "index.html";

/// GET /static/...
///
/// Serves a file from the static directory, or the templated 404 page.
pub async fn serve_static(State(state): State<Arc<WidgetAppState>>, request: Request) -> Response {
    let request_path = request.uri().path().to_string();
    let relative = request_path.strip_prefix("/static/").unwrap_or_default();

    let file = match resolve_static_path(&state.config.paths.static_dir(), relative) {
        Some(file) => file,
        None => return status_page(&state, StatusCode::NOT_FOUND, &request_path),
    };

    let is_file = tokio::fs::metadata(&file)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return status_page(&state, StatusCode::NOT_FOUND, &request_path);
    }

    match ServeFile::new(&file).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Render `<status>.html`. A missing template degrades to a plain 500.
pub(super) fn status_page(state: &WidgetAppState, status: StatusCode, path: &str) -> Response {
    tracing::warn!("HTTP {}: {}", status.as_u16(), path);
    match state.templates.status_page(status.as_u16()) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, status = status.as_u16(), "Error page template unavailable");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Map a URL path below `/static/` onto the static directory.
///
/// Returns `None` for anything that would escape `root`. Empty paths and
/// paths ending in `/` resolve to the index document.
fn resolve_static_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(relative).ok()?;

    let mut path = root.to_path_buf();
    for component in Path::new(decoded.as_ref()).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if decoded.is_empty() || decoded.ends_with('/') {
        path.push(INDEX_DOCUMENT);
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_file() {
        let root = Path::new("/srv/static");
        assert_eq!(
            resolve_static_path(root, "css/widget.css"),
            Some(PathBuf::from("/srv/static/css/widget.css"))
        );
    }

    #[test]
    fn test_resolve_trailing_slash_to_index() {
        let root = Path::new("/srv/static");
        assert_eq!(
            resolve_static_path(root, ""),
            Some(PathBuf::from("/srv/static/index.html"))
        );
        assert_eq!(
            resolve_static_path(root, "docs/"),
            Some(PathBuf::from("/srv/static/docs/index.html"))
        );
    }

    #[test]
    fn test_resolve_decodes_percent_escapes() {
        let root = Path::new("/srv/static");
        assert_eq!(
            resolve_static_path(root, "my%20photo.jpg"),
            Some(PathBuf::from("/srv/static/my photo.jpg"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/static");
        assert_eq!(resolve_static_path(root, "../data.db"), None);
        assert_eq!(resolve_static_path(root, "a/../../data.db"), None);
        assert_eq!(resolve_static_path(root, "%2e%2e/data.db"), None);
    }
}
