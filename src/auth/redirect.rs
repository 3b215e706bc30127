//! Where to send a user after they log in.
//!
//! Redirect targets are limited to paths on this site so that the log-in
//! form cannot be used as an open redirect.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Reduce `raw_url` to its path and query if it is a same-site path that is
/// not the log-in page itself.
///
/// Full URLs are only accepted when `allow_absolute` is set, which is the
/// case for the `HX-Current-URL` header sent by HTMX.
fn same_site_path(raw_url: &str, allow_absolute: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if !allow_absolute && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }

    let path_and_query = uri.path_and_query()?;
    let path = path_and_query.path();

    if !path.starts_with('/') || path.starts_with("//") || path == endpoints::LOG_IN_VIEW {
        return None;
    }

    Some(path_and_query.as_str().to_owned())
}

/// Sanitize a redirect URL supplied by the client.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    same_site_path(raw_url, false)
}

/// The log-in page URL that sends the user back to `target` afterwards.
pub fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => Some(format!("{}?{query}", endpoints::LOG_IN_VIEW)),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {target}: {error}");
            None
        }
    }
}

/// The log-in page URL for an unauthenticated `request`.
///
/// Page requests come back to the requested URL. API requests are made by
/// HTMX from a page, so they come back to that page via `HX-Current-URL`.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_url(request)?
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())?
    };

    build_log_in_redirect_url_from_target(&target)
}

fn hx_current_url(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for {} request.", request.uri());
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for {} request.", request.uri());
        return None;
    };

    let target = same_site_path(current_url, true);
    if target.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    target
}
