//! The session gate wrapped around every protected route.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;

use crate::{
    AppState,
    auth::{
        DEFAULT_COOKIE_DURATION, build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::build_log_in_redirect_url_from_target,
    },
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Where to send a request that has no valid session.
fn log_in_target(request: &Request) -> String {
    if let Some(url) = build_log_in_redirect_url(request) {
        return url;
    }

    tracing::warn!(
        "No usable redirect target for {}, sending the user to the dashboard after log in.",
        request.uri()
    );
    build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

/// Copy the `Set-Cookie` headers of a refreshed session onto `response`.
fn attach_session_cookie(jar: PrivateCookieJar, response: Response) -> Response {
    let refreshed = extend_auth_cookie_duration_if_needed(jar.clone(), DEFAULT_COOKIE_DURATION)
        .unwrap_or_else(|error| {
            tracing::error!("Could not extend the session cookie, keeping the old one: {error}");
            jar
        });

    let (mut parts, body) = response.into_parts();
    let cookie_headers = refreshed.into_response();
    for value in cookie_headers.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.clone());
    }

    Response::from_parts(parts, body)
}

async fn guard_session(
    state: AuthState,
    request: Request,
    next: Next,
    reject: impl Fn(&str) -> Response,
) -> Response {
    let redirect_url = log_in_target(&request);

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read the cookie jar: {error:?}");
            return reject(&redirect_url);
        }
    };

    match get_token_from_cookies(&jar) {
        Ok(token) => {
            parts.extensions.insert(token.user_id);
        }
        Err(error) => {
            tracing::debug!("Rejected session for {}: {error}", parts.uri);
            return reject(&redirect_url);
        }
    }

    let response = next.run(Request::from_parts(parts, body)).await;
    attach_session_cookie(jar, response)
}

/// Checks for a valid session cookie on page routes.
///
/// The signed in [UserID](crate::auth::UserID) is inserted as a request
/// extension, so handlers can take `Extension(user_id): Extension<UserID>`.
/// Requests without a valid session are redirected to the log-in page.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard_session(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Checks for a valid session cookie on HTMX API routes.
///
/// Same as [auth_guard], except the redirect is sent as an `HX-Redirect`
/// header so that HTMX navigates the whole page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard_session(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
