//! The state shared by every route handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize};

/// Everything the server needs to handle a request.
///
/// Handlers do not take this directly. Each one declares a smaller state
/// struct with the fields it uses and a [FromRef] impl to pull them out.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts and signs the session cookie.
    pub cookie_key: Key,

    /// How long a session lasts without activity.
    pub cookie_duration: Duration,

    /// The canonical name of the timezone used for "today", e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The one connection to the application database.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Set up the database tables on `db_connection` and derive the cookie
    /// key from `cookie_secret`.
    ///
    /// `local_timezone` is checked on use, so an unknown name only fails
    /// the requests that need today's date.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// Lets `PrivateCookieJar` find the key in the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretch `secret` to the 64 bytes a cookie [Key] needs.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
