//! Session handling for the single pre-provisioned user.
//!
//! A user logs in with their password and receives an encrypted cookie
//! holding a [Token]. Protected routes are wrapped in [auth_guard] or
//! [auth_guard_hx], which check the cookie and keep the session alive.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub(crate) use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub(super) use token::Token;
pub use user::{User, UserID, create_user_table, get_user_by_id, set_user_password};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
