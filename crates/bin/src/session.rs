//! Cookie plumbing between HTTP requests and the session layer
//!
//! The login cookie carries a session token. Resolving it gives the user's
//! identity, and from that the user's [`SessionHandle`].

use feline::{
    auth::{AuthError, SessionToken, TokenStore},
    session::{SessionHandle, SessionStore},
};
use tower_cookies::{Cookie, Cookies};

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "session_token";

/// The token presented by the request, if any.
pub fn request_token(cookies: &Cookies) -> Option<SessionToken> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| SessionToken::from(cookie.value()))
}

/// Resolve the request's cookie to the user's session.
///
/// A missing cookie and an unknown token both fail with
/// [`AuthError::InvalidToken`].
pub async fn active_session(
    tokens: &TokenStore,
    sessions: &SessionStore,
    cookies: &Cookies,
) -> Result<SessionHandle, AuthError> {
    let Some(token) = request_token(cookies) else {
        tracing::debug!("No {SESSION_COOKIE} cookie");
        return Err(AuthError::InvalidToken);
    };
    let user = tokens.resolve(&token).await.inspect_err(|_| {
        tracing::debug!("Invalid {SESSION_COOKIE} cookie");
    })?;
    Ok(sessions.get_or_create(&user).await)
}

pub fn set_session_cookie(cookies: &Cookies, token: &SessionToken) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
}

pub fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}
