use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::db::AppState;
use crate::session::SessionId;

pub const SESSION_COOKIE: &str = "storefront_session";

/// Session ids are 32 lowercase hex chars (simple UUID form).
fn is_valid_session_id(value: &str) -> bool {
    value.len() == 32 && value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// Persistent session cookie: survives browser restarts for the session lifetime.
pub fn session_cookie(id: &SessionId, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Load the caller's session id from its cookie, starting a new session
/// when the cookie is missing or names a session this server does not hold.
///
/// The id is exposed to handlers as an `Extension<SessionId>`. A cookie is
/// only written when a new session was started.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|v| is_valid_session_id(v))
        .map(|v| SessionId(v.to_string()))
        .filter(|id| state.sessions.contains(id));

    let Some(session) = existing else {
        let session = state.sessions.create();
        tracing::debug!("Started new session");

        req.extensions_mut().insert(session.clone());
        let response = next.run(req).await;

        let cookie = session_cookie(
            &session,
            state.sessions.lifetime_secs(),
            state.secure_cookies,
        );
        return (jar.add(cookie), response).into_response();
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}
