//! `POST /login` handler.
//!
//! A body that is not a valid form counts as invalid credentials.
//!
//! Maps a `LoginDecision` onto the wire:
//! - throttled (blocked or ban just triggered) → 429 with `Retry-After`
//! - invalid credentials → 302 to the failure page
//! - authenticated → 302 to the success page

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{rejection::FormRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::http::request::{client_key, user_agent};
use crate::http::server::AppState;
use crate::security::LoginDecision;

/// Form body of a login attempt.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let ip = client_key(&peer);
    let ua = user_agent(&headers);

    let (form, decision) = match form {
        Ok(Form(form)) => {
            let decision = state.guard.attempt(
                &ip,
                state.verifier.as_ref(),
                &form.username,
                &form.password,
            );
            (form, decision)
        }
        Err(rejection) => {
            tracing::debug!(ip = %ip, error = %rejection, "Malformed login body");
            let decision = state.guard.attempt(&ip, &reject_all, "", "");
            (LoginForm::default(), decision)
        }
    };
    let username = form.username.as_str();

    match decision {
        LoginDecision::Blocked { retry_after } => {
            tracing::warn!(
                ip = %ip,
                username,
                user_agent = ua,
                remaining_ban_secs = retry_after.as_secs(),
                "Login attempt blocked (banned)"
            );
            too_many_attempts(retry_after)
        }
        LoginDecision::BanTriggered { retry_after } => {
            tracing::warn!(
                ip = %ip,
                username,
                user_agent = ua,
                remaining_ban_secs = retry_after.as_secs(),
                "Login failure, caller banned"
            );
            too_many_attempts(retry_after)
        }
        LoginDecision::InvalidCredentials => {
            tracing::warn!(ip = %ip, username, user_agent = ua, "Login failure");
            found(&state.login.failure_redirect)
        }
        LoginDecision::Authenticated => {
            tracing::info!(ip = %ip, username, "Login success");
            found(&state.login.success_redirect)
        }
    }
}

fn reject_all(_: &str, _: &str) -> bool {
    false
}

fn too_many_attempts(retry_after: Duration) -> Response {
    let secs = retry_after.as_secs();
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, secs.to_string())],
        format!("Too many failed login attempts. Try again in {secs}s."),
    )
        .into_response()
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
