//! Authentication route handlers.
//!
//! Login exchanges a username and password with the backend auth service
//! for a bearer token, which is kept in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::backend::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::SignedInUser;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
}

/// Map an error code from the query string to a message.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid username or password",
        "session" => "Could not start your session, please try again",
        _ => "Login is unavailable right now, please try again later",
    }
}

/// Display the login page.
#[instrument(skip(session, auth))]
pub async fn login_page(
    session: Session,
    auth: OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        ctx: PageContext::load(&session, &auth).await,
        error: query.error.as_deref().map(|code| error_message(code).to_string()),
    }
}

/// Handle login form submission.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);

    match state.auth().login(form.username.trim(), &password).await {
        Ok(response) => {
            let user = SignedInUser::new(response.username.clone(), &response.credential());

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&user.username);
            tracing::info!("Signed in");
            Redirect::to("/products").into_response()
        }
        Err(ApiError::Status { status, .. })
            if status == StatusCode::UNAUTHORIZED
                || status == StatusCode::FORBIDDEN
                || status == StatusCode::BAD_REQUEST =>
        {
            tracing::info!(%status, "Login refused");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Redirect::to("/auth/login?error=unavailable").into_response()
        }
    }
}

/// Handle logout.
///
/// Drops the credential but keeps the cart.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/products").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(error_message("credentials"), "Invalid username or password");
        assert!(error_message("session").contains("session"));
        assert!(error_message("anything-else").contains("unavailable"));
    }
}
