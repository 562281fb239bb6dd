use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthData, LoginRequest, PublicUser, RegisterRequest, UserData},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{Role, User},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(get_me))
        .route("/auth/logout", post(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Field-by-field registration validation, first violation wins.
fn validate_register(payload: RegisterRequest) -> Result<(String, String, String, Role), ApiError> {
    let (name, email, password) = match (payload.name, payload.email, payload.password) {
        (Some(n), Some(e), Some(p)) if !n.trim().is_empty() && !p.is_empty() => {
            (n.trim().to_string(), e.trim().to_lowercase(), p)
        }
        _ => {
            return Err(ApiError::Validation(
                "Please provide name, email and password".into(),
            ))
        }
    };
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok((name, email, password, payload.role.unwrap_or_default()))
}

fn validate_login(payload: LoginRequest) -> Result<(String, String), ApiError> {
    match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => {
            Ok((e.trim().to_lowercase(), p))
        }
        _ => Err(ApiError::Validation(
            "Please provide email and password".into(),
        )),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    let (name, email, password, role) = validate_register(payload)?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &name, &email, &hash, role).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            AuthData {
                user: PublicUser::from(&user),
                token,
            },
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let (email, password) = validate_login(payload)?;

    // Unknown email and wrong password share one message so neither leaks
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Auth("Invalid email or password".into()));
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("Invalid email or password".into()));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login on deactivated account");
        return Err(ApiError::Auth(
            "Account is deactivated. Please contact support.".into(),
        ));
    }

    User::touch_last_login(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthData {
            user: PublicUser::from(&user),
            token,
        },
    )))
}

#[instrument(skip_all)]
pub async fn get_me(
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<UserData>>, ApiError> {
    Ok(Json(ApiResponse::ok(UserData {
        user: PublicUser::from(&user),
    })))
}

/// Stateless no-op: the token stays valid until its natural expiry.
#[instrument(skip_all)]
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<ApiResponse<()>> {
    info!(user_id = %user.id, "user logged out");
    Json(ApiResponse::message("Logged out successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
            role: None,
        }
    }

    #[test]
    fn register_requires_all_fields() {
        let err = validate_register(RegisterRequest {
            name: None,
            email: Some("a@x.com".into()),
            password: Some("secret1".into()),
            role: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Please provide name, email and password");
    }

    #[test]
    fn register_normalizes_email_and_defaults_role() {
        let (name, email, password, role) =
            validate_register(register_payload("A", "  A@X.com ", "secret1")).unwrap();
        assert_eq!(name, "A");
        assert_eq!(email, "a@x.com");
        assert_eq!(password, "secret1");
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn register_keeps_explicit_role() {
        let mut payload = register_payload("A", "a@x.com", "secret1");
        payload.role = Some(Role::Teacher);
        let (_, _, _, role) = validate_register(payload).unwrap();
        assert_eq!(role, Role::Teacher);
    }

    #[test]
    fn register_rejects_bad_email_and_short_password() {
        let err = validate_register(register_payload("A", "not-an-email", "secret1")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email");

        let err = validate_register(register_payload("A", "a@x.com", "short")).unwrap_err();
        assert_eq!(err.to_string(), "Password too short");
    }

    #[test]
    fn login_requires_both_fields() {
        let err = validate_login(LoginRequest {
            email: Some("a@x.com".into()),
            password: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Please provide email and password");
    }

    #[test]
    fn login_normalizes_email() {
        let (email, password) = validate_login(LoginRequest {
            email: Some(" A@X.com ".into()),
            password: Some("secret1".into()),
        })
        .unwrap();
        assert_eq!(email, "a@x.com");
        assert_eq!(password, "secret1");
    }

    #[test]
    fn email_regex_accepts_plausible_addresses_only() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name+tag@sub.example.org"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user example.com"));
        assert!(!is_valid_email("user@nodot"));
    }
}
