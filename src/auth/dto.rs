use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::{Role, User};

/// Request body for user registration. Fields are optional so presence can be
/// validated explicitly with a 400 instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to clients. Never carries the password.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// Payload of register/login responses.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: PublicUser,
    pub token: String,
}

/// Payload of GET /auth/me.
#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$hash".into(),
            role: Role::Student,
            is_active: true,
            last_login: None,
            profile_picture: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_projection_has_no_password_field() {
        let json = serde_json::to_string(&PublicUser::from(&sample_user())).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(json.contains(r#""role":"student""#));
        assert!(!json.contains("password"));
    }

    #[test]
    fn profile_picture_omitted_when_absent() {
        let mut user = sample_user();
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("profilePicture"));

        user.profile_picture = Some("avatar.png".into());
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains(r#""profilePicture":"avatar.png""#));
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(req.name.is_none());
        assert!(req.password.is_none());
        assert!(req.role.is_none());
    }
}
