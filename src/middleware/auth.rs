use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Bearer token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

/// Identity for endpoints that also serve guests.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

pub fn decode_bearer(auth_str: &str, secret: &str) -> Result<AuthUser, AppError> {
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    };

    let decoded = decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        decode_bearer(auth_str, &jwt_secret()?)
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(OptionalAuthUser(None));
        };

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        decode_bearer(auth_str, &jwt_secret()?).map(|user| OptionalAuthUser(Some(user)))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(sub: &str, role: &str, secret: &str) -> anyhow::Result<String> {
        let claims = Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?)
    }

    #[test]
    fn decodes_valid_bearer() -> anyhow::Result<()> {
        let user_id = Uuid::new_v4();
        let header = format!("Bearer {}", token(&user_id.to_string(), "admin", "s3cret")?);

        let user = decode_bearer(&header, "s3cret")?;

        assert_eq!(user.user_id, user_id);
        assert!(ensure_admin(&user).is_ok());
        Ok(())
    }

    #[test]
    fn rejects_wrong_secret_and_scheme() -> anyhow::Result<()> {
        let raw = token(&Uuid::new_v4().to_string(), "user", "s3cret")?;

        assert!(matches!(
            decode_bearer(&format!("Bearer {raw}"), "other"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            decode_bearer(&format!("Basic {raw}"), "s3cret"),
            Err(AppError::Unauthorized(_))
        ));
        Ok(())
    }

    #[test]
    fn customers_are_not_admins() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: "user".into(),
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden)));
    }
}
