// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::Role,
};

/// 1. O Trait que define quais papéis passam
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
    fn label() -> &'static str;
}

/// 2. O Extractor (Guardião). Depende do `auth_guard` ter rodado antes.
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Confere o papel
        if !T::allows(user.0.role) {
            tracing::warn!(
                "User {} ({:?}) denied: requires {}",
                user.0.id,
                user.0.role,
                T::label()
            );
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

/// ADMIN ou TRAINER
pub struct StaffOnly;
impl RoleDef for StaffOnly {
    fn allows(role: Role) -> bool { role.is_staff() }
    fn label() -> &'static str { "ADMIN or TRAINER" }
}

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(role: Role) -> bool { role == Role::Admin }
    fn label() -> &'static str { "ADMIN" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::User;
    use axum::http::Request;
    use chrono::Utc;
    use uuid::Uuid;

    fn parts_for(role: Option<Role>) -> Parts {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        if let Some(role) = role {
            parts.extensions.insert(AuthenticatedUser(User {
                id: Uuid::new_v4(),
                email: "someone@gym.local".into(),
                password_hash: String::new(),
                name: "Someone".into(),
                role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }));
        }
        parts
    }

    async fn check<T: RoleDef>(role: Option<Role>) -> Result<(), AppError> {
        let mut parts = parts_for(role);
        RequireRole::<T>::from_request_parts(&mut parts, &()).await.map(|_| ())
    }

    #[tokio::test]
    async fn staff_guard_lets_admin_and_trainer_through() {
        assert!(check::<StaffOnly>(Some(Role::Admin)).await.is_ok());
        assert!(check::<StaffOnly>(Some(Role::Trainer)).await.is_ok());
        assert!(matches!(check::<StaffOnly>(Some(Role::Member)).await, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn admin_guard_rejects_trainers() {
        assert!(check::<AdminOnly>(Some(Role::Admin)).await.is_ok());
        assert!(matches!(check::<AdminOnly>(Some(Role::Trainer)).await, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn missing_user_is_unauthenticated() {
        assert!(matches!(check::<StaffOnly>(None).await, Err(AppError::InvalidToken)));
    }
}
