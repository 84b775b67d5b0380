// src/db/trainer_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Clone, Default)]
pub struct TrainerRepository;

impl TrainerRepository {
    pub fn new() -> Self {
        Self
    }

    /// Cria o perfil de treinador de um usuário. Retorna o ID do treinador.
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        specialization: Option<&str>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO trainers (user_id, specialization)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(specialization)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn find_id_by_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM trainers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?;

        Ok(id)
    }

    /// Devolve o perfil existente ou cria um (usado para ADMIN).
    pub async fn ensure_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        specialization: &str,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O DO UPDATE vazio faz o RETURNING devolver a linha que já existia
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO trainers (user_id, specialization)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(specialization)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }
}
