// src/db/capacity_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::checkin::CapacitySetting};

#[derive(Clone, Default)]
pub struct CapacityRepository;

impl CapacityRepository {
    pub fn new() -> Self {
        Self
    }

    // A linha única é criada pela migration; se sumir é erro de instalação.
    fn missing_row() -> AppError {
        AppError::InternalServerError(anyhow::anyhow!("capacity_settings row (id = 1) is missing"))
    }

    pub async fn get<'e, E>(&self, executor: E) -> Result<CapacitySetting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CapacitySetting>(
            "SELECT current_capacity, max_capacity, version FROM capacity_settings WHERE id = 1",
        )
        .fetch_optional(executor)
        .await?
        .ok_or_else(Self::missing_row)
    }

    /// Trava a linha agregada. Toda escrita que mexe na lotação passa por aqui
    /// primeiro, o que serializa as transições.
    pub async fn lock<'e, E>(&self, executor: E) -> Result<CapacitySetting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CapacitySetting>(
            r#"
            SELECT current_capacity, max_capacity, version
            FROM capacity_settings
            WHERE id = 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(executor)
        .await?
        .ok_or_else(Self::missing_row)
    }

    pub async fn set_current<'e, E>(&self, executor: E, current: i32) -> Result<CapacitySetting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CapacitySetting>(
            r#"
            UPDATE capacity_settings
            SET current_capacity = $1, version = version + 1, updated_at = NOW()
            WHERE id = 1
            RETURNING current_capacity, max_capacity, version
            "#,
        )
        .bind(current)
        .fetch_optional(executor)
        .await?
        .ok_or_else(Self::missing_row)
    }

    pub async fn set_max<'e, E>(&self, executor: E, max: i32) -> Result<CapacitySetting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CapacitySetting>(
            r#"
            UPDATE capacity_settings
            SET max_capacity = $1, version = version + 1, updated_at = NOW()
            WHERE id = 1
            RETURNING current_capacity, max_capacity, version
            "#,
        )
        .bind(max)
        .fetch_optional(executor)
        .await?
        .ok_or_else(Self::missing_row)
    }
}
