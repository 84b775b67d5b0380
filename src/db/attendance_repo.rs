// src/db/attendance_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::checkin::AttendanceRecord};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Abre uma visita nova. O índice parcial garante no máximo uma aberta por aluno.
    pub async fn open_visit<'e, E>(
        &self,
        executor: E,
        member_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (member_id, checked_in_at)
            VALUES ($1, $2)
            RETURNING id, member_id, checked_in_at, checked_out_at
            "#,
        )
        .bind(member_id)
        .bind(at)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Fecha a visita aberta mais recente. None se não havia visita aberta.
    pub async fn close_latest_open_visit<'e, E>(
        &self,
        executor: E,
        member_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance_records
            SET checked_out_at = GREATEST($2, checked_in_at)
            WHERE id = (
                SELECT id
                FROM attendance_records
                WHERE member_id = $1 AND checked_out_at IS NULL
                ORDER BY checked_in_at DESC
                LIMIT 1
            )
            RETURNING id, member_id, checked_in_at, checked_out_at
            "#,
        )
        .bind(member_id)
        .bind(at)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Histórico de visitas do aluno, mais recente primeiro.
    pub async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, member_id, checked_in_at, checked_out_at
            FROM attendance_records
            WHERE member_id = $1
            ORDER BY checked_in_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
