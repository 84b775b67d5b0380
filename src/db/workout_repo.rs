// src/db/workout_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::workout::{FitnessLevel, PlanDocument, WorkoutPlanDetail},
};

// Plano com nome/e-mail do aluno e nome do treinador
const PLAN_DETAIL_SELECT: &str = r#"
    SELECT
        w.id, w.member_id, mu.name AS member_name, mu.email AS member_email,
        w.trainer_id, tu.name AS trainer_name,
        w.title, w.description, w.plan, w.weeks, w.fitness_level, w.created_at
    FROM workout_plans w
    JOIN members m ON m.id = w.member_id
    JOIN users mu ON mu.id = m.user_id
    JOIN trainers t ON t.id = w.trainer_id
    JOIN users tu ON tu.id = t.user_id
"#;

#[derive(Clone)]
pub struct WorkoutPlanRepository {
    pool: PgPool,
}

impl WorkoutPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        member_id: Uuid,
        trainer_id: Uuid,
        document: &PlanDocument,
        fitness_level: FitnessLevel,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO workout_plans (member_id, trainer_id, title, description, plan, weeks, fitness_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(member_id)
        .bind(trainer_id)
        .bind(&document.title)
        .bind(&document.description)
        .bind(&document.plan)
        .bind(document.weeks)
        .bind(fitness_level)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkoutPlanDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, WorkoutPlanDetail>(&format!("{PLAN_DETAIL_SELECT} WHERE w.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(plan)
    }

    /// Planos do aluno, mais recentes primeiro.
    pub async fn list_for_member(&self, member_id: Uuid) -> Result<Vec<WorkoutPlanDetail>, AppError> {
        let plans = sqlx::query_as::<_, WorkoutPlanDetail>(&format!(
            "{PLAN_DETAIL_SELECT} WHERE w.member_id = $1 ORDER BY w.created_at DESC"
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    pub async fn latest_for_member(&self, member_id: Uuid) -> Result<Option<WorkoutPlanDetail>, AppError> {
        let plan = sqlx::query_as::<_, WorkoutPlanDetail>(&format!(
            "{PLAN_DETAIL_SELECT} WHERE w.member_id = $1 ORDER BY w.created_at DESC LIMIT 1"
        ))
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }
}
