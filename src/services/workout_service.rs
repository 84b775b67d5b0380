// src/services/workout_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MemberRepository, TrainerRepository, WorkoutPlanRepository},
    models::{
        auth::{Role, User},
        workout::{CreateWorkoutPlanPayload, PlanDocument, WorkoutPlanDetail},
    },
};

// Perfil criado para o ADMIN que monta planos
const ADMIN_SPECIALIZATION: &str = "Administrator";

/// Quem escreve o plano quando o corpo da requisição não traz um.
/// A implementação com modelo de linguagem fica fora deste serviço.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &CreateWorkoutPlanPayload) -> Result<Value, AppError>;
}

/// Nenhum gerador configurado: o plano tem que vir pronto.
pub struct ManualPlans;

#[async_trait]
impl PlanGenerator for ManualPlans {
    async fn generate(&self, _request: &CreateWorkoutPlanPayload) -> Result<Value, AppError> {
        Err(AppError::BadRequest(
            "No plan generator is configured; send the plan in the request body".into(),
        ))
    }
}

#[derive(Clone)]
pub struct WorkoutService {
    pool: PgPool,
    member_repo: MemberRepository,
    trainer_repo: TrainerRepository,
    workout_repo: WorkoutPlanRepository,
    generator: Arc<dyn PlanGenerator>,
}

impl WorkoutService {
    pub fn new(
        pool: PgPool,
        member_repo: MemberRepository,
        trainer_repo: TrainerRepository,
        workout_repo: WorkoutPlanRepository,
        generator: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self { pool, member_repo, trainer_repo, workout_repo, generator }
    }

    /// Grava um plano para o aluno. O autor precisa ser TRAINER (com perfil)
    /// ou ADMIN (o perfil é criado na hora).
    pub async fn create_plan(
        &self,
        author: &User,
        payload: CreateWorkoutPlanPayload,
    ) -> Result<WorkoutPlanDetail, AppError> {
        if !author.role.is_staff() {
            return Err(AppError::Forbidden);
        }

        // 1. O aluno existe? (antes de gastar uma chamada ao gerador)
        self.member_repo
            .find_by_id(&self.pool, payload.member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        // 2. Plano enviado ou gerado
        let raw = match &payload.plan {
            Some(plan) => plan.clone(),
            None => self.generator.generate(&payload).await?,
        };
        let document = PlanDocument::try_from(raw)?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 3. Perfil de treinador do autor
        let trainer_id = match author.role {
            Role::Admin => {
                self.trainer_repo
                    .ensure_profile(&mut *tx, author.id, ADMIN_SPECIALIZATION)
                    .await?
            }
            _ => self.trainer_repo
                .find_id_by_user(&mut *tx, author.id)
                .await?
                .ok_or(AppError::TrainerNotFound)?,
        };

        // 4. Grava e relê com os nomes
        let plan_id = self.workout_repo
            .create(&mut *tx, payload.member_id, trainer_id, &document, payload.fitness_level)
            .await?;

        let plan = self.workout_repo
            .find_by_id(&mut *tx, plan_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Workout plan {} vanished after insert", plan_id))?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("📋 Workout plan {} created for member {} by {}", plan.id, plan.member_id, author.email);
        Ok(plan)
    }

    /// Planos de um aluno, mais recentes primeiro. Aluno só vê os próprios.
    pub async fn list_plans(&self, viewer: &User, member_id: Uuid) -> Result<Vec<WorkoutPlanDetail>, AppError> {
        let member = self.member_repo
            .find_by_id(&self.pool, member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        if !viewer.role.is_staff() && member.user_id != viewer.id {
            return Err(AppError::Forbidden);
        }

        self.workout_repo.list_for_member(member_id).await
    }

    pub async fn latest_plan(&self, member_id: Uuid) -> Result<Option<WorkoutPlanDetail>, AppError> {
        self.workout_repo.latest_for_member(member_id).await
    }
}
