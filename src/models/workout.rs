// src/models/workout.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::member::{Gender, MemberDetail},
};

const DEFAULT_PLAN_TITLE: &str = "4-Week Workout Plan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fitness_level", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

// --- PLANO (workout_plans JOIN alunos/treinadores) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanDetail {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub member_email: String,
    pub trainer_id: Uuid,
    pub trainer_name: String,

    #[schema(example = "4-Week Strength Training Program")]
    pub title: String,
    pub description: String,

    // Documento completo: semanas, dias, exercícios, dicas
    #[schema(value_type = Object)]
    pub plan: Value,

    pub weeks: i32,
    pub fitness_level: FitnessLevel,
    pub created_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutPlanPayload {
    pub member_id: Uuid,

    #[validate(range(min = 16, max = 100, message = "Age must be between 16 and 100"))]
    pub age: i32,

    pub gender: Gender,
    pub fitness_level: FitnessLevel,

    #[validate(length(min = 1, message = "At least one goal is required"))]
    #[schema(example = json!(["Build strength", "Lose fat"]))]
    pub goals: Vec<String>,

    #[validate(range(min = 1, max = 7, message = "Days per week must be between 1 and 7"))]
    pub days_per_week: i32,

    #[validate(range(min = 15, max = 180, message = "Minutes per session must be between 15 and 180"))]
    pub minutes_per_session: i32,

    #[schema(example = "Full gym")]
    pub equipment: String,

    /// Plano pronto (`{ title, description, weeks: [...] }`). Sem ele, o gerador configurado é chamado.
    #[schema(value_type = Option<Object>)]
    pub plan: Option<Value>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WorkoutPlanListQuery {
    pub member_id: Uuid,
}

// --- DOCUMENTO VALIDADO ---

/// Plano conferido antes de ir para o banco: precisa de `title` e de uma lista
/// não vazia em `weeks`. `weeks` da tabela é o tamanho dessa lista.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDocument {
    pub title: String,
    pub description: String,
    pub weeks: i32,
    pub plan: Value,
}

impl TryFrom<Value> for PlanDocument {
    type Error = AppError;

    fn try_from(plan: Value) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| AppError::BadRequest(format!("Invalid plan structure: {reason}"));

        let object = plan.as_object().ok_or_else(|| invalid("expected a JSON object"))?;

        let title = match object.get("title") {
            Some(Value::String(t)) if !t.trim().is_empty() => t.trim().to_string(),
            Some(Value::String(_)) | None => DEFAULT_PLAN_TITLE.to_string(),
            Some(_) => return Err(invalid("title must be a string")),
        };

        let description = match object.get("description") {
            Some(Value::String(d)) => d.clone(),
            None | Some(Value::Null) => String::new(),
            Some(_) => return Err(invalid("description must be a string")),
        };

        let weeks = object
            .get("weeks")
            .and_then(Value::as_array)
            .filter(|weeks| !weeks.is_empty())
            .ok_or_else(|| invalid("weeks must be a non-empty array"))?
            .len();

        Ok(Self {
            title,
            description,
            weeks: i32::try_from(weeks).map_err(|_| invalid("too many weeks"))?,
            plan,
        })
    }
}

// --- RESPOSTAS ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanResponse {
    pub success: bool,
    pub workout_plan: WorkoutPlanDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkoutPlanListResponse {
    pub plans: Vec<WorkoutPlanDetail>,
}

// Painel do aluno: o próprio perfil e o plano mais recente
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyMemberResponse {
    pub member: MemberDetail,
    pub latest_plan: Option<WorkoutPlanDetail>,
}
