// src/models/checkin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- AÇÃO ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckInAction {
    Checkin,
    Checkout,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPayload {
    pub member_id: Uuid,
    pub action: CheckInAction,
}

// --- TABELAS ---

// Uma visita. Aberta enquanto checked_out_at for NULL.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub member_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

// A linha única da tabela capacity_settings
#[derive(Debug, Clone, FromRow)]
pub struct CapacitySetting {
    pub current_capacity: i32,
    pub max_capacity: i32,
    // Incrementada a cada escrita, na ordem dos commits
    pub version: i64,
}

// Estado do aluno travado durante a transição
#[derive(Debug, Clone, FromRow)]
pub struct MemberPresence {
    pub id: Uuid,
    pub name: String,
    pub is_checked_in: bool,
}

// --- LOTAÇÃO ---

/// `round(current / max * 100)`; com `max = 0` a porcentagem é 0.
pub fn occupancy_percentage(current: i32, max: i32) -> i32 {
    if max <= 0 {
        return 0;
    }
    ((current as f64 / max as f64) * 100.0).round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CapacitySnapshot {
    #[schema(example = 42)]
    pub current: i32,
    #[schema(example = 100)]
    pub max: i32,
    #[schema(example = 42)]
    pub percentage: i32,
    // Versão da linha agregada; só serve para ordenar o feed
    #[serde(skip)]
    pub version: i64,
}

impl CapacitySnapshot {
    pub fn new(current: i32, max: i32) -> Self {
        Self {
            current,
            max,
            percentage: occupancy_percentage(current, max),
            version: 0,
        }
    }

    pub fn with_version(self, version: i64) -> Self {
        Self { version, ..self }
    }
}

impl From<&CapacitySetting> for CapacitySnapshot {
    fn from(setting: &CapacitySetting) -> Self {
        CapacitySnapshot::new(setting.current_capacity, setting.max_capacity)
            .with_version(setting.version)
    }
}

// --- RESPOSTAS ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInMemberSummary {
    pub id: Uuid,
    pub name: String,
    pub is_checked_in: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    pub success: bool,
    pub member: CheckInMemberSummary,
    pub capacity: CapacitySnapshot,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckedInMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub checked_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapacityOverview {
    pub capacity: CapacitySnapshot,
    pub checked_in_members: Vec<CheckedInMember>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCapacityPayload {
    #[validate(range(min = 0, message = "Maximum capacity cannot be negative"))]
    #[schema(example = 120)]
    pub max_capacity: i32,
}
