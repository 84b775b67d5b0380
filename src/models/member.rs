// src/models/member.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- ENUMS ---

// Mapeia o CREATE TYPE membership_tier do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "membership_tier", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipTier {
    Basic,
    Premium,
    Vip,
}

impl FromStr for MembershipTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BASIC" => Ok(MembershipTier::Basic),
            "PREMIUM" => Ok(MembershipTier::Premium),
            "VIP" => Ok(MembershipTier::Vip),
            other => Err(AppError::BadRequest(format!("Unknown membership tier '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "gender", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

// --- ALUNO (members JOIN users) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetail {
    pub id: Uuid,
    pub user_id: Uuid,

    #[schema(example = "Jane Smith")]
    pub name: String,

    #[schema(example = "jane@gym.local")]
    pub email: String,

    pub phone: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub membership_tier: MembershipTier,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,

    // Estado de presença, mantido pelo check-in
    pub is_checked_in: bool,
    pub last_checked_in: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberPayload {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub phone: Option<String>,

    #[validate(range(min = 16, max = 100, message = "Age must be between 16 and 100"))]
    pub age: Option<i32>,

    pub gender: Option<Gender>,

    pub membership_tier: MembershipTier,

    /// RFC 3339 ou `YYYY-MM-DD`
    #[schema(example = "2026-12-31")]
    pub expires_at: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberPayload {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,

    #[validate(range(min = 16, max = 100, message = "Age must be between 16 and 100"))]
    pub age: Option<i32>,

    pub gender: Option<Gender>,
    pub membership_tier: Option<MembershipTier>,
    pub expires_at: Option<String>,
    pub is_active: Option<bool>,
}

// Query string de GET /api/members
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberListQuery {
    /// Trecho do nome ou e-mail (sem diferenciar maiúsculas)
    pub search: Option<String>,
    /// BASIC, PREMIUM, VIP ou ALL
    pub tier: Option<String>,
    /// ACTIVE, INACTIVE ou ALL
    pub status: Option<String>,
}

// Filtro já interpretado, pronto para o repositório
#[derive(Debug, Default, PartialEq)]
pub struct MemberFilter {
    pub search: Option<String>,
    pub tier: Option<MembershipTier>,
    pub is_active: Option<bool>,
}

impl TryFrom<MemberListQuery> for MemberFilter {
    type Error = AppError;

    fn try_from(query: MemberListQuery) -> Result<Self, Self::Error> {
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let tier = match query.tier.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(t) if t.eq_ignore_ascii_case("ALL") => None,
            Some(t) => Some(t.parse::<MembershipTier>()?),
        };

        let is_active = match query.status.as_deref().map(|s| s.trim().to_ascii_uppercase()) {
            None => None,
            Some(s) if s.is_empty() || s == "ALL" => None,
            Some(s) if s == "ACTIVE" => Some(true),
            Some(s) if s == "INACTIVE" => Some(false),
            Some(s) => return Err(AppError::BadRequest(format!("Unknown status '{s}'"))),
        };

        Ok(Self { search, tier, is_active })
    }
}

/// Aceita um timestamp RFC 3339 ou uma data simples (`YYYY-MM-DD`, meia-noite UTC).
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid expiry date '{raw}'")))
}

// --- RESPOSTAS ---

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberListResponse {
    pub members: Vec<MemberDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    pub success: bool,
    pub member: MemberDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteMemberResponse {
    pub success: bool,
    pub message: String,
}
