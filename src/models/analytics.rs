// src/models/analytics.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::member::MembershipTier;

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberCounts {
    pub total_members: i64,
    pub active_members: i64,
    pub expired_members: i64,
    pub checked_in_now: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierCount {
    pub tier: MembershipTier,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(flatten)]
    pub counts: MemberCounts,
    pub visits_today: i64,
    pub members_by_tier: Vec<TierCount>,
}
