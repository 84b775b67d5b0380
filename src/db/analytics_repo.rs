// src/db/analytics_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::analytics::{MemberCounts, TierCount},
};

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn member_counts(&self, now: DateTime<Utc>) -> Result<MemberCounts, AppError> {
        let counts = sqlx::query_as::<_, MemberCounts>(
            r#"
            SELECT
                COUNT(*) AS total_members,
                COUNT(*) FILTER (WHERE is_active AND expires_at > $1) AS active_members,
                COUNT(*) FILTER (WHERE expires_at <= $1) AS expired_members,
                COUNT(*) FILTER (WHERE is_checked_in) AS checked_in_now
            FROM members
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    pub async fn members_by_tier(&self) -> Result<Vec<TierCount>, AppError> {
        let tiers = sqlx::query_as::<_, TierCount>(
            r#"
            SELECT membership_tier AS tier, COUNT(*) AS count
            FROM members
            GROUP BY membership_tier
            ORDER BY membership_tier
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tiers)
    }

    pub async fn visits_since(&self, since: DateTime<Utc>) -> Result<i64, AppError> {
        let visits = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance_records WHERE checked_in_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(visits)
    }
}
