// src/services/analytics_service.rs

use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::AnalyticsRepository,
    models::analytics::AnalyticsSummary,
};

#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
}

impl AnalyticsService {
    pub fn new(repo: AnalyticsRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self) -> Result<AnalyticsSummary, AppError> {
        let now = Utc::now();

        let counts = self.repo.member_counts(now).await?;
        let members_by_tier = self.repo.members_by_tier().await?;
        let visits_today = self.repo.visits_since(start_of_day(now)).await?;

        Ok(AnalyticsSummary { counts, visits_today, members_by_tier })
    }
}

// Meia-noite UTC do mesmo dia
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_of_day_truncates_to_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 18, 45, 12).unwrap();
        assert_eq!(start_of_day(now), Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap());
    }
}
