// src/services/checkin_service.rs

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AttendanceRepository, CapacityRepository, MemberRepository},
    models::checkin::{
        AttendanceRecord, CapacityOverview, CapacitySetting, CapacitySnapshot, CheckInAction,
        CheckInMemberSummary, CheckInResponse,
    },
    services::capacity_feed::CapacityFeed,
};

/// O "Capacity Tracker": transições de presença e a lotação agregada.
///
/// Toda escrita que pode mudar a lotação roda numa única transação que trava
/// primeiro a linha de `capacity_settings` e depois a do aluno. A lotação é
/// sempre recontada a partir das flags dos alunos, nunca incrementada.
#[derive(Clone)]
pub struct CheckInService {
    pool: PgPool,
    member_repo: MemberRepository,
    attendance_repo: AttendanceRepository,
    capacity_repo: CapacityRepository,
    feed: CapacityFeed,
}

impl CheckInService {
    pub fn new(
        pool: PgPool,
        member_repo: MemberRepository,
        attendance_repo: AttendanceRepository,
        capacity_repo: CapacityRepository,
        feed: CapacityFeed,
    ) -> Self {
        Self { pool, member_repo, attendance_repo, capacity_repo, feed }
    }

    pub fn feed(&self) -> &CapacityFeed {
        &self.feed
    }

    // --- recordTransition ---
    pub async fn record_transition(
        &self,
        member_id: Uuid,
        action: CheckInAction,
    ) -> Result<CheckInResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Ponto de serialização: trava a linha agregada
        self.capacity_repo.lock(&mut *tx).await?;

        // 2. Trava o aluno
        let presence = self.member_repo
            .lock_presence(&mut *tx, member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        let now = Utc::now();

        // 3. Aplica a transição
        let is_checked_in = match (action, presence.is_checked_in) {
            (CheckInAction::Checkin, true) => {
                tracing::info!("Member {} is already checked in, nothing to do", member_id);
                true
            }
            (CheckInAction::Checkin, false) => {
                self.member_repo.set_presence(&mut *tx, member_id, true, now).await?;
                let visit = self.attendance_repo.open_visit(&mut *tx, member_id, now).await?;
                tracing::info!("✅ Member {} checked in (visit {})", member_id, visit.id);
                true
            }
            (CheckInAction::Checkout, false) => {
                tracing::info!("Member {} is not checked in, checkout ignored", member_id);
                false
            }
            (CheckInAction::Checkout, true) => {
                self.member_repo.set_presence(&mut *tx, member_id, false, now).await?;
                match self.attendance_repo.close_latest_open_visit(&mut *tx, member_id, now).await? {
                    Some(visit) => {
                        tracing::info!("👋 Member {} checked out (visit {})", member_id, visit.id)
                    }
                    None => tracing::warn!(
                        "⚠️ Member {} was flagged as checked in without an open visit; flag cleared",
                        member_id
                    ),
                }
                false
            }
        };

        // 4. Recontagem completa + escrita do agregado
        let setting = self.rederive_occupancy(&mut *tx).await?;

        tx.commit().await?;

        // 5. Só publica o que foi commitado
        let capacity = CapacitySnapshot::from(&setting);
        self.feed.publish(capacity);

        Ok(CheckInResponse {
            success: true,
            member: CheckInMemberSummary {
                id: presence.id,
                name: presence.name,
                is_checked_in,
            },
            capacity,
        })
    }

    // --- readCapacity ---
    pub async fn read_capacity(&self) -> Result<CapacityOverview, AppError> {
        // Leitura num único snapshot, sem travar escritores
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let setting = self.capacity_repo.get(&mut *tx).await?;
        let checked_in_members = self.member_repo.list_checked_in(&mut *tx).await?;

        tx.commit().await?;

        Ok(CapacityOverview {
            capacity: CapacitySnapshot::from(&setting),
            checked_in_members,
        })
    }

    pub async fn current_snapshot(&self) -> Result<CapacitySnapshot, AppError> {
        let setting = self.capacity_repo.get(&self.pool).await?;
        Ok(CapacitySnapshot::from(&setting))
    }

    pub async fn update_max_capacity(&self, max_capacity: i32) -> Result<CapacitySnapshot, AppError> {
        if max_capacity < 0 {
            return Err(AppError::BadRequest("Maximum capacity cannot be negative".into()));
        }

        let mut tx = self.pool.begin().await?;
        self.capacity_repo.lock(&mut *tx).await?;
        let setting = self.capacity_repo.set_max(&mut *tx, max_capacity).await?;
        tx.commit().await?;

        tracing::info!("Maximum capacity set to {}", max_capacity);

        let snapshot = CapacitySnapshot::from(&setting);
        self.feed.publish(snapshot);
        Ok(snapshot)
    }

    pub async fn attendance_history(&self, member_id: Uuid) -> Result<Vec<AttendanceRecord>, AppError> {
        self.member_repo
            .find_by_id(&self.pool, member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        self.attendance_repo.list_for_member(member_id).await
    }

    /// Trava a linha agregada na transação de quem chama.
    pub(crate) async fn lock_capacity(
        &self,
        conn: &mut PgConnection,
    ) -> Result<CapacitySetting, AppError> {
        self.capacity_repo.lock(conn).await
    }

    /// Reconta quem está dentro e grava no agregado. Quem chama já deve ter
    /// travado a linha agregada na mesma transação.
    pub(crate) async fn rederive_occupancy(
        &self,
        conn: &mut PgConnection,
    ) -> Result<CapacitySetting, AppError> {
        let current = self.member_repo.count_checked_in(&mut *conn).await?;
        self.capacity_repo.set_current(&mut *conn, current).await
    }

    pub(crate) fn publish(&self, setting: &CapacitySetting) {
        self.feed.publish(CapacitySnapshot::from(setting));
    }
}

// Cenários contra um Postgres de verdade (cada teste ganha um banco novo com as migrations).
// Rode com: DATABASE_URL=postgres://... cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::UserRepository,
        models::{auth::Role, member::MembershipTier},
    };

    fn service(pool: &PgPool) -> CheckInService {
        CheckInService::new(
            pool.clone(),
            MemberRepository::new(pool.clone()),
            AttendanceRepository::new(pool.clone()),
            CapacityRepository::new(),
            CapacityFeed::new(),
        )
    }

    async fn new_member(pool: &PgPool, email: &str) -> Uuid {
        let user = UserRepository::new(pool.clone())
            .create_user(pool, email, "hash", email, Role::Member)
            .await
            .unwrap();
        MemberRepository::new(pool.clone())
            .create_profile(pool, user.id, None, None, None, MembershipTier::Basic, Utc::now())
            .await
            .unwrap()
    }

    async fn open_visits(pool: &PgPool, member_id: Uuid) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance_records WHERE member_id = $1 AND checked_out_at IS NULL",
        )
        .bind(member_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    // flag <=> visita aberta, para todos os alunos
    async fn assert_flags_match_open_visits(pool: &PgPool) {
        let mismatches: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM members m
            WHERE m.is_checked_in <> EXISTS (
                SELECT 1 FROM attendance_records a
                WHERE a.member_id = m.id AND a.checked_out_at IS NULL
            )
            "#,
        )
        .fetch_one(pool)
        .await
        .unwrap();
        assert_eq!(mismatches, 0);
    }

    async fn assert_aggregate_matches_flags(pool: &PgPool) {
        let (stored, counted): (i32, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT current_capacity FROM capacity_settings WHERE id = 1),
                (SELECT COUNT(*) FROM members WHERE is_checked_in)
            "#,
        )
        .fetch_one(pool)
        .await
        .unwrap();
        assert_eq!(stored as i64, counted);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn check_in_check_out_scenario(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;
        let b = new_member(&pool, "b@gym.local").await;

        let r = tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();
        assert_eq!((r.capacity.current, r.capacity.max, r.capacity.percentage), (1, 100, 1));
        assert!(r.member.is_checked_in);

        let r = tracker.record_transition(b, CheckInAction::Checkin).await.unwrap();
        assert_eq!(r.capacity.current, 2);

        let r = tracker.record_transition(a, CheckInAction::Checkout).await.unwrap();
        assert_eq!(r.capacity.current, 1);
        assert!(!r.member.is_checked_in);

        let r = tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();
        assert_eq!(r.capacity.current, 2);

        // A visita antiga continua fechada e uma nova foi aberta
        let history = tracker.attendance_history(a).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].checked_out_at.is_none());
        assert!(history[1].checked_out_at.is_some());

        assert_flags_match_open_visits(&pool).await;
        assert_aggregate_matches_flags(&pool).await;
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn checkout_when_already_out_changes_nothing(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;
        let b = new_member(&pool, "b@gym.local").await;
        tracker.record_transition(b, CheckInAction::Checkin).await.unwrap();

        let r = tracker.record_transition(a, CheckInAction::Checkout).await.unwrap();
        assert_eq!(r.capacity.current, 1);
        assert!(!r.member.is_checked_in);
        assert!(tracker.attendance_history(a).await.unwrap().is_empty());

        assert_flags_match_open_visits(&pool).await;
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn double_check_in_keeps_a_single_open_visit(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;

        tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();
        let r = tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();

        assert_eq!(r.capacity.current, 1);
        assert_eq!(open_visits(&pool, a).await, 1);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn unknown_member_is_not_found(pool: PgPool) {
        let result = service(&pool)
            .record_transition(Uuid::new_v4(), CheckInAction::Checkin)
            .await;
        assert!(matches!(result, Err(AppError::MemberNotFound)));
        assert_aggregate_matches_flags(&pool).await;
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_check_ins_are_all_counted(pool: PgPool) {
        let tracker = service(&pool);
        let mut members = Vec::new();
        for i in 0..10 {
            members.push(new_member(&pool, &format!("m{i}@gym.local")).await);
        }

        let mut tasks = tokio::task::JoinSet::new();
        for id in members {
            let tracker = tracker.clone();
            tasks.spawn(async move { tracker.record_transition(id, CheckInAction::Checkin).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let overview = tracker.read_capacity().await.unwrap();
        assert_eq!(overview.capacity.current, 10);
        assert_eq!(overview.checked_in_members.len(), 10);
        assert_aggregate_matches_flags(&pool).await;
        assert_flags_match_open_visits(&pool).await;
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn read_capacity_lists_latest_check_in_first(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;
        let b = new_member(&pool, "b@gym.local").await;
        tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();
        tracker.record_transition(b, CheckInAction::Checkin).await.unwrap();

        let overview = tracker.read_capacity().await.unwrap();
        let ids: Vec<Uuid> = overview.checked_in_members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(overview.checked_in_members[0].email, "b@gym.local");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn zero_max_capacity_reports_zero_percent(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;

        tracker.update_max_capacity(0).await.unwrap();
        let r = tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();

        assert_eq!((r.capacity.current, r.capacity.max, r.capacity.percentage), (1, 0, 0));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn committed_transitions_are_published(pool: PgPool) {
        let tracker = service(&pool);
        let mut rx = tracker.feed().subscribe();
        let a = new_member(&pool, "a@gym.local").await;

        tracker.record_transition(a, CheckInAction::Checkin).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().current, 1);

        // Falha não publica nada
        let _ = tracker.record_transition(Uuid::new_v4(), CheckInAction::Checkin).await;
        tracker.record_transition(a, CheckInAction::Checkout).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().current, 0);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn checkout_without_open_visit_clears_the_flag(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;
        let b = new_member(&pool, "b@gym.local").await;
        tracker.record_transition(b, CheckInAction::Checkin).await.unwrap();

        // Flag ligada sem visita aberta (dado legado)
        sqlx::query("UPDATE members SET is_checked_in = TRUE, last_checked_in = NOW() WHERE id = $1")
            .bind(a)
            .execute(&pool)
            .await
            .unwrap();

        let r = tracker.record_transition(a, CheckInAction::Checkout).await.unwrap();

        assert!(!r.member.is_checked_in);
        assert_eq!(r.capacity.current, 1);
        assert!(tracker.attendance_history(a).await.unwrap().is_empty());
        assert_flags_match_open_visits(&pool).await;
        assert_aggregate_matches_flags(&pool).await;
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn every_write_bumps_the_snapshot_version(pool: PgPool) {
        let tracker = service(&pool);
        let a = new_member(&pool, "a@gym.local").await;

        let before = tracker.current_snapshot().await.unwrap().version;
        let first = tracker.record_transition(a, CheckInAction::Checkin).await.unwrap().capacity;
        let second = tracker.update_max_capacity(50).await.unwrap();
        let third = tracker.record_transition(a, CheckInAction::Checkout).await.unwrap().capacity;

        assert!(before < first.version);
        assert!(first.version < second.version);
        assert!(second.version < third.version);
        assert_eq!(tracker.current_snapshot().await.unwrap().version, third.version);
    }
}
