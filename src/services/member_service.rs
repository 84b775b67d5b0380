// src/services/member_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MemberRepository, UserRepository},
    models::{
        auth::Role,
        member::{parse_expiry, CreateMemberPayload, MemberDetail, MemberFilter, UpdateMemberPayload},
    },
    services::{auth::hash_password, checkin_service::CheckInService},
};

#[derive(Clone)]
pub struct MemberService {
    pool: PgPool,
    user_repo: UserRepository,
    member_repo: MemberRepository,
    checkin_service: CheckInService,
}

impl MemberService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        member_repo: MemberRepository,
        checkin_service: CheckInService,
    ) -> Self {
        Self { pool, user_repo, member_repo, checkin_service }
    }

    pub async fn list_members(&self, filter: &MemberFilter) -> Result<Vec<MemberDetail>, AppError> {
        self.member_repo.list(filter).await
    }

    pub async fn get_member(&self, id: Uuid) -> Result<MemberDetail, AppError> {
        self.member_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::MemberNotFound)
    }

    // Perfil de aluno do usuário logado
    pub async fn get_member_for_user(&self, user_id: Uuid) -> Result<MemberDetail, AppError> {
        self.member_repo
            .find_by_user_id(&self.pool, user_id)
            .await?
            .ok_or(AppError::MemberNotFound)
    }

    /// Cria usuário (MEMBER) + perfil de aluno numa transação só.
    pub async fn create_member(&self, payload: CreateMemberPayload) -> Result<MemberDetail, AppError> {
        let expires_at = parse_expiry(&payload.expires_at)?;
        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self.user_repo
            .create_user(&mut *tx, &payload.email, &hashed_password, &payload.name, Role::Member)
            .await?;

        let member_id = self.member_repo
            .create_profile(
                &mut *tx,
                user.id,
                payload.phone.as_deref(),
                payload.age,
                payload.gender,
                payload.membership_tier,
                expires_at,
            )
            .await?;

        let member = self.member_repo
            .find_by_id(&mut *tx, member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        tx.commit().await?;

        tracing::info!("🆕 Member {} created ({})", member.id, member.email);
        Ok(member)
    }

    pub async fn update_member(
        &self,
        id: Uuid,
        payload: UpdateMemberPayload,
    ) -> Result<MemberDetail, AppError> {
        let expires_at = payload.expires_at.as_deref().map(parse_expiry).transpose()?;

        let mut tx = self.pool.begin().await?;

        let user_id = self.member_repo
            .update_profile(
                &mut *tx,
                id,
                payload.phone.as_deref(),
                payload.age,
                payload.gender,
                payload.membership_tier,
                expires_at,
                payload.is_active,
            )
            .await?
            .ok_or(AppError::MemberNotFound)?;

        if payload.name.is_some() || payload.email.is_some() {
            self.user_repo
                .update_identity(&mut *tx, user_id, payload.name.as_deref(), payload.email.as_deref())
                .await?;
        }

        let member = self.member_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        tx.commit().await?;
        Ok(member)
    }

    /// Apaga o usuário do aluno (cascata para perfil e visitas) e reconta a
    /// lotação na mesma transação: um aluno apagado lá dentro não pode sobrar na contagem.
    pub async fn delete_member(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.checkin_service.lock_capacity(&mut *tx).await?;

        let member = self.member_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        self.user_repo.delete_user(&mut *tx, member.user_id).await?;

        let setting = self.checkin_service.rederive_occupancy(&mut *tx).await?;

        tx.commit().await?;

        if member.is_checked_in {
            tracing::info!("Deleted member {} was checked in; occupancy now {}", id, setting.current_capacity);
        }
        self.checkin_service.publish(&setting);

        tracing::info!("🗑️ Member {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{AttendanceRepository, CapacityRepository},
        models::{checkin::CheckInAction, member::MembershipTier},
        services::capacity_feed::CapacityFeed,
    };

    fn services(pool: &PgPool) -> (MemberService, CheckInService) {
        let member_repo = MemberRepository::new(pool.clone());
        let checkin = CheckInService::new(
            pool.clone(),
            member_repo.clone(),
            AttendanceRepository::new(pool.clone()),
            CapacityRepository::new(),
            CapacityFeed::new(),
        );
        let members = MemberService::new(
            pool.clone(),
            UserRepository::new(pool.clone()),
            member_repo,
            checkin.clone(),
        );
        (members, checkin)
    }

    fn payload(email: &str, tier: MembershipTier) -> CreateMemberPayload {
        CreateMemberPayload {
            name: "Jane Smith".into(),
            email: email.into(),
            password: "password123".into(),
            phone: None,
            age: Some(30),
            gender: None,
            membership_tier: tier,
            expires_at: "2099-01-01".into(),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_email_is_a_conflict(pool: PgPool) {
        let (members, _) = services(&pool);
        members.create_member(payload("jane@gym.local", MembershipTier::Vip)).await.unwrap();

        let again = members.create_member(payload("jane@gym.local", MembershipTier::Basic)).await;
        assert!(matches!(again, Err(AppError::EmailAlreadyExists)));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn list_filters_by_search_tier_and_status(pool: PgPool) {
        let (members, _) = services(&pool);
        let vip = members.create_member(payload("vip@gym.local", MembershipTier::Vip)).await.unwrap();
        members.create_member(payload("basic@gym.local", MembershipTier::Basic)).await.unwrap();

        let found = members
            .list_members(&MemberFilter { tier: Some(MembershipTier::Vip), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, vip.id);

        let found = members
            .list_members(&MemberFilter { search: Some("BASIC@".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        members
            .update_member(vip.id, UpdateMemberPayload { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        let inactive = members
            .list_members(&MemberFilter { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].id, vip.id);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn update_changes_identity_and_profile(pool: PgPool) {
        let (members, _) = services(&pool);
        let jane = members.create_member(payload("jane@gym.local", MembershipTier::Basic)).await.unwrap();

        let updated = members
            .update_member(
                jane.id,
                UpdateMemberPayload {
                    name: Some("Jane Doe".into()),
                    membership_tier: Some(MembershipTier::Premium),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.email, "jane@gym.local");
        assert_eq!(updated.membership_tier, MembershipTier::Premium);
        assert_eq!(updated.age, Some(30));

        let missing = members.update_member(Uuid::new_v4(), UpdateMemberPayload::default()).await;
        assert!(matches!(missing, Err(AppError::MemberNotFound)));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn deleting_a_checked_in_member_lowers_occupancy(pool: PgPool) {
        let (members, checkin) = services(&pool);
        let jane = members.create_member(payload("jane@gym.local", MembershipTier::Basic)).await.unwrap();
        let john = members.create_member(payload("john@gym.local", MembershipTier::Basic)).await.unwrap();
        checkin.record_transition(jane.id, CheckInAction::Checkin).await.unwrap();
        checkin.record_transition(john.id, CheckInAction::Checkin).await.unwrap();

        members.delete_member(jane.id).await.unwrap();

        assert_eq!(checkin.current_snapshot().await.unwrap().current, 1);
        assert!(matches!(members.get_member(jane.id).await, Err(AppError::MemberNotFound)));
        assert!(matches!(members.delete_member(jane.id).await, Err(AppError::MemberNotFound)));
    }
}
