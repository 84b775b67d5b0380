// src/db/member_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        checkin::{CheckedInMember, MemberPresence},
        member::{Gender, MemberDetail, MemberFilter, MembershipTier},
    },
};

// members JOIN users: o aluno sempre sai com nome e e-mail
const MEMBER_DETAIL_SELECT: &str = r#"
    SELECT
        m.id, m.user_id, u.name, u.email,
        m.phone, m.age, m.gender, m.membership_tier, m.expires_at, m.is_active,
        m.is_checked_in, m.last_checked_in,
        m.created_at, m.updated_at
    FROM members m
    JOIN users u ON u.id = m.user_id
"#;

#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CADASTRO
    // =========================================================================

    /// Lista alunos aplicando busca, plano e status. Mais novos primeiro.
    pub async fn list(&self, filter: &MemberFilter) -> Result<Vec<MemberDetail>, AppError> {
        let members = sqlx::query_as::<_, MemberDetail>(&format!(
            r#"
            {MEMBER_DETAIL_SELECT}
            WHERE ($1::text IS NULL
                   OR strpos(lower(u.name), lower($1)) > 0
                   OR strpos(lower(u.email), lower($1)) > 0)
              AND ($2::membership_tier IS NULL OR m.membership_tier = $2)
              AND ($3::boolean IS NULL OR m.is_active = $3)
            ORDER BY m.created_at DESC
            "#
        ))
        .bind(filter.search.as_deref())
        .bind(filter.tier)
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<MemberDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, MemberDetail>(&format!(
            "{MEMBER_DETAIL_SELECT} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(member)
    }

    // Perfil do próprio usuário logado (painel do aluno)
    pub async fn find_by_user_id<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<MemberDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, MemberDetail>(&format!(
            "{MEMBER_DETAIL_SELECT} WHERE m.user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(member)
    }

    /// Cria o perfil de aluno para um usuário já existente. Retorna o ID do aluno.
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        phone: Option<&str>,
        age: Option<i32>,
        gender: Option<Gender>,
        tier: MembershipTier,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO members (user_id, phone, age, gender, membership_tier, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(phone)
        .bind(age)
        .bind(gender)
        .bind(tier)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Atualiza só os campos preenchidos. Retorna o user_id, ou None se o aluno não existe.
    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        phone: Option<&str>,
        age: Option<i32>,
        gender: Option<Gender>,
        tier: Option<MembershipTier>,
        expires_at: Option<DateTime<Utc>>,
        is_active: Option<bool>,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE members
            SET phone = COALESCE($2, phone),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender),
                membership_tier = COALESCE($5, membership_tier),
                expires_at = COALESCE($6, expires_at),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING user_id
            "#,
        )
        .bind(id)
        .bind(phone)
        .bind(age)
        .bind(gender)
        .bind(tier)
        .bind(expires_at)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;

        Ok(user_id)
    }

    // =========================================================================
    //  PRESENÇA (check-in / check-out)
    // =========================================================================

    /// Trava a linha do aluno (FOR UPDATE) até o fim da transação.
    pub async fn lock_presence<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<MemberPresence>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let presence = sqlx::query_as::<_, MemberPresence>(
            r#"
            SELECT m.id, u.name, m.is_checked_in
            FROM members m
            JOIN users u ON u.id = m.user_id
            WHERE m.id = $1
            FOR UPDATE OF m
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(presence)
    }

    /// Marca o aluno como dentro (carimbando `last_checked_in`) ou fora.
    pub async fn set_presence<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        checked_in: bool,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE members
            SET is_checked_in = $2,
                last_checked_in = CASE WHEN $2 THEN $3 ELSE last_checked_in END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(checked_in)
        .bind(at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Recontagem completa de quem está dentro.
    pub async fn count_checked_in<'e, E>(&self, executor: E) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i32>(
            "SELECT COUNT(*)::INT FROM members WHERE is_checked_in",
        )
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    /// Quem está dentro agora, check-in mais recente primeiro.
    pub async fn list_checked_in<'e, E>(&self, executor: E) -> Result<Vec<CheckedInMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, CheckedInMember>(
            r#"
            SELECT m.id, u.name, u.email, m.last_checked_in AS checked_in_at
            FROM members m
            JOIN users u ON u.id = m.user_id
            WHERE m.is_checked_in
            ORDER BY m.last_checked_in DESC NULLS LAST
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(members)
    }
}
