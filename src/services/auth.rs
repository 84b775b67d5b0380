// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Months, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{MemberRepository, TrainerRepository, UserRepository},
    models::{
        auth::{Claims, Role, User},
        member::MembershipTier,
    },
};

// Validade do token (e do cookie)
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Gera o hash bcrypt fora do runtime assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    member_repo: MemberRepository,
    trainer_repo: TrainerRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        member_repo: MemberRepository,
        trainer_repo: TrainerRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, member_repo, trainer_repo, jwt_secret, pool }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<(String, User), AppError> {
        // ADMIN não se auto-cadastra (vem do bootstrap)
        if role == Role::Admin {
            return Err(AppError::Forbidden);
        }

        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria Usuário
        let new_user = self.user_repo
            .create_user(&mut *tx, email, &hashed_password, name, role)
            .await?;

        // 3. Aluno ganha perfil com plano BASIC de um mês
        if role == Role::Member {
            let expires_at = Utc::now()
                .checked_add_months(Months::new(1))
                .ok_or_else(|| anyhow::anyhow!("Membership expiry overflow"))?;

            let member_id = self.member_repo
                .create_profile(&mut *tx, new_user.id, None, None, None, MembershipTier::Basic, expires_at)
                .await?;

            tracing::info!("🏋️ Member profile {} created for {}", member_id, new_user.email);
        }

        // 4. Treinador ganha perfil (sem especialização)
        if role == Role::Trainer {
            let trainer_id = self.trainer_repo
                .create_profile(&mut *tx, new_user.id, None)
                .await?;

            tracing::info!("🏋️ Trainer profile {} created for {}", trainer_id, new_user.email);
        }

        // 5. Commit
        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        let token = self.create_token(&new_user)?;
        Ok((token, new_user))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Valida o token e recarrega o usuário; usuário apagado perde o acesso na hora.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_claims(token)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Cria um ADMIN se ainda não existir usuário com esse e-mail.
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> Result<bool, AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        let hashed_password = hash_password(password).await?;
        match self.user_repo
            .create_user(&self.pool, email, &hashed_password, name, Role::Admin)
            .await
        {
            Ok(_) => Ok(true),
            // Outra instância criou ao mesmo tempo
            Err(AppError::EmailAlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub(crate) fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn service(secret: &str) -> AuthService {
        // Pool preguiçoso: nenhum teste aqui chega a abrir conexão
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            MemberRepository::new(pool.clone()),
            TrainerRepository::new(),
            secret.to_string(),
            pool,
        )
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "coach@gym.local".into(),
            password_hash: String::new(),
            name: "Coach".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_carries_identity_and_role() {
        let auth = service("secret");
        let coach = user(Role::Trainer);

        let token = auth.create_token(&coach).unwrap();
        let claims = auth.decode_claims(&token).unwrap();

        assert_eq!(claims.sub, coach.id);
        assert_eq!(claims.email, coach.email);
        assert_eq!(claims.role, Role::Trainer);
        assert_eq!(claims.exp - claims.iat, (TOKEN_TTL_DAYS * 24 * 60 * 60) as usize);
    }

    #[tokio::test]
    async fn token_from_another_secret_is_rejected() {
        let token = service("one").create_token(&user(Role::Admin)).unwrap();
        assert!(matches!(service("two").decode_claims(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = service("secret");
        let past = Utc::now() - chrono::Duration::days(1);
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "old@gym.local".into(),
            role: Role::Member,
            exp: past.timestamp() as usize,
            iat: (past - chrono::Duration::days(7)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        assert!(matches!(auth.decode_claims(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        assert!(matches!(service("secret").decode_claims("not.a.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn admin_cannot_self_register() {
        let result = service("secret")
            .register_user("boss@gym.local", "secret1", "Boss", Role::Admin)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("password123").await.unwrap();
        assert!(verify("password123", &hashed).unwrap());
        assert!(!verify("wrong", &hashed).unwrap());
    }

    // --- Cenários com banco (DATABASE_URL=... cargo test -- --ignored) ---

    fn db_service(pool: &PgPool) -> AuthService {
        AuthService::new(
            UserRepository::new(pool.clone()),
            MemberRepository::new(pool.clone()),
            TrainerRepository::new(),
            "secret".to_string(),
            pool.clone(),
        )
    }

    async fn count(pool: &PgPool, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn registering_a_member_creates_a_basic_profile(pool: PgPool) {
        let auth = db_service(&pool);

        let (token, user) = auth
            .register_user("jane@gym.local", "password123", "Jane", Role::Member)
            .await
            .unwrap();
        assert_eq!(auth.decode_claims(&token).unwrap().sub, user.id);

        let member = MemberRepository::new(pool.clone())
            .find_by_user_id(&pool, user.id)
            .await
            .unwrap()
            .expect("member profile");
        assert_eq!(member.membership_tier, MembershipTier::Basic);
        assert!(member.is_active);
        assert!(!member.is_checked_in);

        let days = (member.expires_at - Utc::now()).num_days();
        assert!((27..=31).contains(&days), "expiry {days} days away");

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM trainers").await, 0);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn registering_a_trainer_creates_a_trainer_profile(pool: PgPool) {
        let auth = db_service(&pool);

        let (_, user) = auth
            .register_user("coach@gym.local", "password123", "Coach", Role::Trainer)
            .await
            .unwrap();

        let trainer = TrainerRepository::new().find_id_by_user(&pool, user.id).await.unwrap();
        assert!(trainer.is_some());
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM members").await, 0);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_registration_is_a_conflict(pool: PgPool) {
        let auth = db_service(&pool);
        auth.register_user("jane@gym.local", "password123", "Jane", Role::Member)
            .await
            .unwrap();

        let again = auth
            .register_user("jane@gym.local", "other-pass", "Jane Again", Role::Member)
            .await;
        assert!(matches!(again, Err(AppError::EmailAlreadyExists)));

        // A transação desfeita não deixa perfil órfão
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users").await, 1);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM members").await, 1);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn login_checks_the_password(pool: PgPool) {
        let auth = db_service(&pool);
        auth.register_user("jane@gym.local", "password123", "Jane", Role::Member)
            .await
            .unwrap();

        let (token, user) = auth.login_user("jane@gym.local", "password123").await.unwrap();
        assert_eq!(auth.validate_token(&token).await.unwrap().id, user.id);

        assert!(matches!(
            auth.login_user("jane@gym.local", "wrong-password").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login_user("nobody@gym.local", "password123").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn ensure_admin_runs_once(pool: PgPool) {
        let auth = db_service(&pool);

        assert!(auth.ensure_admin("admin@gym.local", "admin123", "Admin User").await.unwrap());
        assert!(!auth.ensure_admin("admin@gym.local", "changed", "Other Name").await.unwrap());

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM users WHERE role = 'ADMIN'").await, 1);

        // A senha original continua valendo
        let (_, admin) = auth.login_user("admin@gym.local", "admin123").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.name, "Admin User");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn token_of_deleted_user_stops_working(pool: PgPool) {
        let auth = db_service(&pool);
        let (token, user) = auth
            .register_user("jane@gym.local", "password123", "Jane", Role::Member)
            .await
            .unwrap();

        UserRepository::new(pool.clone()).delete_user(&pool, user.id).await.unwrap();

        assert!(matches!(auth.validate_token(&token).await, Err(AppError::InvalidToken)));
    }
}
