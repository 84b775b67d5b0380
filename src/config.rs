// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{
        AnalyticsRepository, AttendanceRepository, CapacityRepository, MemberRepository,
        TrainerRepository, UserRepository, WorkoutPlanRepository,
    },
    services::{
        analytics_service::AnalyticsService,
        auth::AuthService,
        capacity_feed::CapacityFeed,
        checkin_service::CheckInService,
        member_service::MemberService,
        workout_service::{ManualPlans, WorkoutService},
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// ADMIN criado na inicialização, se configurado
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    // Cookie de auth só por HTTPS
    pub cookie_secure: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (o ambiente, nos casos reais).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let bootstrap_admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: lookup("ADMIN_NAME").unwrap_or_else(|| "Admin User".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            db_max_connections,
            cookie_secure,
            bootstrap_admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cookie_secure: bool,
    pub auth_service: AuthService,
    pub member_service: MemberService,
    pub checkin_service: CheckInService,
    pub analytics_service: AnalyticsService,
    pub workout_service: WorkoutService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Failed to connect to the database")?;

        tracing::info!("✅ Database connection established");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let member_repo = MemberRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let capacity_repo = CapacityRepository::new();
        let analytics_repo = AnalyticsRepository::new(db_pool.clone());
        let trainer_repo = TrainerRepository::new();
        let workout_repo = WorkoutPlanRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            member_repo.clone(),
            trainer_repo.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let checkin_service = CheckInService::new(
            db_pool.clone(),
            member_repo.clone(),
            attendance_repo,
            capacity_repo,
            CapacityFeed::new(),
        );
        // Sem gerador configurado: o plano vem pronto no POST
        let workout_service = WorkoutService::new(
            db_pool.clone(),
            member_repo.clone(),
            trainer_repo,
            workout_repo,
            Arc::new(ManualPlans),
        );
        let member_service = MemberService::new(
            db_pool.clone(),
            user_repo,
            member_repo,
            checkin_service.clone(),
        );
        let analytics_service = AnalyticsService::new(analytics_repo);

        Self {
            db_pool,
            cookie_secure: config.cookie_secure,
            auth_service,
            member_service,
            checkin_service,
            analytics_service,
            workout_service,
        }
    }
}
