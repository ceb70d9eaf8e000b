pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;

use std::sync::Arc;
use sqlx::PgPool;
use tracing::{info, warn};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthenticatedUser, Claims, PasswordHasher, TokenService};
pub use db::{PgUserStore, User, UserStore};
pub use routes::{configure, health_check, index};

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: PgPool,
    pub users: Arc<dyn UserStore>,
    pub passwords: PasswordHasher,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Settings) -> Result<Self> {
        let db_pool = db::connect(&config)?;
        let users = Arc::new(PgUserStore::new(db_pool.clone()));
        Self::with_store(config, db_pool, users)
    }

    /// Assembles state around an explicit user store.
    pub fn with_store(config: Settings, db_pool: PgPool, users: Arc<dyn UserStore>) -> Result<Self> {
        Ok(Self {
            passwords: PasswordHasher::from_config(&config.auth),
            tokens: TokenService::from_config(&config.auth)?,
            config: Arc::new(config),
            db_pool,
            users,
        })
    }

    /// Checks the pre-issued `TOKEN`, if any. Never fatal.
    pub fn check_configured_token(&self) -> Option<Claims> {
        let token = self.config.auth.token.as_deref()?;
        match self.tokens.verify(token) {
            Ok(claims) => {
                info!(username = %claims.username, "Configured TOKEN is valid");
                Some(claims)
            }
            Err(e) => {
                warn!("Configured TOKEN does not verify against TOKEN_SECRET: {}", e);
                None
            }
        }
    }

    pub async fn shutdown(&self) {
        self.db_pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_clone() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = AppState::new(config).expect("state");

        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.users, &cloned.users));
    }

    #[tokio::test]
    async fn test_configured_token() {
        let mut config = Settings::new_for_test().unwrap();
        let issuer = TokenService::from_config(&config.auth).unwrap();
        let user = User::new("ada".into(), "Ada".into(), "Lovelace".into(), "digest".into());
        config.auth.token = Some(issuer.sign(&user).unwrap());

        let state = AppState::new(config.clone()).unwrap();
        let claims = state.check_configured_token().expect("valid token");
        assert_eq!(claims.username, "ada");

        config.auth.token = Some("not.a.token".into());
        let state = AppState::new(config.clone()).unwrap();
        assert!(state.check_configured_token().is_none());

        config.auth.token = None;
        let state = AppState::new(config).unwrap();
        assert!(state.check_configured_token().is_none());
    }
}
