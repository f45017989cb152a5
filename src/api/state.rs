use std::sync::Arc;
use sqlx::{Pool, Sqlite};
use crate::config::Config;
use crate::crypto::{PasswordHasher, TokenIssuer};
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, config: Arc<Config>) -> Result<Self, AppError> {
        let hasher = PasswordHasher::from_config(&config)?;
        let tokens = TokenIssuer::from_secret(config.token_secret.as_deref(), config.token_ttl_hours)?;

        Ok(AppState {
            db,
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
            config,
        })
    }
}
