use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::env;

/// Fixed environment variables and the setting key each one fills.
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("ENV", "env"),
    ("POSTGRES_HOST", "postgres.host"),
    ("POSTGRES_PORT", "postgres.port"),
    ("POSTGRES_DB", "postgres.db"),
    ("POSTGRES_DB_TEST", "postgres.db_test"),
    ("POSTGRES_USER", "postgres.user"),
    ("POSTGRES_PASSWORD", "postgres.password"),
    ("TOKEN", "auth.token"),
    ("TOKEN_SECRET", "auth.token_secret"),
    ("BCRYPT_PASSWORD", "auth.bcrypt_password"),
    ("SALT_ROUNDS", "auth.salt_rounds"),
];

/// bcrypt's accepted cost range.
pub const MIN_SALT_ROUNDS: u32 = 4;
pub const MAX_SALT_ROUNDS: u32 = 31;

/// Upper bound for `auth.token_expiry_hours` (one year).
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 24 * 365;

/// Which database the process talks to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunEnv {
    #[serde(alias = "development")]
    Dev,
    Test,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub db_test: Option<String>,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl PostgresConfig {
    pub fn database_for(&self, env: RunEnv) -> Result<&str, ConfigError> {
        match env {
            RunEnv::Dev => Ok(&self.db),
            RunEnv::Test => self
                .db_test
                .as_deref()
                .ok_or_else(|| ConfigError::NotFound("POSTGRES_DB_TEST".into())),
        }
    }

    pub fn connect_options(&self, env: RunEnv) -> Result<PgConnectOptions, ConfigError> {
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(self.database_for(env)?))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub token_secret: String,
    /// Pepper appended to every password before hashing.
    pub bcrypt_password: String,
    pub salt_rounds: u32,
    pub token_expiry_hours: i64,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    pub allowed_origins: Vec<String>,
    pub max_age: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub env: RunEnv,
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults()?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder, |key| env::var(key).ok())
    }

    /// Builds settings from defaults plus the fixed variables read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::finish(Self::defaults()?, lookup)
    }

    pub fn database_name(&self) -> Result<&str, ConfigError> {
        self.postgres.database_for(self.env)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("env", "dev")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("postgres.host", "127.0.0.1")?
            .set_default("postgres.port", 5432)?
            .set_default("postgres.db", "storefront")?
            .set_default("postgres.user", "postgres")?
            .set_default("postgres.max_connections", 5)?
            .set_default("auth.salt_rounds", 10)?
            .set_default("auth.token_expiry_hours", 24)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("cors.max_age", 3600)
    }

    fn finish<F>(builder: ConfigBuilder<DefaultState>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings: Settings = Self::with_overrides(builder, lookup)?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn with_overrides<F>(
        mut builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for &(var, key) in ENV_KEYS {
            let value = lookup(var).filter(|v| !v.is_empty());
            builder = builder.set_override_option(key, value)?;
        }
        Ok(builder)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_secret.trim().is_empty() {
            return Err(ConfigError::Message("TOKEN_SECRET must not be empty".into()));
        }
        if self.auth.bcrypt_password.is_empty() {
            return Err(ConfigError::Message("BCRYPT_PASSWORD must not be empty".into()));
        }
        if !(MIN_SALT_ROUNDS..=MAX_SALT_ROUNDS).contains(&self.auth.salt_rounds) {
            return Err(ConfigError::Message(format!(
                "SALT_ROUNDS must be between {} and {}, got {}",
                MIN_SALT_ROUNDS,
                MAX_SALT_ROUNDS,
                self.auth.salt_rounds
            )));
        }
        if !(1..=MAX_TOKEN_EXPIRY_HOURS).contains(&self.auth.token_expiry_hours) {
            return Err(ConfigError::Message(format!(
                "auth.token_expiry_hours must be between 1 and {}, got {}",
                MAX_TOKEN_EXPIRY_HOURS, self.auth.token_expiry_hours
            )));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::Message("server.workers must be at least 1".into()));
        }
        if self.postgres.max_connections == 0 {
            return Err(ConfigError::Message("postgres.max_connections must be at least 1".into()));
        }
        self.database_name()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match key {
            "ENV" => Some("test".into()),
            "POSTGRES_DB_TEST" => Some("storefront_test".into()),
            "POSTGRES_PASSWORD" => Some("postgres".into()),
            "TOKEN_SECRET" => Some("test_secret".into()),
            "BCRYPT_PASSWORD" => Some("test_pepper".into()),
            "SALT_ROUNDS" => Some("4".into()),
            _ => None,
        })
    }
}
