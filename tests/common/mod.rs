use storefront_backend::Settings;

/// Settings for integration tests; Postgres values may be overridden by the environment.
pub fn test_settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "ENV" => Some("test".into()),
        "TOKEN_SECRET" => Some("test_secret".into()),
        "BCRYPT_PASSWORD" => Some("test_pepper".into()),
        "SALT_ROUNDS" => Some("4".into()),
        "POSTGRES_DB_TEST" => {
            Some(std::env::var("POSTGRES_DB_TEST").unwrap_or_else(|_| "storefront_test".into()))
        }
        "POSTGRES_PASSWORD" => {
            Some(std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".into()))
        }
        other => std::env::var(other).ok().filter(|_| other.starts_with("POSTGRES_")),
    })
    .expect("Failed to load test config")
}
