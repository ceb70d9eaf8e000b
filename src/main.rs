use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::net::TcpListener;
use storefront_backend::config::CorsConfig;
use storefront_backend::db::{self, migrations};
use storefront_backend::{configure, AppState, Settings};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Apache-style access log line, one per request.
const ACCESS_LOG_FORMAT: &str = r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %Dms"#;

#[derive(Debug, Parser)]
#[command(name = "storefront-backend", version, about = "REST backend over Postgres with JWT auth")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Manage the database schema
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Debug, Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the most recent migration
    Down,
    /// Revert every migration
    Reset,
    /// List migrations and whether they are applied
    Status,
}

fn build_cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
    };

    cors.max_age(config.max_age as usize)
}

async fn serve(config: Settings) -> anyhow::Result<()> {
    let state = AppState::new(config.clone()).context("failed to initialize application state")?;
    state.check_configured_token();
    let state = web::Data::new(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).with_context(|| format!("failed to bind {}", address))?;
    info!("Server listening on http://{}", address);

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&cors_config))
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .app_data(state.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn migrate(config: Settings, action: MigrateAction) -> anyhow::Result<()> {
    let pool = db::connect(&config)?;
    info!("Running migrations against database {}", config.database_name()?);

    match action {
        MigrateAction::Up => migrations::up(&pool).await?,
        MigrateAction::Down => {
            if let Some(version) = migrations::down(&pool).await? {
                println!("reverted {}", version);
            }
        }
        MigrateAction::Reset => migrations::reset(&pool).await?,
        MigrateAction::Status => {
            for migration in migrations::status(&pool).await? {
                let mark = if migration.applied { "applied" } else { "pending" };
                println!("{} {} [{}]", migration.version, migration.description, mark);
            }
        }
    }

    pool.close().await;
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    let config = Settings::new().context("failed to load configuration")?;
    info!(env = ?config.env, "Configuration loaded successfully");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate { action } => migrate(config, action).await,
    }
}
