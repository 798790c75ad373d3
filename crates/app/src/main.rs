use clap::Parser;
use migration::{Migrator, MigratorTrait};

mod cli;
mod run;
mod settings;

const DEFAULT_DATABASE_URL: &str = "sqlite:./pynny.db?mode=rwc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pynny={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .or_else(|| settings.database.url())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
    let db = connect_db(&url).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let today = chrono::Local::now().date_naive();
    if let Err(err) = run::run(&engine, cli.command, cli.user.as_deref(), today).await {
        tracing::debug!("command failed: {err}");
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn connect_db(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    tracing::debug!("connecting to {url}");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
