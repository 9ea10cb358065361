// Creates the database and tables for the insights service

use linkedin_insights::{config::Config, infrastructure::Database};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🔧 Setting up the LinkedIn Insights database...");

    if let Err(e) = run().await {
        eprintln!("❌ Database setup failed: {:#}", e);
        eprintln!();
        eprintln!("Please check:");
        eprintln!("  1. MySQL is running");
        eprintln!("  2. DB_HOST, DB_USER and DB_PASSWORD (or DATABASE_URL) are correct");
        eprintln!("  3. The user is allowed to create databases");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    Database::create_database_if_missing(&config.database.url).await?;
    println!("✅ Database is present");

    let db = Database::connect(&config.database.url, 1).await?;
    db.init().await?;
    println!("✅ Tables created: pages, users, posts, comments, page_followers");
    println!();
    println!("Start the API with: cargo run");

    Ok(())
}
