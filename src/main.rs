mod cli;

use melodex::{
    config::{self, Config},
    server::{self, AppContext},
    watch::MusicWatcher,
};
use melodex_db::pool::{get_conn, init_pool, DbPool};
use melodex_db::queries::catalog;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn open_pool(config: &Config) -> Result<DbPool> {
    let db_path = config.library.database_path.to_string_lossy();
    tracing::info!("Opening catalog database at {}", db_path);
    init_pool(&db_path).with_context(|| format!("Failed to open database {}", db_path))
}

async fn start(config: Config) -> Result<()> {
    tracing::info!("Starting melodex");
    let pool = open_pool(&config)?;

    let mut watcher = MusicWatcher::new(&config.library.music_dir, pool.clone())
        .context("Failed to initialize music watcher")?;
    watcher.start().context("Failed to start music watcher")?;

    let ctx = AppContext::new(config, pool);
    let server_result = server::serve(ctx, server::shutdown_signal()).await;

    tracing::info!("Shutting down...");
    if let Err(e) = watcher.close().await {
        tracing::warn!("Failed to stop music watcher cleanly: {}", e);
    }

    server_result
}

fn scan(config: &Config) -> Result<()> {
    let pool = open_pool(config)?;
    let watcher = MusicWatcher::new(&config.library.music_dir, pool.clone())
        .context("Failed to initialize music watcher")?;

    let summary = watcher.rescan();
    let total = catalog::count_entries(&*get_conn(&pool)?)?;
    println!("Scanned {}", watcher.root().display());
    println!("  Added:     {}", summary.inserted);
    println!("  Unchanged: {}", summary.unchanged);
    println!("  Failed:    {}", summary.failed);
    println!("Catalog now holds {} entries", total);
    Ok(())
}

fn list(config: &Config, json: bool) -> Result<()> {
    let pool = open_pool(config)?;
    let conn = get_conn(&pool)?;
    let entries = catalog::list_all(&conn)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("Catalog is empty.");
    } else {
        for entry in &entries {
            println!("{:>6}  {}  ({})", entry.id.get(), entry.name, entry.relative_path);
        }
        println!("\n{} entries", entries.len());
    }
    Ok(())
}

fn validate(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, checking defaults");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Auth enabled: {}", config.server.auth.enabled);
    println!(
        "  Session timeout: {}h",
        config.server.auth.session_timeout_hours
    );
    println!("  Music dir: {}", config.library.music_dir.display());
    println!("  Database: {}", config.library.database_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "melodex=trace,melodex_db=debug,tower_http=debug".to_string()
        } else {
            "melodex=debug,melodex_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start(config))
        }
        Commands::Scan => scan(&config::load_config_or_default(cli.config.as_deref())?),
        Commands::List { json } => list(
            &config::load_config_or_default(cli.config.as_deref())?,
            json,
        ),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate(path.as_deref())
        }
        Commands::Version => {
            println!("melodex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
