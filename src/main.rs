mod cli;

use inkpost::{config, images::ImageService, server};
use inkpost_common::PostId;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting inkpost server");
    tracing::info!(
        "Storing images under {:?}, metadata in {:?}",
        config.storage.upload_dir,
        config.storage.database_path
    );

    let images = ImageService::from_config(&config)?;
    server::start_server(config, images).await
}

async fn fetch_url(url: &str, post_id: i64, config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let post_id = PostId::new(post_id)?;

    let images = ImageService::from_config(&config)?;
    let record = images
        .fetch_one(url, post_id)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "inkpost=trace,inkpost_probe=debug,inkpost_db=debug,tower_http=debug".to_string()
        } else {
            "inkpost=debug,inkpost_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Fetch { url, post_id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(fetch_url(&url, post_id, cli.config.as_deref()))
        }
        Commands::Inspect { file, json } => inspect_file(&file, json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("inkpost {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn inspect_file(file: &std::path::Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let data = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let detected = inkpost_probe::detect(&data);
    let valid = detected.is_some_and(|kind| inkpost_probe::validate(&data, kind));

    if json {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "size": data.len(),
            "kind": detected,
            "valid": valid,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File: {}", file.display());
        println!("Size: {} bytes", data.len());
        match detected {
            Some(kind) => println!("Kind: {} ({})", kind, kind.mime_type()),
            None => println!("Kind: unknown"),
        }
        println!("Valid: {}", if valid { "yes" } else { "no" });
    }

    // Surfaces the same error the ingest pipeline would report.
    inkpost_probe::inspect(&data).map_err(inkpost_common::Error::from)?;
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Upload dir: {}", config.storage.upload_dir.display());
            println!("  Database: {}", config.storage.database_path.display());
            println!(
                "  Fetch: max {} bytes, batch {} ({} concurrent)",
                config.fetch.max_image_bytes,
                config.fetch.max_batch_size,
                config.fetch.batch_concurrency
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
