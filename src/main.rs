use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod front;
mod media;
mod utils;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TikTok link to resolve; starts an interactive session when omitted
    url: Option<String>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Take the link from the clipboard
    #[arg(short, long, conflicts_with = "url")]
    paste: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Save the media (or open the embed page) after resolving
    #[arg(short, long)]
    download: bool,

    /// Where downloads are saved
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("TOKGRAB_CONFIG") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/tokgrab/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/tokgrab/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

fn init_logging(format: &str) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = get_config_path(&args);
    let config = match &config_path {
        Some(path) => config::Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => config::Config::default(),
    };

    init_logging(config.get_logging_format());

    info!("Starting tokgrab...");
    match &config_path {
        Some(path) => info!("Loaded config from: {}", path),
        None => info!("No config file found, using defaults"),
    }

    let client = media::build_client(&config.providers)?;
    let download_client = media::build_download_client(&config.providers, &config.download)?;
    let frontend = front::Frontend {
        resolver: media::MediaResolver::new(&config, client),
        download_client,
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.download.resolved_output_dir()),
    };

    let input = if args.paste {
        match front::paste().await {
            Ok(link) => Some(link),
            Err(notice) if notice.is_error() => return Ok(ExitCode::FAILURE),
            Err(_) => return Ok(ExitCode::SUCCESS),
        }
    } else {
        args.url.clone()
    };

    match input {
        Some(input) => {
            let opts = front::OnceOptions {
                json: args.json,
                download: args.download,
            };
            let notice = front::run_once(&frontend, &input, &opts).await?;
            if notice.is_error() {
                return Ok(ExitCode::FAILURE);
            }
        }
        None => front::console::run(Arc::new(frontend)).await?,
    }

    Ok(ExitCode::SUCCESS)
}
