use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;

use subcheck::models::ProxyList;
use subcheck::settings::update_settings_from_file;
use subcheck::{process, ParseSettings, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

/// Normalize and deduplicate a proxy subscription
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Subscription file to read; standard input when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Keep descriptors that describe the same endpoint
    #[arg(long)]
    no_dedup: bool,
}

fn read_payload(input: Option<&PathBuf>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))
        }
        None => {
            let mut payload = Vec::new();
            io::stdin()
                .read_to_end(&mut payload)
                .context("failed to read standard input")?;
            Ok(payload)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(config) = args.config.as_deref() {
        update_settings_from_file(config)
            .with_context(|| format!("failed to load settings from '{}'", config))?;
    }
    let settings = Settings::current();

    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or(settings.log_level.as_str()));

    let payload = read_payload(args.input.as_ref())?;
    info!("Read {} bytes of subscription data", payload.len());

    let mut parse_settings = ParseSettings::from(settings.as_ref());
    if args.no_dedup {
        parse_settings.enable_dedup = false;
    }
    let proxies = process(&payload, &parse_settings)?;

    let output = match args.format {
        OutputFormat::Yaml => serde_yaml::to_string(&ProxyList {
            proxies: &proxies,
        })?,
        OutputFormat::Json => serde_json::to_string_pretty(&proxies)?,
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
