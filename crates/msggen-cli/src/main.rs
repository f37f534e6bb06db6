use anyhow::Result;
use clap::Parser;
use msggen_core::{Config, Input};
use msggen_ingestion::{create_record_channel, GeneratorInput};
use msggen_output::{OutputFormat, StdoutWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// msggen - bounded message generator input
#[derive(Parser, Debug)]
#[command(name = "msggen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of records to produce (overrides config)
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Message prefix (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Output format: json or raw (overrides config)
    #[arg(short, long)]
    format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Print the input's configuration options and exit
    #[arg(long)]
    print_schema: bool,
}

fn log_level(args: &Args, config: &Config) -> Option<Level> {
    if args.verbose {
        return Some(Level::DEBUG);
    }
    match config.general.log_level.as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        let config = Config::default();
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    // Load configuration
    let mut config = if let Some(ref config_path) = args.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    if let Some(level) = log_level(&args, &config) {
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
    info!(instance = %config.general.instance_name, "Starting msggen");

    // CLI values go through the same validation as file values
    if let Some(count) = args.count {
        config.input.insert("count".to_string(), serde_json::Value::from(count));
    }
    if let Some(ref prefix) = args.prefix {
        config.input.insert("prefix".to_string(), serde_json::Value::from(prefix.as_str()));
    }

    let input = Arc::new(GeneratorInput::new(&config.input)?);

    if args.print_schema {
        for option in input.config_schema() {
            println!("{}", option);
        }
        return Ok(());
    }

    // Determine output format (CLI overrides config)
    let output_format = args
        .format
        .as_deref()
        .unwrap_or(&config.output.stdout.format);
    let mut writer = StdoutWriter::with_format(OutputFormat::parse(output_format));

    let (mut sender, mut receiver) = create_record_channel(config.general.buffer_size);

    let producer = {
        let input = input.clone();
        tokio::spawn(async move { input.start(&mut sender).await })
    };

    // Ctrl-C requests a cooperative stop
    let watcher = {
        let input = input.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping input");
                input.stop();
            }
        })
    };

    let mut written: u64 = 0;
    while let Some(record) = receiver.recv().await {
        if config.output.stdout.enabled {
            writer.write(&record).await?;
        }
        written += 1;
    }

    let pushed = producer.await??;
    input
        .await_stop_until(Box::pin(async {
            let _ = tokio::signal::ctrl_c().await;
        }))
        .await?;
    watcher.abort();

    info!(pushed = pushed, written = written, "Input finished");

    Ok(())
}
