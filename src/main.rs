use anyhow::{Context, Result};
use article_scout::config::{
    find_config_file, get_config, load_config, Config, CHROMIUM_PATH_VAR,
    DISABLED_STRATEGIES_VAR, ENABLED_STRATEGIES_VAR,
};
use article_scout::config::file_config::{save_file, CONFIG_FILE_NAME};
use article_scout::ui::{self, Spinner, Status};
use article_scout::{ClaimVerifier, StrategyChain};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Article Scout - Fetch readable article text past bot walls and gather evidence for claims
#[derive(Parser, Debug)]
#[command(name = "article-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Fetch readable article text and gather evidence for claims", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Shorthand for --output json
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (styled text if TTY, JSON otherwise)
    Auto,
    /// Styled, human-readable text
    Text,
    /// JSON format (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Acquire the article text behind a URL
    #[command(alias = "f")]
    Fetch {
        /// Page URL (http or https)
        url: String,
    },

    /// Gather sources and evidence for a factual claim
    #[command(alias = "v")]
    Verify {
        /// The claim to check
        claim: String,

        /// Maximum number of sources to return
        #[arg(long, short)]
        max_sources: Option<usize>,
    },

    /// Write a configuration file with every default spelled out
    Init {
        /// Destination (default: ./article-scout.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Article Scout - Environment Variables");
    println!();
    println!("Strategy Selection:");
    println!(
        "  {}  Only use these strategies (e.g., \"bypass,direct\")",
        ENABLED_STRATEGIES_VAR
    );
    println!(
        "  {} Never use these strategies (e.g., \"browser\")",
        DISABLED_STRATEGIES_VAR
    );
    println!("  Strategy ids: bypass, browser, archive, reader, direct, cache");
    println!();
    println!("Services:");
    println!("  JINA_API_KEY                     API key for the reader proxy (higher rate limits)");
    println!("  {}      Chromium binary for the stealth browser strategy", CHROMIUM_PATH_VAR);
    println!();
    println!("Config Overrides (nested keys use a double underscore):");
    println!("  ARTICLE_SCOUT_BROWSER__SETTLE_MS           Post-navigation settle delay (default: 2000)");
    println!("  ARTICLE_SCOUT_STRATEGIES__TIMEOUTS__DIRECT_SECS  Direct fetch timeout (default: 15)");
    println!("  ARTICLE_SCOUT_VERIFIER__EVIDENCE_CHARS     Evidence length cap (default: 6000)");
    println!("  ARTICLE_SCOUT_LOGGING__FORMAT              \"json\" for structured logs");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {}=\"browser\"", DISABLED_STRATEGIES_VAR);
    println!("  article-scout fetch https://example.com/news/story");
    std::process::exit(0);
}

fn init_logging(cli: &Cli, config: &Config) {
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { log_level };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("article_scout={}", level)),
    );

    let json = config
        .logging
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return load_config(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()));
    }
    if let Some(config_path) = find_config_file() {
        let config = load_config(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        return Ok(config);
    }
    Ok(get_config())
}

fn output_format(cli: &Cli) -> OutputFormat {
    if cli.json {
        return OutputFormat::Json;
    }
    match cli.output {
        OutputFormat::Auto if ui::is_terminal() => OutputFormat::Text,
        OutputFormat::Auto => OutputFormat::Json,
        other => other,
    }
}

fn spinner(cli: &Cli, format: OutputFormat, msg: &str) -> Spinner {
    if cli.quiet || format == OutputFormat::Json || !ui::is_terminal() {
        Spinner::hidden()
    } else {
        Spinner::new(msg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
    }

    let config = resolve_config(&cli)?;
    init_logging(&cli, &config);
    if let Some(path) = cli.config.clone().or_else(find_config_file) {
        tracing::debug!("Using config file: {}", path.display());
    }

    let format = output_format(&cli);

    match &cli.command {
        Some(Commands::Fetch { url }) => {
            let chain = StrategyChain::from_config(&config).context("Failed to build HTTP client")?;
            let progress = spinner(&cli, format, &format!("Fetching {}", url));
            let outcome = chain.acquire(url).await;
            progress.finish();

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                _ => ui::print_outcome(url, &outcome),
            }
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }

        Some(Commands::Verify { claim, max_sources }) => {
            let verifier =
                ClaimVerifier::from_config(&config).context("Failed to build HTTP client")?;
            let progress = spinner(&cli, format, "Searching for sources");
            let result = match max_sources {
                Some(n) => verifier.verify(claim, *n).await,
                None => verifier.verify_default(claim).await,
            };
            progress.finish();

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                _ => ui::print_verification(&result),
            }
        }

        Some(Commands::Init { path, force }) => {
            let path = path
                .clone()
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            save_file(&Config::file_template(), &path)?;
            if !cli.quiet {
                ui::print_status(Status::Success, &format!("Wrote {}", path.display()));
            }
        }

        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
