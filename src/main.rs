use clap::{Parser, Subcommand};
use std::sync::Arc;

use wa_groupbot::application::errors::BotError;
use wa_groupbot::application::messaging::MessageDispatcher;
use wa_groupbot::application::services::CommandService;
use wa_groupbot::application::Supervisor;
use wa_groupbot::domain::traits::Connector;
use wa_groupbot::infrastructure::adapters::{BridgeConnector, ConsoleConnector};
use wa_groupbot::infrastructure::config::Config;
use wa_groupbot::infrastructure::media::HttpMediaResolver;
use wa_groupbot::infrastructure::storage::FileSessionStore;

#[derive(Parser)]
#[command(name = "wa-groupbot")]
#[command(about = "WhatsApp group bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Read messages from stdin instead of connecting to the bridge
        #[arg(long)]
        console: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { console } => run_bot(&cli.config, console),
        Commands::Version => {
            println!("wa-groupbot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if !std::path::Path::new(config_path).exists() {
        return Config::load_env();
    }

    match Config::load(config_path) {
        Ok(mut config) => {
            config.apply_env();
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

fn run_bot(config_path: &str, console: bool) -> Result<(), BotError> {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.bot.name);

    let media = HttpMediaResolver::new(config.media.resolver_url.clone(), config.media_timeout())?;
    let commands = CommandService::with_defaults(Arc::new(media));
    tracing::info!("Registered {} commands", commands.len());

    let connector: Arc<dyn Connector> = if console {
        Arc::new(ConsoleConnector::new())
    } else {
        tracing::info!("Using bridge at {}", config.bridge.url);
        Arc::new(BridgeConnector::new(
            config.bridge.url.clone(),
            std::time::Duration::from_secs(config.bridge.poll_timeout_seconds),
            std::time::Duration::from_secs(config.bridge.request_timeout_seconds),
        )?)
    };
    let store = Arc::new(FileSessionStore::new(config.session.directory.clone()));

    let mut supervisor = Supervisor::new(connector, store, MessageDispatcher::new(commands), config.qr_presenter())
        .with_browser(config.bot.browser.clone())
        .with_policy(config.reconnect_policy());

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;
    let summary = rt.block_on(supervisor.run())?;
    tracing::info!("Logged out after {} connection(s), remove {} to pair again",
        summary.connections, config.session.directory.display());
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
