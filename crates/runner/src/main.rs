use std::sync::Arc;
use vigil_calendar::NyseCalendar;
use vigil_clock::SystemClock;
use vigil_gateway::YahooFinanceSource;
use vigil_notifier::LogAlertChannel;
use vigil_ports::{Clock, TradingCalendar};
use vigil_runner::{AppConfig, MarketManager, ServerDeps};
use vigil_store::JsonSeriesStore;
use vigil_strategy::AnalyticsRegistry;

const DEFAULT_CONFIG_PATH: &str = "config/config.json";

fn print_help() {
    eprintln!(
        r#"Vigil - live market series, analytics and alerts

USAGE:
    vigil [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file (default: {})
    --help              Print this help message

ENVIRONMENT VARIABLES:
    VIGIL_DATA_DIR      Override data_dir from the config file
    RUST_LOG            Log level filter (default: info)
"#,
        DEFAULT_CONFIG_PATH
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = args[i].clone();
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    log::info!("Loading configuration from: {}", config_path);
    let config = AppConfig::from_file(&config_path)?.with_env_overrides();
    config.validate()?;
    log::info!("Symbols: {}", config.symbols.join(", "));
    log::info!("Data dir: {}", config.data_dir.display());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let calendar = Arc::new(NyseCalendar::new());
    let source = YahooFinanceSource::new(&config.source.base_url, calendar.timezone(), clock.clone())?;
    let registry = AnalyticsRegistry::from_config(&config.analytics, clock.clone())?;
    for (name, label) in registry.list() {
        log::info!("Strategy: {} ({})", name, label);
    }

    let deps = ServerDeps {
        source: Arc::new(source),
        store: Arc::new(JsonSeriesStore::new(&config.data_dir, clock.clone())),
        calendar,
        clock,
        registry: Arc::new(registry),
    };
    let manager = MarketManager::initialize_all(&config, deps, Arc::new(LogAlertChannel::new())).await?;

    tokio::signal::ctrl_c().await?;
    log::info!("Shutdown requested");
    manager.stop_all().await;
    Ok(())
}
