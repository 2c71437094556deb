use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use vigil::alerts::{AlertAggregator, Notifier, WebhookTransport};
use vigil::collectors::{
    JournalSource, LogWindowScanner, MetricsSampler, SystemMetricsProvider,
};
use vigil::config::Config;
use vigil::error::ConfigError;
use vigil::rules::KeywordFilter;
use vigil::scheduler::Scheduler;

/// Command-line arguments for the host monitoring agent
#[derive(Parser)]
#[command(
    name = "vigil",
    about = "Host monitoring agent - resource thresholds and system log alerting",
    long_about = "A long-running agent that samples system resource utilization, scans the \
                  system journal for error patterns on a fixed cadence, and delivers batched \
                  alert notifications through an outbound message channel."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// Missing config files are not an error here; they are handled by
    /// falling back to defaults during loading.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// Load configuration from file or use defaults
///
/// A missing or invalid file is reported and replaced with the default
/// configuration rather than aborting startup.
fn load_config(config_path: Option<&PathBuf>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(e)) => {
                    warn!(
                        "Configuration file not found or unreadable ({}), using defaults",
                        e
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    info!("Starting vigil host monitoring agent");

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let mut config = load_config(cli.config.as_ref());
    config.apply_env_overrides();

    let filter = match KeywordFilter::new(
        &config.log_scan.include_keywords,
        &config.log_scan.exclude_keywords,
    ) {
        Ok(filter) => filter,
        Err(e) => {
            error!("Invalid keyword patterns: {}", e);
            std::process::exit(1);
        }
    };

    let tick_interval = Duration::from_secs(config.scheduler.tick_interval_seconds);

    let sampler = MetricsSampler::new(
        Box::new(SystemMetricsProvider::new()),
        config.sampler.disk_path.clone(),
        tick_interval,
    );
    let scanner = LogWindowScanner::new(
        Box::new(JournalSource::new(config.log_scan.page_size)),
        filter,
        chrono::Duration::seconds(config.log_scan.window_seconds as i64),
    );

    let transport = Arc::new(WebhookTransport::new(
        config.notify.endpoint.clone(),
        config.notify.sender.clone(),
        config.notify.recipient.clone(),
        config.notify.credential.clone(),
    ));
    let notifier = Notifier::new(transport, config.notify.subject.clone());
    let aggregator = Arc::new(AlertAggregator::new());

    let mut scheduler = Scheduler::new(
        sampler,
        scanner,
        config.thresholds,
        aggregator,
        notifier,
        tick_interval,
        chrono::Duration::seconds(config.notify.interval_seconds as i64),
    );

    // Set up signal handling for graceful shutdown (SIGINT)
    let (shutdown_sender, shutdown_receiver) = mpsc::channel();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal, shutting down gracefully...");
        if let Err(e) = shutdown_sender.send(()) {
            error!("Failed to send shutdown signal: {}", e);
        }
    })
    .expect("Error setting SIGINT handler for graceful shutdown");

    info!("vigil is running. Press Ctrl+C to stop.");

    scheduler.run(&shutdown_receiver);

    info!("vigil shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_validation_with_existing_file() {
        let temp_file = std::env::temp_dir().join("test_vigil_config.toml");
        std::fs::write(&temp_file, "[thresholds]\ncpu_limit = 75.0").unwrap();

        let cli = Cli {
            config: Some(temp_file.clone()),
            verbose: false,
        };

        assert!(cli.validate().is_ok());

        std::fs::remove_file(&temp_file).unwrap();
    }

    #[test]
    fn test_cli_validation_with_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/config.toml")),
            verbose: false,
        };

        // Should not fail - missing files are handled gracefully
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_directory() {
        let cli = Cli {
            config: Some(std::env::temp_dir()),
            verbose: false,
        };

        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_load_config_missing_file_falls_back_to_defaults() {
        let config = load_config(Some(&PathBuf::from("/nonexistent/vigil.toml")));
        assert_eq!(config.scheduler.tick_interval_seconds, 10);
    }

    #[test]
    fn test_load_config_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.toml");
        std::fs::write(&path, "[scheduler]\ntick_interval_seconds = 0").unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.scheduler.tick_interval_seconds, 10);
    }

    #[test]
    fn test_load_config_none_uses_defaults() {
        let config = load_config(None);
        assert_eq!(config.thresholds.cpu_limit, 80.0);
    }
}
