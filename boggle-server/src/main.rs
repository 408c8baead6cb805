use std::sync::Arc;

use tokio::signal;
use tracing::info;

use boggle_core::{DiceConfig, DiceConfigRegistry, DictionaryRegistry, SessionConfig};
use boggle_server::{config::Config, create_routes, session_manager::SessionManager};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Boggle server...");

    let config = Config::new();

    // Load dictionaries; sessions can also run without word validation
    let dictionary_dir =
        std::env::var("DICTIONARY_DIRECTORY").unwrap_or_else(|_| "./dictionaries".to_string());
    let dictionaries = match DictionaryRegistry::load(&dictionary_dir) {
        Ok(registry) => {
            info!(
                "Loaded {} dictionaries from {}",
                registry.names().len(),
                dictionary_dir
            );
            registry
        }
        Err(e) => {
            tracing::warn!(
                "No dictionaries loaded from '{}': {}; words will not be validated",
                dictionary_dir,
                e
            );
            DictionaryRegistry::default()
        }
    };

    // Load dice sets, falling back to the built-in classic set
    let dice_dir = std::env::var("DICE_DIRECTORY").unwrap_or_else(|_| "./dice".to_string());
    let dice_registry = match DiceConfigRegistry::load(&dice_dir) {
        Ok(registry) if !registry.names().is_empty() => registry,
        Ok(_) => {
            info!("No dice files in '{}', using the built-in classic set", dice_dir);
            DiceConfigRegistry::from_configs([DiceConfig::classic()])
        }
        Err(e) => {
            tracing::warn!(
                "Failed to read dice directory '{}': {}; using the built-in classic set",
                dice_dir,
                e
            );
            DiceConfigRegistry::from_configs([DiceConfig::classic()])
        }
    };
    let dice = match dice_registry.default_config() {
        Some(dice) => {
            info!("Sessions roll the {} dice set", dice.name);
            dice
        }
        None => {
            tracing::error!(
                "Dice directory '{}' holds several sets but none named 'classic'; \
                 remove the extras or add a classic set",
                dice_dir
            );
            std::process::exit(1);
        }
    };

    let defaults = SessionConfig {
        board_rows: config.board_rows,
        board_cols: config.board_cols,
        round_seconds: config.round_seconds,
        grace_seconds: config.grace_period_seconds,
        default_countdown_seconds: config.default_countdown_seconds,
        vowel_proportion: config.vowel_proportion,
        ..SessionConfig::default()
    };
    let session_manager = Arc::new(SessionManager::new(dictionaries, dice, defaults));

    let routes = create_routes(session_manager.clone());

    // Start cleanup task
    let cleanup_manager = session_manager.clone();
    let session_timeout = chrono::Duration::minutes(config.session_timeout_minutes);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_manager.cleanup_idle_sessions(session_timeout).await;
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = match config.host.parse::<std::net::IpAddr>() {
        Ok(host) => (host, config.port),
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("failed to install SIGINT handler");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!("Server listening on {}", addr);
    server.await;
}
