//! Trade saga runner entry point.

use std::sync::Arc;

use ledger::{InMemoryListenerRegistry, ListenerRegistry};
use runner::config::Config;
use saga::{TeardownCoordinator, TeardownGuard, install_panic_hook};
use tokio::signal;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::warn!("received SIGINT, abandoning run");
        }
        () = terminate => {
            tracing::warn!("received SIGTERM, abandoning run");
        }
    }
}

async fn run(config: Config) -> runner::Result<i32> {
    // 1. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    tracing::info!(
        scenario = %config.scenario,
        trade_id = %config.trade_id,
        contract_version = %config.contract_version,
        network_config = %config.network_config.display(),
        endorsement_policy = %config.endorsement_policy,
        "starting trade saga"
    );

    // 2. Wire every teardown trigger to one coordinator
    let listeners: Arc<dyn ListenerRegistry> = Arc::new(InMemoryListenerRegistry::new());
    let teardown = Arc::new(TeardownCoordinator::new(listeners.clone()));
    install_panic_hook(teardown.clone());
    let guard = TeardownGuard::new(teardown);

    // 3. Load the scenario and build the ledger
    let scenario = runner::load_scenario(&config)?;
    tracing::info!(name = %scenario.name, steps = scenario.len(), "scenario loaded");
    let ledger = runner::build_ledger(&config, listeners).await;

    // 4. Run until the saga finishes or a signal arrives
    let mut stdout = std::io::stdout();
    let code =
        runner::run_with_shutdown(scenario, ledger, guard, &mut stdout, shutdown_signal()).await?;

    if config.metrics_dump {
        println!("{}", metrics_handle.render());
    }

    Ok(code)
}

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    runner::init_tracing(&config);

    let code = match run(config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "trade saga failed");
            runner::EXIT_FAILED
        }
    };

    std::process::exit(code);
}
