use std::process::ExitCode;

use ai_checkup::api::{start_server, ApiContext, SHUTDOWN_GRACE};
use ai_checkup::config::{self, AppConfig};
use ai_checkup::{build_service, init_tracing};

fn main() -> ExitCode {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // The blocking HTTP client must be built outside the runtime.
    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start async runtime");
            return ExitCode::FAILURE;
        }
    };

    // The runtime must never drop the last handle to the blocking
    // client, so one context outlives it.
    let ctx = ApiContext::new(service);
    let held = ctx.clone();

    let code = runtime.block_on(async move {
        let mut server = match start_server(ctx, config.bind_addr).await {
            Ok(server) => server,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        };
        tracing::info!(addr = %server.session.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
        }
        server.shutdown();

        if tokio::time::timeout(SHUTDOWN_GRACE, server.stopped())
            .await
            .is_err()
        {
            tracing::warn!("In-flight requests did not finish before the grace period");
        }
        ExitCode::SUCCESS
    });

    drop(runtime);
    drop(held);
    code
}
