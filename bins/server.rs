use std::process::ExitCode;

use server::startup::{build_runtime, init_environment, load_config, worker_threads};
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    init_environment();

    let instance = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "customer", event = "panic", %instance, pid, message = %info, "unhandled panic");
    }));

    let cfg = load_config();
    let threads = worker_threads(&cfg);
    let rt = match build_runtime(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "customer", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "customer",
        event = "start",
        %instance,
        pid,
        version,
        bind = %cfg.server.bind_addr(),
        data_file = ?cfg.storage.data_file,
        threads = ?threads,
        "customer service starting"
    );

    rt.block_on(async move {
        tokio::select! {
            res = server::run(cfg) => match res {
                Ok(()) => {
                    info!(service = "customer", event = "stop", %instance, "server stopped");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(service = "customer", event = "run_failed", error = %e, "customer server failed");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(service = "customer", event = "shutdown_signal", %instance, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
