use tokio::signal;

pub async fn shutdown() {
    let ctrl_c = async {
        signal::ctrl_c().await.unwrap_or_else(|_| {
            log::error!("failed to listen for the ctrl+c signal");
            std::process::exit(1);
        })
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .unwrap_or_else(|_| {
                log::error!("failed to listen for the SIGTERM signal");
                std::process::exit(1);
            })
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("received ctrl+c signal");
        }
        _ = terminate => {
            log::info!("received SIGTERM signal");
        }
    };

    // in-flight analyses finish, new connections are refused
    log::info!("shutting down ... ");
}
