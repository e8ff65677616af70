use ::log::info;
use axum::{
    Router,
    http::{Method, StatusCode, header},
};
use std::{net::SocketAddr, time::Duration};
use stl_metrics::{
    api_docs::ApiDoc,
    config::{Env, log},
    handler::{self, AppState},
    util::shutdown,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log::setup()?;

    let env = Env::new();
    let limits = env.limits();
    info!(
        "analyzer limits: buffered {} bytes, streamed {} bytes, {} triangles",
        limits.max_buffer_bytes, limits.max_stream_bytes, limits.max_triangles
    );

    let app = handler::router(AppState { limits }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(env.request_timeout_secs),
            ))
            .layer(
                CorsLayer::new()
                    .allow_headers([header::CONTENT_TYPE, header::CONTENT_LENGTH])
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_origin(Any),
            ),
    );

    let router = Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", app);

    let listener = TcpListener::bind(&format!("0.0.0.0:{}", env.port)).await?;
    info!("up and running on : {}", env.port);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown())
    .await?;

    anyhow::Ok(())
}
