use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::handlers::{
    create_student_handler, delete_student_handler, get_student_handler, list_students_handler,
    update_student_handler,
};
use crate::db::connection::{create_pool, health_check, run_migrations};
use crate::models::api::{EnvironmentInfo, HealthEnvelope};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info")),
        )
        .init();
}

/// Build the router over an injected pool so tests can hand in their own.
pub fn create_app(pool: SqlitePool) -> Router {
    Router::new()
        // Liveness probes
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        // Student CRUD
        .route("/api/student/create", post(create_student_handler))
        .route("/api/student/getAll", get(list_students_handler))
        .route("/api/student/getById/{id}", get(get_student_handler))
        .route("/api/student/update/{id}", put(update_student_handler))
        .route("/api/student/delete/{id}", delete(delete_student_handler))
        .with_state(pool)
        .layer(TraceLayer::new_for_http())
        // The admin UI is served from another origin
        .layer(CorsLayer::permissive())
}

async fn health_handler(State(pool): State<SqlitePool>) -> Response {
    match health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthEnvelope {
                status: "healthy",
                timestamp: Utc::now(),
                environment: EnvironmentInfo {
                    name: environment_name(),
                    port: server_port(),
                },
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "error": "Database connection failed",
                })),
            )
                .into_response()
        }
    }
}

fn server_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

fn environment_name() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("Starting student registry server");

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let app = create_app(pool);

    let port = server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    // Set up ctrl-c handler for graceful shutdown
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        info!("Shutting down gracefully...");
    };

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
