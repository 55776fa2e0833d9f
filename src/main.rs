//! # Glooing 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 저장된 트리거로 스케줄러 타이머 복구
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작, Ctrl+C에서 정상 종료

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod scheduler;
mod services;
mod sync;

use anyhow::Result;
use axum::Router;
use config::Config;
use routes::AppState;
use scheduler::Scheduler;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 glooing, tower_http, axum을 debug 레벨로
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glooing=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Glooing server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 ──
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 스케줄러 복구 ──
    // 지난 실행에서 저장된 트리거를 표현식 그대로 다시 무장합니다.
    let scheduler = Scheduler::new(pool.clone());
    let rearmed = scheduler.on_boot().await?;
    tracing::info!("Re-armed {} persisted triggers", rearmed);

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        scheduler: scheduler.clone(),
    };

    // ── 7단계: 라우터 + 미들웨어 ──
    // 개발 편의상 CORS는 모두 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api/v1", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 요청 처리가 끝난 뒤 타이머를 모두 내립니다. 트리거 행은 남겨 두어
    // 다음 부팅에서 다시 무장됩니다.
    scheduler.shutdown().await;
    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
