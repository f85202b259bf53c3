//! MarketView API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 시세 조회, 종가 예측, 환율, 심볼 검색 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use marketview_api::openapi::swagger_ui_router;
use marketview_api::routes::create_api_router;
use marketview_api::state::AppState;
use marketview_data::exchange_rate::{OpenExchangeRatesClient, RateCache, SystemClock};
use marketview_data::quote::YahooQuoteProvider;
use marketview_ml::PredictionService;

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
    /// ONNX 모델 파일 경로
    model_path: String,
    /// Open Exchange Rates app_id 목록 (시도 순서대로)
    rate_app_ids: Vec<String>,
    /// 환율 API 엔드포인트 재정의 (테스트/프록시용)
    rate_base_url: Option<String>,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    ///
    /// # 환경변수
    ///
    /// - `API_HOST`: 바인딩 호스트 (기본 "127.0.0.1")
    /// - `API_PORT`: 바인딩 포트 (기본 3000)
    /// - `MODEL_PATH`: ONNX 모델 경로 (기본 "models/stock_predictor.onnx")
    /// - `OPENEXCHANGE_APP_IDS`: 쉼표로 구분된 app_id 목록
    /// - `EXCHANGE_RATE_BASE_URL`: 환율 API 엔드포인트 재정의 (선택)
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let model_path = std::env::var("MODEL_PATH")
            .unwrap_or_else(|_| "models/stock_predictor.onnx".to_string());

        let rate_app_ids: Vec<String> = std::env::var("OPENEXCHANGE_APP_IDS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rate_base_url = std::env::var("EXCHANGE_RATE_BASE_URL").ok();

        Self {
            host,
            port,
            model_path,
            rate_app_ids,
            rate_base_url,
        }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// AppState 생성.
///
/// 시세 제공자, 환율 캐시, 예측 서비스를 초기화합니다.
/// 모델 로드 실패는 치명적이지 않습니다 (예측만 비활성).
fn create_app_state(config: &ServerConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let quotes = Arc::new(YahooQuoteProvider::new()?);

    let rate_client = match &config.rate_base_url {
        Some(base_url) => OpenExchangeRatesClient::with_base_url(base_url.clone())?,
        None => OpenExchangeRatesClient::new()?,
    };

    if config.rate_app_ids.is_empty() {
        warn!("OPENEXCHANGE_APP_IDS not set, exchange rate lookups will fail");
    } else {
        info!(
            key_count = config.rate_app_ids.len(),
            "Exchange rate credentials loaded"
        );
    }

    let rate_cache = Arc::new(RateCache::new(
        Arc::new(rate_client),
        Arc::new(SystemClock),
        config.rate_app_ids.clone(),
    ));

    let predictions = Arc::new(PredictionService::from_model_path(&config.model_path));
    if predictions.is_configured() {
        info!(model_path = %config.model_path, "Prediction model loaded");
    } else {
        warn!(
            model_path = %config.model_path,
            "Prediction model unavailable, /predict will return failure responses"
        );
    }

    Ok(AppState::new(quotes, rate_cache, predictions))
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://dashboard.example.com,https://admin.example.com`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            // 프로덕션: 특정 origin만 허용
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            // 개발: 모든 origin 허용
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        // 자격 증명 포함 허용 (CORS_ORIGINS 설정 시에만)
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(create_api_router().with_state(state))
        // 대시보드 정적 자산 (js/css)
        .nest_service("/static", ServeDir::new("static"))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketview_api=info,tower_http=debug".into()),
        )
        .init();

    info!("Starting MarketView API server...");

    // 설정 로드
    let config = ServerConfig::from_env();
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // AppState 생성 (시세/환율/예측 서비스 초기화)
    let state = Arc::new(create_app_state(&config)?);
    info!(version = %state.version, "Application state initialized");

    // 라우터 생성
    let app = create_router(state);

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Dashboard available at http://{}/", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 서버를 종료합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
