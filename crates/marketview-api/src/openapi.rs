//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::{
    ComponentHealth,
    ComponentStatus,
    CurrentQuoteDto,
    ExchangeRateResponse,
    HealthResponse,
    HistoricalSeriesDto,
    PredictRequest,
    PredictResponse,
    SearchResult,
    StockDataResponse,
};

/// MarketView API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MarketView API",
        version = "0.1.0",
        description = r#"
# MarketView 주식 대시보드 REST API

시세 조회, 종가 예측, 환율, 심볼 검색을 위한 REST API입니다.

## 주요 기능

- **시세**: 심볼별 스냅샷과 차트용 히스토리 조회
- **예측**: ONNX 회귀 모델 기반 종가 예측
- **환율**: USD/INR 환율 (30분 캐시, 키 순환)
- **검색**: 인기 종목 심볼 검색
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(
            name = "MarketView Team",
            url = "https://github.com/user/marketview"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "stocks", description = "시세 - 스냅샷 및 히스토리 조회"),
        (name = "predict", description = "예측 - 종가 예측 모델"),
        (name = "exchange_rate", description = "환율 - USD/INR 환율 조회"),
        (name = "search", description = "검색 - 심볼 검색")
    ),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Stocks =====
            StockDataResponse,
            CurrentQuoteDto,
            HistoricalSeriesDto,

            // ===== Predict =====
            PredictRequest,
            PredictResponse,

            // ===== Exchange rate =====
            ExchangeRateResponse,

            // ===== Search =====
            SearchResult,
        )
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Stocks =====
        crate::routes::stocks::get_stock_data,

        // ===== Predict =====
        crate::routes::predict::predict,

        // ===== Exchange rate =====
        crate::routes::exchange_rate::get_exchange_rate,

        // ===== Search =====
        crate::routes::search::search_symbols,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
