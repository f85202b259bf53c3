//! 주식 시세 조회 endpoint.
//!
//! `/stock_data/{symbol}`로 스냅샷과 차트용 히스토리를 함께 반환합니다.
//! 조회 실패 시에도 HTTP 200에 `{"error": ...}` 본문을 돌려주어
//! 프론트엔드가 상태 코드 분기 없이 처리할 수 있게 합니다.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use marketview_data::quote::{HistoricalSeries, QuoteSnapshot, StockData};

use crate::state::AppState;

/// 기본 조회 기간.
const DEFAULT_PERIOD: &str = "1d";
/// 기본 캔들 간격.
const DEFAULT_INTERVAL: &str = "1m";

fn default_period() -> String {
    DEFAULT_PERIOD.to_string()
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

/// 시세 조회 쿼리 파라미터.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StockDataQuery {
    /// 조회 기간 (기본 "1d")
    #[serde(default = "default_period")]
    pub period: String,
    /// 캔들 간격 (기본 "1m")
    #[serde(default = "default_interval")]
    pub interval: String,
}

/// 현재 시세 DTO.
///
/// JSON 숫자로 직렬화하기 위해 Decimal을 f64로 변환합니다.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentQuoteDto {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub timestamp: String,
}

impl From<QuoteSnapshot> for CurrentQuoteDto {
    fn from(snapshot: QuoteSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol,
            price: snapshot.price.to_f64().unwrap_or_default(),
            change: snapshot.change.to_f64().unwrap_or_default(),
            change_percent: snapshot.change_percent.to_f64().unwrap_or_default(),
            open: snapshot.open.to_f64().unwrap_or_default(),
            high: snapshot.high.to_f64().unwrap_or_default(),
            low: snapshot.low.to_f64().unwrap_or_default(),
            volume: snapshot.volume,
            timestamp: snapshot.timestamp,
        }
    }
}

/// 차트용 히스토리 DTO.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoricalSeriesDto {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
    pub volumes: Vec<u64>,
}

impl From<HistoricalSeries> for HistoricalSeriesDto {
    fn from(series: HistoricalSeries) -> Self {
        Self {
            labels: series.labels,
            prices: series
                .prices
                .into_iter()
                .map(|p| p.to_f64().unwrap_or_default())
                .collect(),
            volumes: series.volumes,
        }
    }
}

/// 시세 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockDataResponse {
    pub current: CurrentQuoteDto,
    pub historical: HistoricalSeriesDto,
}

impl From<StockData> for StockDataResponse {
    fn from(data: StockData) -> Self {
        Self {
            current: data.current.into(),
            historical: data.historical.into(),
        }
    }
}

/// 주식 시세 조회.
///
/// GET /stock_data/{symbol}?period=1d&interval=1m
#[utoipa::path(
    get,
    path = "/stock_data/{symbol}",
    params(
        ("symbol" = String, Path, description = "주식 심볼 (예: AAPL)"),
        StockDataQuery
    ),
    responses(
        (status = 200, description = "스냅샷 + 히스토리, 실패 시 error 객체", body = StockDataResponse)
    ),
    tag = "stocks"
)]
pub async fn get_stock_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<StockDataQuery>,
) -> Json<Value> {
    match state
        .quotes
        .fetch_stock_data(&symbol, &query.period, &query.interval)
        .await
    {
        Ok(data) => {
            info!(
                symbol = %symbol,
                period = %query.period,
                interval = %query.interval,
                "Stock data fetched"
            );
            let response = StockDataResponse::from(data);
            Json(json!(response))
        }
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Failed to fetch stock data");
            Json(json!({ "error": "Failed to fetch stock data" }))
        }
    }
}

/// 시세 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new().route("/stock_data/{symbol}", get(get_stock_data))
}
