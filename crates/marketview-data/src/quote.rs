//! Yahoo Finance 시세 제공자.
//!
//! Yahoo Finance API로 심볼의 OHLCV 시계열을 조회하고,
//! 대시보드가 사용하는 스냅샷(현재가/변동/거래량)과
//! 차트용 히스토리 시리즈로 집계합니다.
//!
//! # 파라미터 형식
//!
//! `period`와 `interval`은 Yahoo Finance 형식 그대로 전달됩니다:
//! - period: "1d", "5d", "1mo", "3mo", "1y", ...
//! - interval: "1m", "5m", "15m", "1h", "1d", ...
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use marketview_data::quote::{QuoteProvider, YahooQuoteProvider};
//!
//! let provider = YahooQuoteProvider::new()?;
//! let data = provider.fetch_stock_data("AAPL", "1d", "1m").await?;
//! println!("{}: {} ({:+}%)", data.current.symbol, data.current.price, data.current.change_percent);
//! ```

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use yahoo_finance_api as yahoo;

/// 시세 조회 에러.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Yahoo Finance 연결 실패: {0}")]
    ConnectionError(String),

    #[error("API 요청 실패 ({symbol}): {message}")]
    ApiError { symbol: String, message: String },

    #[error("데이터 파싱 실패: {0}")]
    ParseError(String),

    #[error("데이터 없음: {0}")]
    NoData(String),
}

/// 단일 캔들(OHLCV).
///
/// 외부 제공자의 응답 타입에 의존하지 않도록 집계 입력을 분리한 타입입니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Unix timestamp (초)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// 조회 시점의 스냅샷 집계.
///
/// 가격 필드는 모두 소수점 2자리로 반올림됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// 심볼 (예: "AAPL")
    pub symbol: String,
    /// 현재가 (시리즈 마지막 종가)
    pub price: Decimal,
    /// 시리즈 첫 종가 대비 변동폭
    pub change: Decimal,
    /// 시리즈 첫 종가 대비 변동률 (%)
    pub change_percent: Decimal,
    /// 시리즈 첫 시가
    pub open: Decimal,
    /// 시리즈 최고가
    pub high: Decimal,
    /// 시리즈 최저가
    pub low: Decimal,
    /// 시리즈 거래량 합계
    pub volume: u64,
    /// 스냅샷 생성 시각 ("%Y-%m-%d %H:%M:%S")
    pub timestamp: String,
}

/// 차트용 히스토리 시리즈.
///
/// 세 배열은 인덱스로 정렬된 병렬 배열이며 길이가 항상 같습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalSeries {
    /// 시각 라벨 ("%H:%M", UTC)
    pub labels: Vec<String>,
    /// 종가 시리즈
    pub prices: Vec<Decimal>,
    /// 거래량 시리즈
    pub volumes: Vec<u64>,
}

/// 스냅샷 + 히스토리 묶음 (API 응답의 원본).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub current: QuoteSnapshot,
    pub historical: HistoricalSeries,
}

/// 시세 제공자 trait.
///
/// 핸들러는 이 trait에만 의존하므로 테스트에서 고정 데이터를 주입할 수 있습니다.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 심볼/기간/간격으로 스냅샷과 히스토리를 조회.
    async fn fetch_stock_data(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<StockData, QuoteError>;
}

/// Yahoo Finance 기반 시세 제공자.
pub struct YahooQuoteProvider {
    connector: yahoo::YahooConnector,
}

impl YahooQuoteProvider {
    /// 새로운 Yahoo Finance 제공자 생성.
    pub fn new() -> Result<Self, QuoteError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| QuoteError::ConnectionError(format!("{}", e)))?;

        Ok(Self { connector })
    }

    /// Yahoo Quote를 Candle로 변환.
    fn quote_to_candle(quote: &yahoo::Quote) -> Candle {
        Candle {
            timestamp: quote.timestamp,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn fetch_stock_data(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<StockData, QuoteError> {
        info!(symbol, period, interval, "Fetching stock data from Yahoo Finance");

        let response = self
            .connector
            .get_quote_range(symbol, interval, period)
            .await
            .map_err(|e| QuoteError::ApiError {
                symbol: symbol.to_string(),
                message: format!("{}", e),
            })?;

        let quotes = response
            .quotes()
            .map_err(|e| QuoteError::ParseError(format!("{}", e)))?;

        if quotes.is_empty() {
            warn!(symbol, "Yahoo Finance returned an empty series");
            return Err(QuoteError::NoData(symbol.to_string()));
        }

        debug!(symbol, count = quotes.len(), "Received candles");

        let mut candles: Vec<Candle> = quotes.iter().map(Self::quote_to_candle).collect();
        // 시간순 정렬 (오래된 것부터)
        candles.sort_by_key(|c| c.timestamp);

        aggregate(symbol, &candles)
    }
}

/// 캔들 시리즈를 스냅샷 + 히스토리로 집계.
///
/// 스냅샷 산식:
/// - price = 마지막 종가
/// - change = 마지막 종가 − 첫 종가
/// - change_percent = change / 첫 종가 × 100 (첫 종가가 0이면 0)
/// - open = 첫 시가, high = 최고가, low = 최저가, volume = 거래량 합계
///
/// 가격 필드는 소수점 2자리로 반올림됩니다.
pub fn aggregate(symbol: &str, candles: &[Candle]) -> Result<StockData, QuoteError> {
    let first = candles
        .first()
        .ok_or_else(|| QuoteError::NoData(symbol.to_string()))?;
    let last = candles
        .last()
        .ok_or_else(|| QuoteError::NoData(symbol.to_string()))?;

    let first_close = to_decimal(first.close)?;
    let last_close = to_decimal(last.close)?;

    let change = last_close - first_close;
    let change_percent = if first_close.is_zero() {
        Decimal::ZERO
    } else {
        change / first_close * Decimal::from(100)
    };

    let high = candles
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let volume: u64 = candles.iter().map(|c| c.volume).sum();

    let current = QuoteSnapshot {
        symbol: symbol.to_string(),
        price: last_close.round_dp(2),
        change: change.round_dp(2),
        change_percent: change_percent.round_dp(2),
        open: to_decimal(first.open)?.round_dp(2),
        high: to_decimal(high)?.round_dp(2),
        low: to_decimal(low)?.round_dp(2),
        volume,
        timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    let labels = candles.iter().map(|c| format_label(c.timestamp)).collect();
    let prices = candles
        .iter()
        .map(|c| to_decimal(c.close))
        .collect::<Result<Vec<_>, _>>()?;
    let volumes = candles.iter().map(|c| c.volume).collect();

    Ok(StockData {
        current,
        historical: HistoricalSeries {
            labels,
            prices,
            volumes,
        },
    })
}

/// Unix timestamp를 "%H:%M" 라벨로 변환 (UTC).
fn format_label(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or_else(Utc::now)
        .format("%H:%M")
        .to_string()
}

fn to_decimal(value: f64) -> Result<Decimal, QuoteError> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| QuoteError::ParseError(format!("가격 변환 실패: {}", value)))
}
