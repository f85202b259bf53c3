//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use marketview_data::exchange_rate::RateCache;
use marketview_data::quote::QuoteProvider;
use marketview_data::symbols::SymbolDirectory;
use marketview_ml::PredictionService;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
/// 네 컴포넌트는 런타임에 서로 의존하지 않습니다.
#[derive(Clone)]
pub struct AppState {
    /// 시세 제공자 - 스냅샷/히스토리 조회
    pub quotes: Arc<dyn QuoteProvider>,

    /// 환율 캐시 - 30분 TTL + 자격증명 rotation
    pub rate_cache: Arc<RateCache>,

    /// 예측 서비스 - ONNX 모델 추론
    pub predictions: Arc<PredictionService>,

    /// 심볼 디렉터리 (고정 테이블)
    pub symbols: SymbolDirectory,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        rate_cache: Arc<RateCache>,
        predictions: Arc<PredictionService>,
    ) -> Self {
        Self {
            quotes,
            rate_cache,
            predictions,
            symbols: SymbolDirectory,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

// ==================== Test Support ====================

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    //! 라우트 테스트용 고정 구현.

    use super::*;
    use async_trait::async_trait;
    use marketview_data::exchange_rate::{RateError, RateFetcher, SystemClock};
    use marketview_data::quote::{aggregate, Candle, QuoteError, StockData};
    use marketview_ml::MockPredictor;
    use rust_decimal::Decimal;

    /// 고정 데이터를 돌려주는 시세 제공자.
    pub struct StaticQuoteProvider {
        pub data: Option<StockData>,
    }

    impl StaticQuoteProvider {
        /// 두 캔들짜리 합성 시리즈 (closes 100 → 105).
        pub fn with_sample_series() -> Self {
            let candles = vec![
                Candle {
                    timestamp: 1_700_000_000,
                    open: 98.0,
                    high: 101.0,
                    low: 97.5,
                    close: 100.0,
                    volume: 1_000,
                },
                Candle {
                    timestamp: 1_700_000_060,
                    open: 100.0,
                    high: 106.0,
                    low: 99.0,
                    close: 105.0,
                    volume: 2_000,
                },
            ];
            let data = aggregate("AAPL", &candles).expect("sample series aggregates");
            Self { data: Some(data) }
        }

        /// 항상 실패하는 제공자.
        pub fn failing() -> Self {
            Self { data: None }
        }
    }

    #[async_trait]
    impl super::QuoteProvider for StaticQuoteProvider {
        async fn fetch_stock_data(
            &self,
            symbol: &str,
            _period: &str,
            _interval: &str,
        ) -> Result<StockData, QuoteError> {
            match &self.data {
                Some(data) => {
                    let mut data = data.clone();
                    data.current.symbol = symbol.to_string();
                    Ok(data)
                }
                None => Err(QuoteError::NoData(symbol.to_string())),
            }
        }
    }

    /// 고정 환율을 돌려주는 fetcher (`None`이면 항상 실패).
    pub struct FixedRateFetcher {
        pub rate: Option<Decimal>,
    }

    #[async_trait]
    impl RateFetcher for FixedRateFetcher {
        async fn fetch_rate(&self, _app_id: &str) -> Result<Decimal, RateError> {
            self.rate
                .ok_or_else(|| RateError::MissingRate("INR".to_string()))
        }
    }

    /// 라우트 테스트용 기본 상태.
    ///
    /// - 시세: 합성 2-캔들 시리즈
    /// - 환율: 83.25 고정
    /// - 예측: mock predictor 고정값 105.25
    pub fn create_test_state() -> AppState {
        let rate_cache = RateCache::new(
            Arc::new(FixedRateFetcher {
                rate: Some(Decimal::new(8325, 2)),
            }),
            Arc::new(SystemClock),
            vec!["test-key".to_string()],
        );

        AppState::new(
            Arc::new(StaticQuoteProvider::with_sample_series()),
            Arc::new(rate_cache),
            Arc::new(PredictionService::with_predictor(Box::new(
                MockPredictor::new(4).with_fixed_prediction(105.25),
            ))),
        )
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use test_support::create_test_state;
