//! USD/INR 환율 조회 + 30분 캐시.
//!
//! OpenExchangeRates API에서 환율을 조회하고, 성공한 값을 30분 동안
//! 캐싱합니다. 자격증명(app_id)은 순서대로 순회하며 첫 성공이 이깁니다.
//!
//! # 캐시 의미론
//!
//! - 캐시된 값이 TTL(30분) 이내면 네트워크 접근 없이 즉시 반환
//! - TTL 경과 시 app_id 목록을 순서대로 시도, 첫 성공 값을 저장 후 반환
//! - 전부 실패하면 `None` — 만료된 이전 값은 반환하지 않음 (캐시 슬롯은 유지)
//!
//! 슬롯은 `tokio::sync::Mutex`로 보호되어 read-check-write 구간이
//! 직렬화됩니다 (중복 갱신 없음).
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marketview_data::exchange_rate::{OpenExchangeRatesClient, RateCache, SystemClock};
//!
//! let client = OpenExchangeRatesClient::new()?;
//! let cache = RateCache::new(Arc::new(client), Arc::new(SystemClock), app_ids);
//! if let Some(rate) = cache.get_rate().await {
//!     println!("USD/INR: {}", rate);
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// 환율 조회 에러.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("HTTP 요청 실패: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("응답에 환율 없음: {0}")]
    MissingRate(String),

    #[error("환율 값 변환 실패: {0}")]
    ParseError(String),
}

/// 현재 시각 제공 trait.
///
/// 캐시 신선도 판정을 테스트에서 결정적으로 만들기 위해 주입합니다.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 단일 자격증명으로 환율을 조회하는 trait.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// 주어진 app_id로 USD/INR 환율 조회.
    async fn fetch_rate(&self, app_id: &str) -> Result<Decimal, RateError>;
}

/// OpenExchangeRates `latest.json` 응답.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

/// OpenExchangeRates HTTP 클라이언트.
///
/// 요청당 5초 타임아웃이 걸려 있습니다.
pub struct OpenExchangeRatesClient {
    client: Client,
    base_url: String,
}

impl OpenExchangeRatesClient {
    const DEFAULT_BASE_URL: &'static str = "https://openexchangerates.org";
    const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(5);

    /// 기본 엔드포인트로 클라이언트 생성.
    pub fn new() -> Result<Self, RateError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// 커스텀 엔드포인트로 클라이언트 생성 (테스트용 mock 서버 등).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RateError> {
        let client = Client::builder().timeout(Self::REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl RateFetcher for OpenExchangeRatesClient {
    async fn fetch_rate(&self, app_id: &str) -> Result<Decimal, RateError> {
        let url = format!("{}/api/latest.json?app_id={}", self.base_url, app_id);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: LatestRatesResponse = response.json().await?;

        let inr = body
            .rates
            .get("INR")
            .ok_or_else(|| RateError::MissingRate("INR".to_string()))?;

        Decimal::from_f64_retain(*inr)
            .ok_or_else(|| RateError::ParseError(format!("{}", inr)))
    }
}

/// 캐시된 환율 항목.
///
/// 값과 조회 시각은 항상 함께 존재합니다 (슬롯 단위 `Option`).
#[derive(Debug, Clone, Copy)]
pub struct CachedRate {
    pub value: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// 자격증명 rotation이 있는 환율 캐시.
pub struct RateCache {
    fetcher: Arc<dyn RateFetcher>,
    clock: Arc<dyn Clock>,
    app_ids: Vec<String>,
    ttl: Duration,
    cached: Mutex<Option<CachedRate>>,
}

impl RateCache {
    /// 캐시 신선도 윈도우 (분).
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// 새 환율 캐시 생성.
    pub fn new(fetcher: Arc<dyn RateFetcher>, clock: Arc<dyn Clock>, app_ids: Vec<String>) -> Self {
        Self {
            fetcher,
            clock,
            app_ids,
            ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
            cached: Mutex::new(None),
        }
    }

    /// TTL 변경 (테스트용).
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 현재 USD/INR 환율 반환.
    ///
    /// 캐시가 신선하면 네트워크 접근 없이 캐시 값을, 아니면 app_id를
    /// 순서대로 시도하여 첫 성공 값(소수점 2자리 반올림)을 반환합니다.
    /// 전부 실패하면 `None`이며 캐시 슬롯은 변경되지 않습니다.
    pub async fn get_rate(&self) -> Option<Decimal> {
        let mut slot = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(cached) = slot.as_ref() {
            if now - cached.fetched_at < self.ttl {
                debug!(rate = %cached.value, "Serving cached exchange rate");
                return Some(cached.value);
            }
        }

        for (index, app_id) in self.app_ids.iter().enumerate() {
            match self.fetcher.fetch_rate(app_id).await {
                Ok(rate) => {
                    let rounded = rate.round_dp(2);
                    *slot = Some(CachedRate {
                        value: rounded,
                        fetched_at: now,
                    });
                    info!(credential_index = index, rate = %rounded, "Exchange rate refreshed");
                    return Some(rounded);
                }
                Err(e) => {
                    // 자격증명은 로그에 남기지 않음
                    warn!(
                        credential_index = index,
                        error = %e,
                        "Exchange rate fetch failed, trying next credential"
                    );
                }
            }
        }

        error!("All exchange rate credentials failed");
        None
    }

    /// 조회 가능한 자격증명이 하나라도 있는지 여부.
    pub fn has_credentials(&self) -> bool {
        !self.app_ids.is_empty()
    }

    /// 캐시된 값의 나이(초). 캐시가 비어 있으면 `None`.
    pub async fn cached_age_secs(&self) -> Option<i64> {
        let slot = self.cached.lock().await;
        slot.as_ref()
            .map(|c| (self.clock.now() - c.fetched_at).num_seconds())
    }
}
