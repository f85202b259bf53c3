//! 시장 데이터 접근 crate.
//!
//! 대시보드 백엔드가 소비하는 외부 데이터 소스를 담당합니다:
//!
//! - **시세**: Yahoo Finance 기반 OHLCV 조회 및 스냅샷 집계 ([`quote`])
//! - **환율**: OpenExchangeRates 기반 USD/INR 환율 + 30분 캐시 ([`exchange_rate`])
//! - **심볼 검색**: 고정 테이블 기반 심볼/회사명 검색 ([`symbols`])
//!
//! 각 모듈은 trait 경계(`QuoteProvider`, `RateFetcher`, `Clock`)를 노출하여
//! 핸들러와 테스트에서 실제 네트워크 없이 주입할 수 있습니다.

pub mod exchange_rate;
pub mod quote;
pub mod symbols;

pub use exchange_rate::{
    CachedRate, Clock, OpenExchangeRatesClient, RateCache, RateError, RateFetcher, SystemClock,
};
pub use quote::{
    Candle, HistoricalSeries, QuoteError, QuoteProvider, QuoteSnapshot, StockData,
    YahooQuoteProvider,
};
pub use symbols::{SymbolDirectory, SymbolEntry};
