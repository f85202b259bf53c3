//! 고정 테이블 기반 심볼 검색.
//!
//! 인기 종목 10개의 심볼→회사명 테이블을 대소문자 무시 부분 일치로
//! 검색합니다. 외부 조회는 없으며 결과는 최대 5개입니다.

use serde::{Deserialize, Serialize};

/// 검색 결과 최대 개수.
pub const MAX_RESULTS: usize = 5;

/// 심볼 테이블 (시작 시 고정).
const POPULAR_STOCKS: [(&str, &str); 10] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com, Inc."),
    ("META", "Meta Platforms, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("NFLX", "Netflix, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("V", "Visa Inc."),
];

/// 심볼 + 회사명 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub symbol: String,
    pub name: String,
}

/// 심볼 디렉터리.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolDirectory;

impl SymbolDirectory {
    /// 부분 일치 검색.
    ///
    /// 대문자화한 쿼리를 심볼과, 소문자화한 쿼리를 회사명(소문자)과
    /// 비교합니다. 빈 쿼리는 빈 결과를 반환하며 테이블 순서가 유지됩니다.
    pub fn search(&self, query: &str) -> Vec<SymbolEntry> {
        if query.is_empty() {
            return Vec::new();
        }

        let upper = query.to_uppercase();
        let lower = query.to_lowercase();

        POPULAR_STOCKS
            .iter()
            .filter(|(symbol, name)| {
                symbol.contains(upper.as_str()) || name.to_lowercase().contains(lower.as_str())
            })
            .take(MAX_RESULTS)
            .map(|(symbol, name)| SymbolEntry {
                symbol: (*symbol).to_string(),
                name: (*name).to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_symbol_prefix() {
        let directory = SymbolDirectory;
        let results = directory.search("goo");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "GOOGL");
        assert_eq!(results[0].name, "Alphabet Inc.");
    }

    #[test]
    fn test_search_by_company_name() {
        let directory = SymbolDirectory;
        let results = directory.search("visa");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "V");
    }

    #[test]
    fn test_search_empty_query() {
        let directory = SymbolDirectory;
        assert!(directory.search("").is_empty());
    }

    #[test]
    fn test_search_result_limit() {
        let directory = SymbolDirectory;
        // "a"는 여러 회사명에 포함되지만 결과는 5개로 제한
        let results = directory.search("a");

        assert!(results.len() <= MAX_RESULTS);
        assert_eq!(results.len(), MAX_RESULTS);
    }

    #[test]
    fn test_search_case_insensitive() {
        let directory = SymbolDirectory;

        assert_eq!(directory.search("nvda"), directory.search("NVDA"));
        assert_eq!(directory.search("Tesla").len(), 1);
    }

    #[test]
    fn test_search_single_letter_v() {
        let directory = SymbolDirectory;
        let results = directory.search("v");

        // "V" 심볼과 "Visa Inc."가 첫 일치로 포함되어야 함
        assert!(results.iter().any(|e| e.symbol == "V" && e.name == "Visa Inc."));
        assert!(results.len() <= MAX_RESULTS);
    }

    #[test]
    fn test_search_matches_mid_symbol() {
        let directory = SymbolDirectory;

        // 접두사가 아닌 중간 일치도 잡아야 함
        let results = directory.search("oog");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "GOOGL");

        let results = directory.search("flx");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "NFLX");
    }

    #[test]
    fn test_no_match() {
        let directory = SymbolDirectory;
        assert!(directory.search("zzz").is_empty());
    }
}
