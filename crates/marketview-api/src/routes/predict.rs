//! 종가 예측 endpoint.
//!
//! form 필드 4개(open, high, low, volume)를 숫자로 파싱하여 모델에
//! 전달합니다. 파싱 실패 시 모델을 호출하지 않고 실패 응답을 반환하며,
//! 모든 실패는 동일한 `{success:false, message}` 형태로 표현됩니다.

use axum::{extract::State, routing::post, Form, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::AppState;

/// 예측 실패 시 공통 메시지.
const FAILURE_MESSAGE: &str = "Failed to generate prediction";

/// 예측 요청 (form).
///
/// 필드는 문자열로 받고 핸들러에서 파싱합니다 — 숫자가 아닌 입력은
/// 모델 호출 전에 걸러집니다.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictRequest {
    pub open: String,
    pub high: String,
    pub low: String,
    pub volume: String,
}

/// 예측 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictResponse {
    pub success: bool,
    /// 예측 종가 (소수점 2자리, 성공 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    /// 실패 메시지 (실패 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictResponse {
    fn ok(prediction: f64) -> Self {
        Self {
            success: true,
            prediction: Some(prediction),
            message: None,
        }
    }

    fn failure() -> Self {
        Self {
            success: false,
            prediction: None,
            message: Some(FAILURE_MESSAGE.to_string()),
        }
    }
}

/// 종가 예측.
///
/// POST /predict
#[utoipa::path(
    post,
    path = "/predict",
    request_body(
        content = PredictRequest,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "예측 결과 또는 실패 플래그", body = PredictResponse)
    ),
    tag = "predict"
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Form(request): Form<PredictRequest>,
) -> Json<PredictResponse> {
    let parsed = (
        request.open.trim().parse::<f32>(),
        request.high.trim().parse::<f32>(),
        request.low.trim().parse::<f32>(),
        request.volume.trim().parse::<f32>(),
    );

    let (Ok(open), Ok(high), Ok(low), Ok(volume)) = parsed else {
        warn!("Prediction request with non-numeric fields");
        return Json(PredictResponse::failure());
    };

    match state.predictions.predict(open, high, low, volume).await {
        Ok(prediction) => {
            let rounded = (f64::from(prediction) * 100.0).round() / 100.0;
            Json(PredictResponse::ok(rounded))
        }
        Err(e) => {
            warn!(error = %e, "Prediction failed");
            Json(PredictResponse::failure())
        }
    }
}

/// 예측 라우터 생성.
pub fn predict_router() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{FixedRateFetcher, StaticQuoteProvider};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use marketview_data::exchange_rate::{RateCache, SystemClock};
    use marketview_ml::{MockPredictor, PredictionService};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    fn state_with_predictor(predictor: MockPredictor) -> Arc<AppState> {
        let rate_cache = RateCache::new(
            Arc::new(FixedRateFetcher { rate: None }),
            Arc::new(SystemClock),
            vec!["test-key".to_string()],
        );

        Arc::new(AppState::new(
            Arc::new(StaticQuoteProvider::with_sample_series()),
            Arc::new(rate_cache),
            Arc::new(PredictionService::with_predictor(Box::new(predictor))),
        ))
    }

    async fn post_form(state: Arc<AppState>, body: &str) -> (StatusCode, PredictResponse) {
        let app = predict_router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_predict_success_rounded() {
        let state = state_with_predictor(MockPredictor::new(4).with_fixed_prediction(105.2567));

        let (status, body) =
            post_form(state, "open=100.5&high=106.0&low=99.25&volume=1000000").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.prediction, Some(105.26));
        assert!(body.message.is_none());
    }

    #[tokio::test]
    async fn test_predict_non_numeric_open_skips_model() {
        let predictor = MockPredictor::new(4).with_fixed_prediction(105.25);
        let calls = predictor.call_counter();
        let state = state_with_predictor(predictor);

        let (status, body) = post_form(state, "open=abc&high=106.0&low=99.25&volume=1000").await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some(FAILURE_MESSAGE));
        // 모델은 호출되지 않아야 함
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_predict_unconfigured_model_fails_generically() {
        let rate_cache = RateCache::new(
            Arc::new(FixedRateFetcher { rate: None }),
            Arc::new(SystemClock),
            vec![],
        );
        let state = Arc::new(AppState::new(
            Arc::new(StaticQuoteProvider::with_sample_series()),
            Arc::new(rate_cache),
            Arc::new(PredictionService::disabled()),
        ));

        let (_, body) = post_form(state, "open=1&high=2&low=3&volume=4").await;

        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some(FAILURE_MESSAGE));
    }
}
