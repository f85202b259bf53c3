//! 예측 서비스 - predictor 로드와 추론을 통합.
//!
//! 모델 아티팩트는 프로세스 시작 시 한 번 로드되어 모든 요청이
//! 공유합니다. 로드에 실패하면 서비스는 미설정 상태로 남고,
//! 이후 모든 predict 호출이 일반 실패로 끝납니다.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::{MlError, MlResult};
use crate::predictor::{OnnxPredictor, PredictorConfig, PricePredictor};

/// 공유 예측 서비스.
///
/// `predict`는 (open, high, low, volume) 순서의 4-feature 벡터를
/// 조립하여 predictor에 전달합니다.
pub struct PredictionService {
    predictor: Option<Arc<RwLock<Box<dyn PricePredictor>>>>,
}

impl PredictionService {
    /// 모델 경로에서 서비스 생성.
    ///
    /// 로드 실패는 에러 로그 후 미설정 서비스로 이어집니다
    /// (서버는 예측 없이 기동합니다).
    pub fn from_model_path(path: impl AsRef<Path>) -> Self {
        let config = PredictorConfig::new(path.as_ref());

        match OnnxPredictor::load(config) {
            Ok(predictor) => {
                info!(model = predictor.model_name(), "Prediction service ready");
                Self {
                    predictor: Some(Arc::new(RwLock::new(Box::new(predictor)))),
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to load prediction model, /predict will be unavailable");
                Self { predictor: None }
            }
        }
    }

    /// 주어진 predictor로 서비스 생성 (테스트용 mock 주입).
    pub fn with_predictor(predictor: Box<dyn PricePredictor>) -> Self {
        Self {
            predictor: Some(Arc::new(RwLock::new(predictor))),
        }
    }

    /// 미설정 서비스 생성.
    pub fn disabled() -> Self {
        Self { predictor: None }
    }

    /// 모델이 로드되어 있는지 확인.
    pub fn is_configured(&self) -> bool {
        self.predictor.is_some()
    }

    /// 현재 로드된 모델 이름 반환.
    pub async fn model_name(&self) -> Option<String> {
        match &self.predictor {
            Some(slot) => Some(slot.read().await.model_name().to_string()),
            None => None,
        }
    }

    /// 단일 종가 예측.
    pub async fn predict(&self, open: f32, high: f32, low: f32, volume: f32) -> MlResult<f32> {
        let Some(slot) = &self.predictor else {
            return Err(MlError::ModelLoad(
                "prediction model not configured".to_string(),
            ));
        };

        let features = [open, high, low, volume];
        let mut predictor = slot.write().await;
        predictor.predict(&features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::MockPredictor;

    #[tokio::test]
    async fn test_predict_with_mock() {
        let service =
            PredictionService::with_predictor(Box::new(MockPredictor::new(4).with_fixed_prediction(105.25)));

        let result = service.predict(100.0, 106.0, 99.0, 1_000_000.0).await.unwrap();
        assert_eq!(result, 105.25);
        assert!(service.is_configured());
        assert_eq!(service.model_name().await.as_deref(), Some("mock_predictor"));
    }

    #[tokio::test]
    async fn test_disabled_service_fails_generically() {
        let service = PredictionService::disabled();

        assert!(!service.is_configured());
        let result = service.predict(1.0, 2.0, 3.0, 4.0).await;
        assert!(matches!(result, Err(MlError::ModelLoad(_))));
    }

    #[tokio::test]
    async fn test_missing_model_file_leaves_service_unconfigured() {
        let service = PredictionService::from_model_path("nonexistent/model.onnx");
        assert!(!service.is_configured());
        assert!(service.model_name().await.is_none());
    }
}
