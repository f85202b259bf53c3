//! ONNX 모델을 사용한 종가 예측.
//!
//! 이 모듈은 ONNX Runtime 기반 회귀 prediction을 제공합니다.
//! 모델은 별도로 학습되어야 하며 (예: Python/scikit-learn 사용)
//! ONNX 형식으로 내보내야 합니다.

use crate::error::{MlError, MlResult};
use ort::session::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 기본 feature 개수: open, high, low, volume.
pub const FEATURE_COUNT: usize = 4;

/// ONNX predictor 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// ONNX 모델 파일 경로
    pub model_path: PathBuf,
    /// 예상 입력 feature 크기
    pub input_size: usize,
    /// 로깅/식별을 위한 모델 이름
    pub model_name: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/stock_predictor.onnx"),
            input_size: FEATURE_COUNT,
            model_name: "stock_predictor".to_string(),
        }
    }
}

impl PredictorConfig {
    /// 주어진 모델 경로로 새 predictor 설정 생성.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// 입력 크기 설정.
    pub fn with_input_size(mut self, size: usize) -> Self {
        self.input_size = size;
        self
    }

    /// 모델 이름 설정.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }
}

/// 다형성을 가능하게 하는 predictor trait.
pub trait PricePredictor: Send + Sync {
    /// feature vector에서 종가 예측.
    fn predict(&mut self, features: &[f32]) -> MlResult<f32>;

    /// 모델 이름 반환.
    fn model_name(&self) -> &str;
}

/// ONNX 기반 종가 predictor.
///
/// ONNX 모델을 로드하고 추론을 수행하여 종가를 예측합니다.
/// 모델은 다음을 가져야 합니다:
/// - 입력: [batch_size, input_size] 형태의 float32 텐서
/// - 출력: [batch_size, 1] 형태의 float32 텐서 (회귀 스칼라)
pub struct OnnxPredictor {
    session: Session,
    config: PredictorConfig,
}

impl OnnxPredictor {
    /// 지정된 경로에서 ONNX 모델 로드.
    pub fn load(config: PredictorConfig) -> MlResult<Self> {
        let path = &config.model_path;

        if !path.exists() {
            return Err(MlError::ModelLoad(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        info!("Loading ONNX model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| MlError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| MlError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| MlError::ModelLoad(format!("Failed to load model: {}", e)))?;

        info!("ONNX model loaded successfully: {}", config.model_name);

        Ok(Self { session, config })
    }

    /// 기본 설정으로 파일 경로에서 모델 로드.
    pub fn from_file(path: impl AsRef<Path>) -> MlResult<Self> {
        let config = PredictorConfig::new(path.as_ref());
        Self::load(config)
    }

    /// predictor 설정 반환.
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// feature vector에서 종가 예측.
    pub fn predict(&mut self, features: &[f32]) -> MlResult<f32> {
        // 입력 크기 검증
        if features.len() != self.config.input_size {
            return Err(MlError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.config.input_size,
                features.len()
            )));
        }

        // 입력 텐서 생성 [1, input_size]
        let input_data: Vec<f32> = features.to_vec();
        let input_shape = [1i64, self.config.input_size as i64];

        let input_tensor =
            ort::value::Tensor::from_array((input_shape, input_data.into_boxed_slice()))
                .map_err(|e| MlError::Inference(format!("Failed to create input tensor: {}", e)))?;

        // 입력으로 추론 실행
        let outputs = self
            .session
            .run(ort::inputs!["input" => input_tensor])
            .map_err(|e| MlError::Inference(format!("Inference failed: {}", e)))?;

        // 첫 번째 출력 가져오기 ("output" 이름 또는 첫 번째 사용 가능한 것)
        let output_name = outputs
            .iter()
            .next()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| MlError::Inference("No output tensor found".to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| MlError::Inference("Failed to get output by name".to_string()))?;

        // 텐서 데이터 추출 - (&Shape, &[f32]) 반환
        let (_, output_slice) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MlError::Inference(format!("Failed to extract output tensor: {}", e)))?;

        let prediction = *output_slice
            .first()
            .ok_or_else(|| MlError::Inference("Empty output tensor".to_string()))?;

        debug!(
            "Prediction: {:.4} (model: {})",
            prediction, self.config.model_name
        );

        Ok(prediction)
    }
}

impl PricePredictor for OnnxPredictor {
    fn predict(&mut self, features: &[f32]) -> MlResult<f32> {
        OnnxPredictor::predict(self, features)
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// 실제 모델 파일 없이 테스트하기 위한 mock predictor.
pub struct MockPredictor {
    config: PredictorConfig,
    /// 항상 반환할 고정 prediction
    pub fixed_prediction: Option<f32>,
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl MockPredictor {
    /// 새 mock predictor 생성.
    pub fn new(input_size: usize) -> Self {
        Self {
            config: PredictorConfig::default()
                .with_input_size(input_size)
                .with_model_name("mock_predictor"),
            fixed_prediction: None,
            calls: std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    /// 항상 반환할 고정 prediction 설정.
    pub fn with_fixed_prediction(mut self, prediction: f32) -> Self {
        self.fixed_prediction = Some(prediction);
        self
    }

    /// 호출 횟수 카운터 핸들 반환.
    ///
    /// predictor가 상태로 이동한 뒤에도 테스트에서 호출 여부를
    /// 관찰할 수 있습니다.
    pub fn call_counter(&self) -> std::sync::Arc<std::sync::atomic::AtomicUsize> {
        self.calls.clone()
    }

    /// mock 로직으로 예측.
    pub fn predict(&mut self, features: &[f32]) -> MlResult<f32> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if features.len() != self.config.input_size {
            return Err(MlError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.config.input_size,
                features.len()
            )));
        }

        if let Some(fixed) = self.fixed_prediction {
            return Ok(fixed);
        }

        // 간단한 휴리스틱: OHL 평균을 예측 종가로 사용
        let price_features = &features[..features.len().min(3)];
        let mean = price_features.iter().sum::<f32>() / price_features.len() as f32;
        Ok(mean)
    }
}

impl PricePredictor for MockPredictor {
    fn predict(&mut self, features: &[f32]) -> MlResult<f32> {
        MockPredictor::predict(self, features)
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_config_default() {
        let config = PredictorConfig::default();
        assert_eq!(config.input_size, FEATURE_COUNT);
        assert_eq!(config.model_name, "stock_predictor");
    }

    #[test]
    fn test_predictor_config_builder() {
        let config = PredictorConfig::new("models/test.onnx")
            .with_input_size(8)
            .with_model_name("test_model");

        assert_eq!(config.input_size, 8);
        assert_eq!(config.model_name, "test_model");
        assert_eq!(config.model_path, PathBuf::from("models/test.onnx"));
    }

    #[test]
    fn test_model_not_found() {
        let config = PredictorConfig::new("nonexistent/model.onnx");
        let result = OnnxPredictor::load(config);

        assert!(result.is_err());
        match result {
            Err(MlError::ModelLoad(msg)) => {
                assert!(msg.contains("not found"));
            }
            _ => panic!("Expected ModelLoad error"),
        }
    }

    #[test]
    fn test_mock_predictor_fixed() {
        let mut predictor = MockPredictor::new(4).with_fixed_prediction(123.456);

        let result = predictor.predict(&[100.0, 105.0, 99.0, 1_000_000.0]).unwrap();
        assert_eq!(result, 123.456);
    }

    #[test]
    fn test_mock_predictor_heuristic() {
        let mut predictor = MockPredictor::new(4);

        let result = predictor.predict(&[100.0, 110.0, 90.0, 1_000.0]).unwrap();
        assert!((result - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mock_predictor_input_size_validation() {
        let mut predictor = MockPredictor::new(4);

        let result = predictor.predict(&[1.0, 2.0]);
        assert!(matches!(result, Err(MlError::InvalidInput(_))));
    }

    #[test]
    fn test_mock_predictor_counts_calls() {
        let mut predictor = MockPredictor::new(4).with_fixed_prediction(1.0);
        let calls = predictor.call_counter();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        predictor.predict(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        predictor.predict(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
