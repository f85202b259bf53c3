//! 가격 예측 추론 crate.
//!
//! 외부에서 학습된 회귀 모델(ONNX 형식)을 로드하고 단일 예측을
//! 수행합니다. 모델은 블랙박스로 취급됩니다:
//!
//! - 입력: `[1, 4]` float32 텐서 (open, high, low, volume)
//! - 출력: `[1, 1]` float32 텐서 (예측 종가)
//!
//! 학습은 이 시스템 밖에서 이루어지며 (예: Python/scikit-learn),
//! ONNX 형식으로 내보낸 아티팩트만 소비합니다.

pub mod error;
pub mod predictor;
pub mod service;

pub use error::{MlError, MlResult};
pub use predictor::{MockPredictor, OnnxPredictor, PredictorConfig, PricePredictor};
pub use service::PredictionService;
