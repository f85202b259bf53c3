//! ML 모듈 에러 타입.

use thiserror::Error;

/// ML 작업에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// ONNX 모델 로드 에러
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// 모델 추론 중 에러
    #[error("Inference error: {0}")]
    Inference(String),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// ONNX Runtime 에러
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(String),
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl From<ort::Error> for MlError {
    fn from(err: ort::Error) -> Self {
        MlError::OnnxRuntime(err.to_string())
    }
}
