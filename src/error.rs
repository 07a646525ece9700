use thiserror::Error;

use crate::gate::Operation;
use crate::template::TemplateId;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

// Enum for handling the errors surfaced by studio operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError), // Any failure coming back from the generation backend.

    #[error("{0} is already in progress")]
    Busy(Operation), // The operation's gate is held by a pending request.

    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("No template selected")]
    NoTemplateSelected,

    #[error("Story is empty")]
    EmptyStory,

    #[error("Story topic is empty")]
    EmptyTopic,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(String),
}

// Errors from the generation backend. Every variant is a generation failure from
// the caller's point of view: the request is over and nothing is retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Timeout occurred")]
    Timeout,

    #[error("No content in response")]
    EmptyResponse,

    #[error("Image generation failed. The model may have blocked the request for safety reasons.")]
    ImageRejected,

    #[error("Image payload could not be decoded: {0}")]
    ImageDecode(String),
}

impl From<base64::DecodeError> for GenerationError {
    fn from(err: base64::DecodeError) -> Self {
        GenerationError::ImageDecode(err.to_string())
    }
}

impl From<image::ImageError> for GenerationError {
    fn from(err: image::ImageError) -> Self {
        GenerationError::ImageDecode(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
