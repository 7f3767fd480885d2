// Public modules
pub mod api_error;
pub mod content;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod message;
pub mod sender;
pub mod thinking_config;

// Re-exports
pub use api_error::{ApiErrorDetail, ApiErrorObject, ApiErrorResponse};
pub use content::{Content, Part};
pub use generate_content_request::{GenerateContentRequest, GenerationConfig};
pub use generate_content_response::{
    Candidate, GenerateContentResponse, ResponseContent, ResponsePart,
};
pub use message::Message;
pub use sender::Sender;
pub use thinking_config::ThinkingConfig;
