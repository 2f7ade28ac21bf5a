pub mod content_assembler;
pub mod dispatcher;
pub mod failure_log;
pub mod image_resolver;
pub mod prompt;
pub mod response_validator;

pub use content_assembler::{ContentAssembler, ContentBlock};
pub use dispatcher::{retry_delay, RequestDispatcher};
pub use failure_log::FailureLog;
pub use image_resolver::{ImageResolver, PlaceholderPolicy};
pub use response_validator::ResponseValidator;
