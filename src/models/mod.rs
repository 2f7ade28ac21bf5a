pub mod image;
pub mod loaders;
pub mod request;
pub mod result;
pub mod submission;

pub use image::ImageRef;
pub use loaders::{load_all_toml_files, load_submission_draft};
pub use request::GradingRequest;
pub use result::{ErrorDetail, GradingResult, PracticeProblem, PracticeSets};
pub use submission::{Submission, SubmissionDraft};
