pub mod logging;

pub use logging::{redact_data_uris, truncate_text};
