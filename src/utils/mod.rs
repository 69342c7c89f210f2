/// Path normalization and validation
pub mod path;
/// Retry helpers for transient failures
pub mod retry;

pub use path::{is_valid_file_path, normalize_user_input_path};
pub use retry::with_retry;
