pub mod output;
pub use output::write_output;
pub mod url_validation;
pub use url_validation::{UrlValidationError, validate_api_url};
