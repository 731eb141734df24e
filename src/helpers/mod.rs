pub mod error_response;
pub mod handler_404;
