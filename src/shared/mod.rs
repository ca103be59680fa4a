//! Shared utilities used by the proxy and analysis layers.

pub mod status_text;
pub mod timing;

pub use status_text::status_text;
pub use timing::RequestTimer;
