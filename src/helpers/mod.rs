//! Pure helper functions shared by the pipeline and the transport adapters.

pub mod headers;
pub mod url;

pub use headers::{normalize_header_name, parse_raw_headers};
pub use url::{build_url, combine_url, is_absolute_url};
