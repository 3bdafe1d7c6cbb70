pub mod api;

pub use api::{path_segment, ApiClient, DEFAULT_TIMEOUT};
