// src/sources/mod.rs
pub mod http;
pub mod stub;
pub mod types;

pub use http::HttpFetcher;
pub use stub::StubFetcher;
pub use types::{FetchError, FetchOutcome, Source, SourceFetcher};
