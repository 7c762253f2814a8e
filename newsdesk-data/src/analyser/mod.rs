//! HTTP entity extraction for natural-language query routing.
//!
//! [`HttpTextAnalyser`] implements the synchronous
//! [`TextAnalyser`](newsdesk_core::TextAnalyser) trait by blocking on
//! asynchronous `reqwest` calls.

mod api;
mod http;

pub use api::{AnalyzeEntitiesRequest, AnalyzeEntitiesResponse, ResponseEntity};
pub use http::{
    AnalyserBuildError, DEFAULT_ANALYSER_ENDPOINT, DEFAULT_USER_AGENT, HttpTextAnalyser,
    HttpTextAnalyserConfig,
};
