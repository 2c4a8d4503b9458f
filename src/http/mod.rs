//! HTTP client module
//!
//! The request helper both service clients sit on. One call, one exchange:
//! no retries, no rate limiting. The helper returns status and raw body and
//! leaves it to the caller to decide what a non-2xx response means.

mod client;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, HttpResponse, RequestBody,
    RequestConfig,
};
