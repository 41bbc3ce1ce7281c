//! HTTP client building and response handling for provider calls.

mod client;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use response::{parse_form, read_success_body};
