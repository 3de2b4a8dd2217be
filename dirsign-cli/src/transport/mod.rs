//! Transport implementations for the CLI.

pub mod http;

pub use http::HttpTransport;
