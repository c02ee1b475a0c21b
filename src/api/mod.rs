pub mod client;
pub mod models;

pub use client::{HttpClient, Result, Transport, TransportError};
pub use models::FetchConfig;
