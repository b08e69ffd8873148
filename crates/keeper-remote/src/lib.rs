//! OpenSearch HTTP gateway for search-keeper
//!
//! [`OpenSearchGateway`] implements [`keeper_core::RemoteGateway`] over the
//! cluster's REST API for one resource kind. Requests go through
//! [`HttpClient`], which applies the environment's TLS, proxy, timeout, and
//! authentication settings (HTTP basic auth or AWS SigV4).

pub mod client;
pub mod gateway;
pub mod sigv4;

pub use client::{HttpClient, Response};
pub use gateway::OpenSearchGateway;
pub use sigv4::AwsSigner;
