//! NMSSentinel backend transport

mod client;

pub use client::{BackendClient, BackendReply, HttpBackendClient, ReplyBody, TransportError};

#[cfg(test)]
pub use client::MockBackendClient;
