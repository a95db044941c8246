//! Downstream snapshot access.

mod client;
mod downstream_traits;

pub use client::DownstreamClient;
pub use downstream_traits::SnapshotProvider;
