// src/probe/mod.rs
mod http;
mod result;

pub use http::HttpProber;
pub use result::{ProbeOutcome, ProbeResult};

use async_trait::async_trait;
use url::Url;

/// Samples the health of the watched endpoint.
///
/// Implementations must bound every call by their own timeout and fold any
/// transport failure into the returned [`ProbeResult`] instead of erroring.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> ProbeResult;

    /// The endpoint being probed, for notification content.
    fn target(&self) -> &Url;
}
