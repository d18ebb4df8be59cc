use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::CheckContext;
use crate::error::ProbeResult;

/// Metadata describing a probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeDescriptor {
    pub name: String,
    pub description: String,
}

/// A single scheduled service check.
///
/// The scheduler calls `validate` once when a check is registered and `run`
/// on every scheduled round, handing each run a fresh config blob and a
/// context with the round's deadline.
#[async_trait]
pub trait Probe: Send + Sync {
    fn descriptor(&self) -> ProbeDescriptor;

    /// Check that a config blob is well-formed. Pure, no I/O.
    fn validate(&self, config: &str) -> ProbeResult<()>;

    /// Execute the check once against the target service.
    async fn run(&self, ctx: &CheckContext, config: &str) -> ProbeResult<()>;
}
