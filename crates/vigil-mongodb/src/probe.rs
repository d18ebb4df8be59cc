use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::time::timeout;

use vigil_core::context::CheckContext;
use vigil_core::error::{ProbeError, ProbeResult};
use vigil_core::probe::{Probe, ProbeDescriptor};

use crate::config::MongoCheckConfig;
use crate::store::{DocumentSession, DocumentStore, MongoStore};

/// MongoDB health check: connect, ping, and optionally confirm that one
/// document matching a filter exists.
pub struct MongoProbe {
    store: Box<dyn DocumentStore>,
}

impl MongoProbe {
    pub fn new() -> Self {
        Self::with_store(Box::new(MongoStore))
    }

    /// Run the probe against a different backend (used by tests).
    pub fn with_store(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl Default for MongoProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for MongoProbe {
    fn descriptor(&self) -> ProbeDescriptor {
        ProbeDescriptor {
            name: "mongodb".into(),
            description: "Connect to a MongoDB server, ping it, and optionally look up a document"
                .into(),
        }
    }

    fn validate(&self, config: &str) -> ProbeResult<()> {
        MongoCheckConfig::decode(config)?.validate()
    }

    async fn run(&self, ctx: &CheckContext, config: &str) -> ProbeResult<()> {
        let conf = MongoCheckConfig::decode(config)?;
        let op_timeout = ctx.timeout()?;

        tracing::debug!(
            server = %conf.server,
            port = conf.port,
            timeout = ?op_timeout,
            "connecting to mongodb"
        );

        let session = timeout(op_timeout, self.store.connect(&conf.connection_uri(), op_timeout))
            .await
            .map_err(|_| {
                ProbeError::Connection(anyhow::anyhow!(
                    "failed to connect to mongodb server: timed out after {op_timeout:?}"
                ))
            })?
            .map_err(|e| {
                ProbeError::Connection(anyhow::anyhow!("failed to connect to mongodb server: {e}"))
            })?;

        // The session must be released on every path after a successful
        // connect, so the remaining steps run in a separate function.
        let result = check(session.as_ref(), &conf, op_timeout).await;
        session.close().await;
        result
    }
}

async fn check(
    session: &dyn DocumentSession,
    conf: &MongoCheckConfig,
    op_timeout: Duration,
) -> ProbeResult<()> {
    timeout(op_timeout, session.ping())
        .await
        .map_err(|_| {
            ProbeError::Connection(anyhow::anyhow!(
                "failed to ping mongodb server: timed out after {op_timeout:?}"
            ))
        })?
        .map_err(|e| {
            ProbeError::Connection(anyhow::anyhow!("failed to ping mongodb server: {e}"))
        })?;

    if !conf.has_lookup() {
        tracing::debug!(server = %conf.server, "no lookup configured, ping only");
        return Ok(());
    }

    let filter = parse_filter(&conf.query)?;

    let found = timeout(
        op_timeout,
        session.find_one(&conf.database, &conf.collection, filter),
    )
    .await
    .map_err(|_| {
        ProbeError::Query(anyhow::anyhow!(
            "failed to execute query: timed out after {op_timeout:?}"
        ))
    })?
    .map_err(|e| ProbeError::Query(anyhow::anyhow!("failed to execute query: {e}")))?;

    if !found {
        return Err(ProbeError::NoMatch(conf.query.clone()));
    }

    tracing::debug!(
        database = %conf.database,
        collection = %conf.collection,
        "lookup matched a document"
    );

    Ok(())
}

/// Parse the configured query as an extended JSON filter document.
fn parse_filter(query: &str) -> ProbeResult<Document> {
    let value: serde_json::Value = serde_json::from_str(query)
        .map_err(|e| ProbeError::Query(anyhow::anyhow!("failed to parse query: {e}")))?;

    match Bson::try_from(value) {
        Ok(Bson::Document(filter)) => Ok(filter),
        Ok(_) => Err(ProbeError::Query(anyhow::anyhow!(
            "failed to parse query: filter must be a document"
        ))),
        Err(e) => Err(ProbeError::Query(anyhow::anyhow!(
            "failed to parse query: {e}"
        ))),
    }
}
