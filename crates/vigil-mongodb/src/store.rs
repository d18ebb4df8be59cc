use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::Client;

/// The slice of driver surface the probe needs. Keeping it this narrow lets
/// tests script the driver without a live server.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn connect(
        &self,
        uri: &str,
        timeout: Duration,
    ) -> anyhow::Result<Box<dyn DocumentSession>>;
}

/// An open connection to one server, owned by a single run.
#[async_trait]
pub trait DocumentSession: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;

    /// Whether any document in `database`.`collection` matches `filter`.
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> anyhow::Result<bool>;

    /// Release the connection. Consumes the session so a closed session
    /// cannot be reused.
    async fn close(self: Box<Self>);
}

/// Real driver behind the probe.
pub struct MongoStore;

#[async_trait]
impl DocumentStore for MongoStore {
    async fn connect(
        &self,
        uri: &str,
        timeout: Duration,
    ) -> anyhow::Result<Box<dyn DocumentSession>> {
        let mut options = ClientOptions::parse(uri).await?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        Ok(Box::new(MongoSession { client }))
    }
}

struct MongoSession {
    client: Client,
}

#[async_trait]
impl DocumentSession for MongoSession {
    async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: Document,
    ) -> anyhow::Result<bool> {
        let found = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .find_one(filter)
            .await?;
        Ok(found.is_some())
    }

    async fn close(self: Box<Self>) {
        self.client.shutdown().await;
    }
}
