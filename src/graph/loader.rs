//! Wipe-and-reload of the identity graph.
//!
//! The loader owns one store (one connection for the Bolt backend) for its
//! whole life. [`GraphLoader::close`] releases it; dropping an unclosed
//! loader releases it too and says so in the log.

use crate::config::RelationshipMode;
use crate::graph::records::PersonRecord;
use crate::graph::store::{GraphCounts, GraphStore};
use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

pub const CLEAR_QUERY: &str = "MATCH (n) DETACH DELETE n";

/// Batch statement over `$records`, a list of maps keyed by CSV header
pub fn load_query(mode: RelationshipMode) -> String {
    let edge = match mode {
        RelationshipMode::Create => "CREATE",
        RelationshipMode::Merge => "MERGE",
    };
    format!(
        "UNWIND $records AS row \
         MERGE (u:User {{name: row.Name}}) \
         MERGE (p:Phone {{number: row['Phone Number']}}) \
         MERGE (e:Email {{address: row.Email}}) \
         {edge} (u)-[:HAS_PHONE]->(p) \
         {edge} (u)-[:HAS_EMAIL]->(e)"
    )
}

pub struct GraphLoader<S: GraphStore> {
    store: S,
    mode: RelationshipMode,
    closed: bool,
}

impl<S: GraphStore> GraphLoader<S> {
    pub fn new(store: S, mode: RelationshipMode) -> Self {
        info!(backend = store.name(), mode = ?mode, "Graph loader ready");
        Self {
            store,
            mode,
            closed: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn clear(&mut self) -> Result<()> {
        info!("Clearing existing database...");
        self.store.clear().await?;
        info!("Database cleared");
        Ok(())
    }

    pub async fn load(&mut self, records: &[PersonRecord]) -> Result<()> {
        let start = Instant::now();
        info!(records = records.len(), "Loading data into graph...");
        self.store.load(records, self.mode).await?;
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Data loading complete"
        );
        Ok(())
    }

    pub async fn counts(&mut self) -> Result<GraphCounts> {
        self.store.counts().await
    }

    /// Clear, load and count, then close, whatever the outcome
    pub async fn replace_all(mut self, records: &[PersonRecord]) -> Result<GraphCounts> {
        let result = async {
            self.clear().await?;
            self.load(records).await?;
            self.counts().await
        }
        .await;
        self.close();

        let counts = result?;
        info!(
            users = counts.users,
            phones = counts.phones,
            emails = counts.emails,
            has_phone = counts.has_phone,
            has_email = counts.has_email,
            "Graph populated"
        );
        Ok(counts)
    }

    /// Release the store.
    ///
    /// Consumes the loader; the store (and with it the Bolt connection pool)
    /// is dropped when this returns. Marking the loader closed first keeps
    /// the drop quiet.
    pub fn close(mut self) {
        self.closed = true;
        info!(backend = self.store.name(), "Graph connection closed");
    }
}

impl<S: GraphStore> Drop for GraphLoader<S> {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                backend = self.store.name(),
                "Graph loader dropped without close; releasing connection"
            );
        }
    }
}
