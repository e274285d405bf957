//! Bolt-protocol backend (Memgraph or Neo4j) over `neo4rs`

use crate::config::{GraphConfig, RelationshipMode};
use crate::graph::loader::{load_query, CLEAR_QUERY};
use crate::graph::records::PersonRecord;
use crate::graph::store::{GraphCounts, GraphStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{query, BoltList, BoltMap, BoltString, BoltType, ConfigBuilder, Graph};
use tracing::{debug, info};

/// A graph database reached through a single Bolt connection
pub struct BoltStore {
    graph: Graph,
    uri: String,
}

impl BoltStore {
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        info!(uri = %config.uri, "Connecting to graph database");

        let bolt_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .max_connections(1)
            .build()
            .context("Invalid graph connection settings")?;

        let graph = Graph::connect(bolt_config)
            .await
            .with_context(|| format!("Failed to connect to graph database at {}", config.uri))?;

        info!(uri = %config.uri, "Connected to graph database");
        Ok(Self {
            graph,
            uri: config.uri.clone(),
        })
    }

    async fn count(&self, statement: &str) -> Result<u64> {
        let mut rows = self
            .graph
            .execute(query(statement))
            .await
            .with_context(|| format!("Count query failed: {}", statement))?;

        let n = match rows.next().await? {
            Some(row) => row
                .get::<i64>("n")
                .with_context(|| format!("Count query returned no 'n': {}", statement))?,
            None => 0,
        };
        Ok(n.max(0) as u64)
    }
}

/// `$records` parameter: one map per row keyed by CSV header
fn records_param(records: &[PersonRecord]) -> BoltType {
    let mut list = BoltList::with_capacity(records.len());
    for record in records {
        let mut row = BoltMap::with_capacity(3);
        row.put(BoltString::from("Name"), BoltType::from(record.name.as_str()));
        row.put(
            BoltString::from("Phone Number"),
            BoltType::from(record.phone_number.as_str()),
        );
        row.put(BoltString::from("Email"), BoltType::from(record.email.as_str()));
        list.push(BoltType::Map(row));
    }
    BoltType::List(list)
}

#[async_trait]
impl GraphStore for BoltStore {
    fn name(&self) -> &'static str {
        "bolt"
    }

    async fn clear(&mut self) -> Result<()> {
        self.graph
            .run(query(CLEAR_QUERY))
            .await
            .with_context(|| format!("Failed to clear graph at {}", self.uri))
    }

    async fn load(&mut self, records: &[PersonRecord], mode: RelationshipMode) -> Result<()> {
        let statement = load_query(mode);
        debug!(statement = %statement, rows = records.len(), "Running batch load");

        self.graph
            .run(query(&statement).param("records", records_param(records)))
            .await
            .with_context(|| format!("Batch load of {} rows failed", records.len()))
    }

    async fn counts(&mut self) -> Result<GraphCounts> {
        Ok(GraphCounts {
            users: self.count("MATCH (n:User) RETURN count(n) AS n").await?,
            phones: self.count("MATCH (n:Phone) RETURN count(n) AS n").await?,
            emails: self.count("MATCH (n:Email) RETURN count(n) AS n").await?,
            has_phone: self
                .count("MATCH ()-[r:HAS_PHONE]->() RETURN count(r) AS n")
                .await?,
            has_email: self
                .count("MATCH ()-[r:HAS_EMAIL]->() RETURN count(r) AS n")
                .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_param_shape() {
        let param = records_param(&[
            PersonRecord::new("Alice", "555-0100", "a@x.com"),
            PersonRecord::new("Bob", "555-0200", "b@x.com"),
        ]);
        let BoltType::List(list) = param else {
            panic!("expected a list parameter");
        };
        assert_eq!(list.len(), 2);

        let BoltType::Map(first) = &list.value[0] else {
            panic!("expected map rows");
        };
        assert_eq!(
            first.value.get(&BoltString::from("Phone Number")),
            Some(&BoltType::from("555-0100"))
        );
        assert_eq!(
            first.value.get(&BoltString::from("Name")),
            Some(&BoltType::from("Alice"))
        );
    }
}
