//! The seam between the loader and a graph backend

use crate::config::RelationshipMode;
use crate::graph::records::PersonRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Node and relationship totals after a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub users: u64,
    pub phones: u64,
    pub emails: u64,
    pub has_phone: u64,
    pub has_email: u64,
}

impl GraphCounts {
    pub fn nodes(&self) -> u64 {
        self.users + self.phones + self.emails
    }

    pub fn relationships(&self) -> u64 {
        self.has_phone + self.has_email
    }
}

/// A graph that User/Phone/Email rows can be written to
#[async_trait]
pub trait GraphStore: Send {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Delete every node and relationship
    async fn clear(&mut self) -> Result<()>;

    /// Write the whole row-set in one statement.
    ///
    /// Nodes are merged on their key property; edges follow `mode`.
    async fn load(&mut self, records: &[PersonRecord], mode: RelationshipMode) -> Result<()>;

    async fn counts(&mut self) -> Result<GraphCounts>;
}
