//! In-process graph with the same write semantics as the Cypher load

use crate::config::RelationshipMode;
use crate::graph::records::PersonRecord;
use crate::graph::store::{GraphCounts, GraphStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct MemoryGraph {
    users: BTreeSet<String>,
    phones: BTreeSet<String>,
    emails: BTreeSet<String>,
    /// (user name, phone number), one entry per edge
    has_phone: Vec<(String, String)>,
    /// (user name, email address), one entry per edge
    has_email: Vec<(String, String)>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phones linked to a user, with multiplicity
    pub fn phones_of(&self, user: &str) -> Vec<&str> {
        self.has_phone
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(_, p)| p.as_str())
            .collect()
    }

    fn add_edge(edges: &mut Vec<(String, String)>, from: &str, to: &str, mode: RelationshipMode) {
        let exists = || edges.iter().any(|(f, t)| f == from && t == to);
        if mode == RelationshipMode::Create || !exists() {
            edges.push((from.to_string(), to.to_string()));
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn clear(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }

    async fn load(&mut self, records: &[PersonRecord], mode: RelationshipMode) -> Result<()> {
        for row in records {
            self.users.insert(row.name.clone());
            self.phones.insert(row.phone_number.clone());
            self.emails.insert(row.email.clone());
            Self::add_edge(&mut self.has_phone, &row.name, &row.phone_number, mode);
            Self::add_edge(&mut self.has_email, &row.name, &row.email, mode);
        }
        Ok(())
    }

    async fn counts(&mut self) -> Result<GraphCounts> {
        Ok(GraphCounts {
            users: self.users.len() as u64,
            phones: self.phones.len() as u64,
            emails: self.emails.len() as u64,
            has_phone: self.has_phone.len() as u64,
            has_email: self.has_email.len() as u64,
        })
    }
}
