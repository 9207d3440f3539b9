//! Deduplicated, ordered set of discovered devices.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::advertisement::Advertisement;

/// A device the user can pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub hardware_id: String,
    pub hostname: String,
    pub host: String,
    pub port: u16,
}

impl Candidate {
    /// Build a candidate from an advertisement that carries a hardware id
    pub fn from_advertisement(ad: &Advertisement) -> Option<Self> {
        let hardware_id = ad.hardware_id()?;
        Some(Self {
            hardware_id: hardware_id.to_string(),
            hostname: ad.hostname.clone(),
            host: ad.host(),
            port: ad.port_or_default(),
        })
    }

    /// Label shown in the selection form: `hostname (host:port)`
    pub fn label(&self) -> String {
        format!("{} ({}:{})", self.hostname, self.host, self.port)
    }
}

/// Candidates keyed by hardware id, in order of first appearance
///
/// Re-inserting a known hardware id replaces the entry in place, so the
/// newest address wins without moving the device around in the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    entries: IndexMap<String, Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a candidate; returns `true` for a new hardware id
    pub fn upsert(&mut self, candidate: Candidate) -> bool {
        self.entries
            .insert(candidate.hardware_id.clone(), candidate)
            .is_none()
    }

    pub fn get(&self, hardware_id: &str) -> Option<&Candidate> {
        self.entries.get(hardware_id)
    }

    pub fn contains(&self, hardware_id: &str) -> bool {
        self.entries.contains_key(hardware_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.values()
    }

    /// The only candidate, if there is exactly one
    pub fn single(&self) -> Option<&Candidate> {
        if self.entries.len() == 1 {
            self.entries.values().next()
        } else {
            None
        }
    }
}
