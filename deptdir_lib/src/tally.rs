//! Per-page and per-run record counters.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{Record, RoleTag};

/// Records and recovered emails for one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCount {
    pub records: u64,
    pub with_email: u64,
}

/// Diagnostic counters, returned with each page's records and merged by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub roles: BTreeMap<RoleTag, RoleCount>,
    /// Entries dropped because their label matched an `exclude` rule.
    pub excluded: u64,
    /// Entries dropped because their label matched no rule at all.
    pub unrecognized: u64,
    /// Recovered addresses discarded as implausible (the record was kept).
    pub emails_dropped: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_record(&mut self, record: &Record) {
        let entry = self.roles.entry(record.title).or_default();
        entry.records += 1;
        if record.email.is_some() {
            entry.with_email += 1;
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        for (tag, count) in &other.roles {
            let entry = self.roles.entry(*tag).or_default();
            entry.records += count.records;
            entry.with_email += count.with_email;
        }
        self.excluded += other.excluded;
        self.unrecognized += other.unrecognized;
        self.emails_dropped += other.emails_dropped;
    }

    pub fn total_records(&self) -> u64 {
        self.roles.values().map(|c| c.records).sum()
    }

    pub fn total_with_email(&self) -> u64 {
        self.roles.values().map(|c| c.with_email).sum()
    }

    pub fn get(&self, tag: RoleTag) -> RoleCount {
        self.roles.get(&tag).copied().unwrap_or_default()
    }
}
