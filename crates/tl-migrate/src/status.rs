//! Status report comparing the source with the ledger

use tl_db::LedgerState;

/// One known version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub version: u64,
    pub name: Option<String>,
    pub present_in_source: bool,
    pub applied: bool,
    pub dirty: bool,
}

/// Snapshot of every source version plus the ledger version, in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub ledger: LedgerState,
    pub entries: Vec<StatusEntry>,
}

impl StatusReport {
    /// Build from the ledger and the ordered source versions
    pub fn new(ledger: LedgerState, source: Vec<(u64, Option<String>)>) -> Self {
        let current = ledger.version();
        let mut entries: Vec<StatusEntry> = source
            .into_iter()
            .map(|(version, name)| StatusEntry {
                version,
                name,
                present_in_source: true,
                applied: version <= current,
                dirty: ledger.is_dirty() && version == current,
            })
            .collect();

        if current != 0 && !entries.iter().any(|e| e.version == current) {
            let at = entries.partition_point(|e| e.version < current);
            entries.insert(
                at,
                StatusEntry {
                    version: current,
                    name: None,
                    present_in_source: false,
                    applied: true,
                    dirty: ledger.is_dirty(),
                },
            );
        }

        Self { ledger, entries }
    }

    /// Source versions not yet applied
    pub fn pending(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries
            .iter()
            .filter(|e| e.present_in_source && !e.applied)
    }

    pub fn is_dirty(&self) -> bool {
        self.ledger.is_dirty()
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
