use std::collections::HashMap;
use std::path::Path;

use crate::paths::PathKey;

/// Result of looking a path up in the [`ChangeLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerLookup<'a> {
    /// Nothing happened to this path during the run.
    Miss,
    /// The item at this path was removed.
    Tombstone,
    /// The item moved to the given destination.
    Moved(&'a PathKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedChange {
    pub original: PathKey,
    pub destination: Option<PathKey>,
}

/// Moves and removals observed during a single run.
///
/// Keys are normalized on the way in. A later record for the same original
/// path replaces the earlier one.
#[derive(Debug, Default)]
pub struct ChangeLedger {
    changes: HashMap<PathKey, Option<PathKey>>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_move(&mut self, original: impl AsRef<Path>, destination: impl AsRef<Path>) {
        let original = PathKey::new(original);
        let destination = PathKey::new(destination);
        tracing::debug!("Recorded move: {} -> {}", original, destination);
        self.changes.insert(original, Some(destination));
    }

    /// Record a removal, but only if the path is really gone from disk.
    ///
    /// Returns `true` when a tombstone was written.
    pub fn record_removal(&mut self, original: impl AsRef<Path>) -> bool {
        let original = PathKey::new(original);
        if original.as_path().exists() {
            tracing::debug!("Ignoring removal of {}: file still exists", original);
            return false;
        }

        tracing::debug!("Recorded removal: {}", original);
        self.changes.insert(original, None);
        true
    }

    pub fn lookup(&self, key: &PathKey) -> LedgerLookup<'_> {
        match self.changes.get(key) {
            None => LedgerLookup::Miss,
            Some(None) => LedgerLookup::Tombstone,
            Some(Some(destination)) => LedgerLookup::Moved(destination),
        }
    }

    pub fn changes(&self) -> impl Iterator<Item = TrackedChange> + '_ {
        self.changes
            .iter()
            .map(|(original, destination)| TrackedChange {
                original: original.clone(),
                destination: destination.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_miss() {
        let ledger = ChangeLedger::new();
        assert_eq!(
            ledger.lookup(&PathKey::new("/music/a.mp3")),
            LedgerLookup::Miss
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_record_move_last_write_wins() {
        let mut ledger = ChangeLedger::new();
        ledger.record_move("/music/a.mp3", "/music/b.mp3");
        ledger.record_move("/music/a.mp3", "/music/c.mp3");

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.lookup(&PathKey::new("/music/a.mp3")),
            LedgerLookup::Moved(&PathKey::new("/music/c.mp3"))
        );
    }

    #[test]
    fn test_record_removal_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.mp3");

        let mut ledger = ChangeLedger::new();
        assert!(ledger.record_removal(&gone));
        assert_eq!(ledger.lookup(&PathKey::new(&gone)), LedgerLookup::Tombstone);
    }

    #[test]
    fn test_record_removal_ignored_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.mp3");
        std::fs::write(&present, b"audio").unwrap();

        let mut ledger = ChangeLedger::new();
        assert!(!ledger.record_removal(&present));
        assert_eq!(ledger.lookup(&PathKey::new(&present)), LedgerLookup::Miss);
    }

    #[test]
    fn test_removal_after_move_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.mp3");

        let mut ledger = ChangeLedger::new();
        ledger.record_move(&original, dir.path().join("b.mp3"));
        ledger.record_removal(&original);

        assert_eq!(
            ledger.lookup(&PathKey::new(&original)),
            LedgerLookup::Tombstone
        );
        assert_eq!(ledger.changes().count(), 1);
    }
}
