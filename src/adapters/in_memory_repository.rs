//! In-memory Q-table repository for testing.
//!
//! This adapter provides a pure in-memory implementation of QTableRepository,
//! enabling fast tests without any file system I/O. Tables are stored in
//! their encoded text form so saves and loads exercise the same codec as the
//! file repository.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    Result,
    ports::QTableRepository,
    q_learning::{
        QTable,
        codec::{decode_line, encode_entry},
    },
};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use qmind::adapters::InMemoryRepository;
/// use qmind::ports::QTableRepository;
/// use qmind::q_learning::QTable;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// repo.save(&QTable::new(), Path::new("QTable.csv"))?;
/// assert_eq!(repo.save_count(), 1);
///
/// let loaded = repo.load(Path::new("QTable.csv"))?;
/// assert!(loaded.is_empty());
/// # Ok::<(), qmind::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Storage>>,
}

#[derive(Default)]
struct Storage {
    files: HashMap<String, String>,
    saves: usize,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, Storage> {
        // A poisoned lock only means another test thread panicked mid-save;
        // the map itself is still usable.
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of distinct paths currently stored.
    pub fn count(&self) -> usize {
        self.storage().files.len()
    }

    /// Number of save calls so far, including overwrites.
    pub fn save_count(&self) -> usize {
        self.storage().saves
    }

    /// Check if a table exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage()
            .files
            .contains_key(path.to_string_lossy().as_ref())
    }

    /// Raw stored text for `path`.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.storage()
            .files
            .get(path.to_string_lossy().as_ref())
            .cloned()
    }

    /// Clear all stored tables and the save counter.
    pub fn clear(&self) {
        let mut storage = self.storage();
        storage.files.clear();
        storage.saves = 0;
    }
}

impl QTableRepository for InMemoryRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        let text: String = table
            .iter()
            .map(|(state, values)| encode_entry(state, values).join(";") + "\n")
            .collect();

        let mut storage = self.storage();
        storage
            .files
            .insert(path.to_string_lossy().into_owned(), text);
        storage.saves += 1;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<QTable> {
        let Some(text) = self.contents(path) else {
            return Ok(QTable::new());
        };

        let mut table = QTable::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (state, values) = decode_line(line, index + 1)?;
            table.insert(state, values);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::{Action, State};

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let mut table = QTable::new();
        table.set_value(State::default(), Action::East, 2.5);

        let path = Path::new("table");

        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&table, path).unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.contains(path));

        let loaded = repo.load(path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_nonexistent_returns_empty_table() {
        let repo = InMemoryRepository::new();
        assert!(repo.load(Path::new("nonexistent")).unwrap().is_empty());
    }

    #[test]
    fn test_clear_removes_all() {
        let repo = InMemoryRepository::new();
        let table = QTable::new();

        repo.save(&table, Path::new("t1")).unwrap();
        repo.save(&table, Path::new("t2")).unwrap();
        assert_eq!(repo.count(), 2);

        repo.clear();
        assert_eq!(repo.count(), 0);
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();

        let mut table = QTable::new();
        table.set_value(State::default(), Action::North, -1.0);
        let path = Path::new("shared");

        repo1.save(&table, path).unwrap();

        assert_eq!(repo2.load(path).unwrap(), table);
        assert_eq!(repo1.count(), 1);
        assert_eq!(repo2.count(), 1);
    }
}
