//! Repository port for Q-table persistence.
//!
//! This module defines the trait boundary between the learning engine and the
//! storage layer.

use std::path::Path;

use crate::{Result, q_learning::QTable};

/// Port for persisting and loading Q-tables.
///
/// # Examples
///
/// ```no_run
/// use qmind::ports::QTableRepository;
/// use qmind::q_learning::QTable;
/// use std::path::Path;
///
/// fn checkpoint<R: QTableRepository>(
///     repo: &R,
///     table: &QTable,
///     path: &Path,
/// ) -> qmind::Result<()> {
///     repo.save(table, path)
/// }
/// ```
pub trait QTableRepository {
    /// Save the whole table, replacing whatever was stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The destination cannot be created or written to
    /// - I/O errors occur during writing
    fn save(&self, table: &QTable, path: &Path) -> Result<()>;

    /// Load a table.
    ///
    /// A missing file is not an error: it yields an empty table so a fresh
    /// training session can start from scratch.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored data exists but is malformed or
    /// truncated. No partially parsed table is ever returned.
    fn load(&self, path: &Path) -> Result<QTable>;
}
