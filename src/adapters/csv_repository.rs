//! Delimited-text implementation of the Q-table repository.
//!
//! One line per state, no header, 13 fields: the nine state fields followed
//! by the four action values. Saves go through a temporary file that replaces
//! the destination only once it is fully written.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, ErrorKind},
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    Result,
    error::Error,
    ports::QTableRepository,
    q_learning::{
        QTable,
        codec::{ACCEPTED_SEPARATORS, decode_line, encode_entry},
    },
};

/// Default separator written between fields
pub const DEFAULT_DELIMITER: char = ';';

/// File-backed Q-table repository.
///
/// Reading always accepts both `;` and `,` regardless of the configured
/// write delimiter.
///
/// # Examples
///
/// ```no_run
/// use qmind::adapters::CsvRepository;
/// use qmind::ports::QTableRepository;
/// use std::path::Path;
///
/// let repo = CsvRepository::new();
/// let table = repo.load(Path::new("QTable.csv"))?;
/// repo.save(&table, Path::new("QTable.csv"))?;
/// # Ok::<(), qmind::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CsvRepository {
    delimiter: char,
}

impl CsvRepository {
    /// Create a repository writing `;`-separated files.
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Create a repository writing with `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless the delimiter is one the
    /// reader accepts.
    pub fn with_delimiter(delimiter: char) -> Result<Self> {
        if !ACCEPTED_SEPARATORS.contains(&delimiter) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "delimiter '{delimiter}' is not readable back (expected one of {ACCEPTED_SEPARATORS:?})"
                ),
            });
        }
        Ok(Self { delimiter })
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl Default for CsvRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl QTableRepository for CsvRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(|source| Error::Io {
            operation: format!("create directory {dir:?}"),
            source,
        })?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
            operation: format!("create temporary file in {dir:?}"),
            source,
        })?;

        {
            // Delimiters are ASCII, checked at construction.
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter as u8)
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(temp.as_file_mut());

            for (state, values) in table {
                writer.write_record(encode_entry(state, values))?;
            }
            writer.flush().map_err(|source| Error::Io {
                operation: format!("write Q-table to {path:?}"),
                source,
            })?;
        }

        temp.persist(path).map_err(|e| Error::Io {
            operation: format!("replace {path:?}"),
            source: e.error,
        })?;

        info!(path = %path.display(), rows = table.len(), "saved Q-table");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<QTable> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no Q-table on disk, starting empty");
                return Ok(QTable::new());
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("open file {path:?}"),
                    source,
                });
            }
        };

        let mut table = QTable::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| Error::Io {
                operation: format!("read line {} of {path:?}", index + 1),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let (state, values) = decode_line(&line, index + 1)?;
            table.insert(state, values);
        }

        info!(path = %path.display(), rows = table.len(), "loaded Q-table");
        Ok(table)
    }
}
