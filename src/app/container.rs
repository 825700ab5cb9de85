//! Dependency injection container for the qmind application.
//!
//! This module provides centralized dependency management following hexagonal
//! architecture principles. The container owns infrastructure dependencies and
//! provides factory methods for creating domain objects.

use std::{path::Path, sync::Arc};

use tracing::debug;

use super::config::TrainerConfig;
use crate::{
    Result,
    adapters::CsvRepository,
    ports::{PathFinder, QTableRepository, World},
    q_learning::{QMindTester, QMindTrainer, QTable},
};

/// Application with dependency injection.
///
/// Centralizes creation and wiring of dependencies following hexagonal architecture.
/// All infrastructure dependencies are owned by the app and injected into
/// domain objects and use cases.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use qmind::adapters::{BfsPathFinder, GridWorld};
/// use qmind::app::{App, TrainerConfig};
///
/// let app = App::new();
///
/// let config = TrainerConfig::default().with_seed(42);
/// let trainer = app.create_trainer(&config, GridWorld::open(20, 20)?, BfsPathFinder)?;
/// # Ok::<(), qmind::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use qmind::app::App;
/// use qmind::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for table persistence
    table_repository: Arc<dyn QTableRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `CsvRepository` writing `;`-separated files
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            table_repository: Arc::new(CsvRepository::new()),
            default_seed: None,
        }
    }

    /// Create an app whose file repository writes with the configured
    /// delimiter.
    pub fn from_config(config: &TrainerConfig) -> Result<Self> {
        Ok(Self {
            table_repository: Arc::new(CsvRepository::with_delimiter(config.storage.delimiter)?),
            default_seed: None,
        })
    }

    /// Create a builder for constructing app with custom dependencies.
    ///
    /// Primarily used for testing with in-memory dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the table repository.
    ///
    /// Returns an Arc-wrapped repository that can be shared across threads.
    pub fn table_repository(&self) -> Arc<dyn QTableRepository + Send + Sync> {
        Arc::clone(&self.table_repository)
    }

    /// Create a trainer with the given configuration.
    ///
    /// The table stored at the configured path is loaded first (a missing
    /// file yields an empty table), and periodic saves go back to the same
    /// path through the app's repository.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or an unreadable table file.
    pub fn create_trainer<W: World, P: PathFinder>(
        &self,
        config: &TrainerConfig,
        world: W,
        path_finder: P,
    ) -> Result<QMindTrainer<W, P>> {
        config.validate()?;

        let path = config.storage.table_path();
        let table = self.table_repository.load(&path)?;
        debug!(path = %path.display(), rows = table.len(), "creating trainer");

        let mut trainer = QMindTrainer::new(config.params, world, path_finder, table)
            .with_rewards(config.rewards)?
            .with_storage(self.table_repository(), path);

        // Apply seed from config or use container default
        if let Some(seed) = config.seed.or(self.default_seed) {
            trainer = trainer.with_seed(seed);
        }

        Ok(trainer)
    }

    /// Create a greedy tester for the table stored at `path`.
    pub fn create_tester<W: World>(&self, world: W, path: &Path) -> Result<QMindTester<W>> {
        Ok(QMindTester::new(world, self.load_table(path)?))
    }

    /// Load a table from persistent storage.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use qmind::app::App;
    /// use std::path::Path;
    ///
    /// let app = App::new();
    /// let table = app.load_table(Path::new("QTable.csv"))?;
    /// println!("{} states", table.len());
    /// # Ok::<(), qmind::Error>(())
    /// ```
    pub fn load_table(&self, path: &Path) -> Result<QTable> {
        self.table_repository.load(path)
    }

    /// Save a table to persistent storage.
    pub fn save_table(&self, table: &QTable, path: &Path) -> Result<()> {
        self.table_repository.save(table, path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
///
/// # Examples
///
/// ```
/// use qmind::app::AppBuilder;
/// use qmind::adapters::InMemoryRepository;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct AppBuilder {
    table_repository: Option<Arc<dyn QTableRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    /// Create a new app builder.
    pub fn new() -> Self {
        Self {
            table_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom table repository.
    pub fn with_repository<R: QTableRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.table_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all trainers created by this container.
    ///
    /// Useful for creating deterministic tests.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `CsvRepository` by default.
    pub fn build(self) -> App {
        App {
            table_repository: self
                .table_repository
                .unwrap_or_else(|| Arc::new(CsvRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
