//! Application layer with dependency injection container.
//!
//! This module provides the dependency injection infrastructure for the qmind
//! application, following hexagonal architecture principles. The container
//! owns infrastructure dependencies and provides factory methods for creating
//! domain objects.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │          App (DI Container)          │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                       │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - CsvRepository                     │   │
//! │  │  - InMemoryRepository (testing)      │   │
//! │  │  - GridWorld, BfsPathFinder          │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                 │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - QTableRepository, World           │   │
//! │  │  - PathFinder, Observer              │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic (q_learning)           │   │
//! │  │  - QMindTrainer, QMindTester         │   │
//! │  │  - QTable                            │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ## Testing
//!
//! ```
//! use qmind::app::App;
//! use qmind::adapters::InMemoryRepository;
//!
//! let app = App::for_testing()
//!     .with_repository(InMemoryRepository::new())
//!     .with_default_seed(42)
//!     .build();
//! ```

pub mod config;
pub mod container;

pub use config::{DEFAULT_TABLE_FILE, StorageConfig, TrainerConfig};
pub use container::{App, AppBuilder};
