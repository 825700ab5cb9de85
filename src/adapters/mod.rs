//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod bfs_path_finder;
pub mod csv_repository;
pub mod grid_world;
pub mod in_memory_repository;

pub use bfs_path_finder::BfsPathFinder;
pub use csv_repository::CsvRepository;
pub use grid_world::GridWorld;
pub use in_memory_repository::InMemoryRepository;
