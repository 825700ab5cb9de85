//! Ports (trait boundaries) for external collaborators.
//!
//! The learning engine owns these traits; the grid, the path-finder, storage
//! and observation are provided by adapters.

pub mod observer;
pub mod path_finder;
pub mod repository;
pub mod world;

pub use observer::Observer;
pub use path_finder::PathFinder;
pub use repository::QTableRepository;
pub use world::World;
