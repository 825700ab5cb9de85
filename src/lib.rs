//! QMind: tabular Q-learning for grid evasion
//!
//! This crate provides:
//! - A discretized observation of an agent and a chaser on a grid
//! - A lazily growing Q-table with the one-step Q-learning update
//! - An episode-driven trainer and a greedy tester
//! - Delimited-text persistence of learned tables
//! - A training pipeline with pluggable observers and a CLI

pub mod adapters;
pub mod app;
pub mod cli;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use error::{Error, Result};
