//! CLI infrastructure for the qmind toolkit
//!
//! This module provides the command-line interface for training, evaluating
//! and inspecting learned Q-tables.

pub mod commands;
pub mod config;
pub mod output;
