//! Shared argument groups for CLI commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::GridWorld;

/// World selection shared by `train` and `evaluate`
#[derive(Args, Debug, Clone)]
pub struct WorldArgs {
    /// Text map file (`#` wall, `.` floor); overrides width/height
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Width of an open grid
    #[arg(long, default_value_t = 20)]
    pub width: u32,

    /// Height of an open grid
    #[arg(long, default_value_t = 20)]
    pub height: u32,
}

impl WorldArgs {
    pub fn build(&self) -> Result<GridWorld> {
        match &self.map {
            Some(path) => GridWorld::load(path)
                .with_context(|| format!("Failed to load map from {}", path.display())),
            None => {
                GridWorld::open(self.width, self.height).with_context(|| {
                    format!("Invalid grid dimensions {}x{}", self.width, self.height)
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match &self.map {
            Some(path) => path.display().to_string(),
            None => format!("open {}x{}", self.width, self.height),
        }
    }
}
