//! Training and evaluation pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Running a trainer for a fixed number of episodes
//! - Evaluating a learned table without updating it
//! - Recording observations during training

pub mod observers;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, SharedObserver,
    TracingObserver,
};
pub use training::{TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
