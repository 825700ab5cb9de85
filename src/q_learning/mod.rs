//! Tabular Q-learning for grid evasion
//!
//! The agent observes a small discretized [`State`]: which neighbors it can
//! walk into, in which directions the chaser lies, and a coarse distance
//! bucket. A [`QTable`] holds one value per compass [`Action`] for every state
//! seen so far and is trained with the one-step Q-learning rule:
//!
//! ```text
//! Q(s,a) ← lerp(Q(s,a), r + γ max_a' Q(s',a'), α)
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use qmind::{
//!     adapters::{BfsPathFinder, GridWorld},
//!     q_learning::{QMindTrainer, QTable, TrainerParams},
//! };
//!
//! let params = TrainerParams {
//!     alpha: 0.3,
//!     gamma: 0.9,
//!     epsilon: 0.2,
//!     max_steps: 500,
//!     episodes_between_saves: 0,
//! };
//! let mut trainer = QMindTrainer::new(
//!     params,
//!     GridWorld::open(20, 20)?,
//!     BfsPathFinder,
//!     QTable::new(),
//! )
//! .with_seed(42);
//!
//! for _ in 0..10_000 {
//!     trainer.step(true)?;
//! }
//! # Ok::<(), qmind::Error>(())
//! ```

pub mod action;
pub mod codec;
pub mod policy;
pub mod q_table;
pub mod state;
pub mod tester;
pub mod trainer;

// Public re-exports
pub use action::Action;
pub use codec::CsvRecord;
pub use policy::{Reward, RewardKind, RewardPolicy};
pub use q_table::{ActionValues, QTable};
pub use state::{DistanceBucket, State, StateEncoder};
pub use tester::QMindTester;
pub use trainer::{EpisodeEnd, EpisodeSummary, QMindTrainer, StepRecord, TrainerParams};
