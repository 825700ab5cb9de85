//! Observer port - abstraction for training observation
//!
//! This port defines the interface for observing the episode state machine,
//! allowing progress bars, metrics and logging to be composed without
//! coupling the trainer to any output format.

use crate::{
    Result,
    q_learning::{EpisodeSummary, StepRecord},
};

/// Observer trait for monitoring training and inference runs
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once, when a pipeline run begins
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(record)` - For each step
///    - `on_episode_end(summary)`
/// 3. `on_training_end()` - Once, when a pipeline run ends
///
/// Callers that drive the trainer step by step without a pipeline only see
/// the per-episode events.
///
/// # Examples
///
/// ```no_run
/// use qmind::{ports::Observer, q_learning::EpisodeSummary};
///
/// struct CaptureCounter {
///     captures: usize,
/// }
///
/// impl Observer for CaptureCounter {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> qmind::Result<()> {
///         if summary.end.is_capture() {
///             self.captures += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when a multi-episode run starts.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after both entities were placed for a new episode.
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called once per executed step, after the table was updated.
    fn on_step(&mut self, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called when an episode ends, before the next one starts.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when a multi-episode run completes.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
