//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Error, Result,
    ports::Observer,
    q_learning::{EpisodeEnd, EpisodeSummary, RewardKind, StepRecord},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    captures: usize,
    blocked: usize,
    timeouts: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            captures: 0,
            blocked: 0,
            timeouts: 0,
        }
    }

    fn message(&self) -> String {
        format!(
            "{} B:{} T:{}",
            self.captures, self.blocked, self.timeouts
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (C:{msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        match summary.end {
            EpisodeEnd::Captured => self.captures += 1,
            EpisodeEnd::Blocked => self.blocked += 1,
            EpisodeEnd::StepLimit => self.timeouts += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks episode outcomes and returns
#[derive(Debug, Default)]
pub struct MetricsObserver {
    episodes: usize,
    captures: usize,
    blocked: usize,
    timeouts: usize,
    escape_steps: usize,
    episode_lengths: Vec<usize>,
    returns: Vec<f64>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn rate(&self, count: usize) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            count as f64 / self.episodes as f64
        }
    }

    /// Fraction of episodes ending in capture
    pub fn capture_rate(&self) -> f64 {
        self.rate(self.captures)
    }

    /// Fraction of episodes ending on a blocked move
    pub fn blocked_rate(&self) -> f64 {
        self.rate(self.blocked)
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Mean return over the last `window` episodes
    pub fn recent_mean_return(&self, window: usize) -> f64 {
        let start = self.returns.len().saturating_sub(window);
        let recent = &self.returns[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<f64>() / recent.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes,
            captures: self.captures,
            blocked: self.blocked,
            timeouts: self.timeouts,
            escape_steps: self.escape_steps,
            capture_rate: self.capture_rate(),
            blocked_rate: self.blocked_rate(),
            avg_episode_length: self.avg_episode_length(),
            mean_return: self.recent_mean_return(self.returns.len()),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub captures: usize,
    pub blocked: usize,
    pub timeouts: usize,
    pub escape_steps: usize,
    pub capture_rate: f64,
    pub blocked_rate: f64,
    pub avg_episode_length: f64,
    pub mean_return: f64,
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        if record.reward.kind == RewardKind::Escaped {
            self.escape_steps += 1;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes += 1;
        match summary.end {
            EpisodeEnd::Captured => self.captures += 1,
            EpisodeEnd::Blocked => self.blocked += 1,
            EpisodeEnd::StepLimit => self.timeouts += 1,
        }
        self.episode_lengths.push(summary.steps);
        self.returns.push(summary.total_return);
        Ok(())
    }
}

/// Logs a running summary through `tracing` every `interval` episodes
pub struct TracingObserver {
    interval: usize,
    metrics: MetricsObserver,
}

impl TracingObserver {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            metrics: MetricsObserver::new(),
        }
    }
}

impl Observer for TracingObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.metrics.on_step(record)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.metrics.on_episode_end(summary)?;
        if (summary.episode + 1) % self.interval == 0 {
            info!(
                episode = summary.episode,
                capture_rate = self.metrics.capture_rate(),
                mean_return = self.metrics.recent_mean_return(self.interval),
                avg_length = self.metrics.avg_episode_length(),
                "training progress"
            );
        }
        Ok(())
    }
}

/// JSONL observer - Exports one episode summary per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Shares an observer with the caller so it can be read after a run
///
/// # Examples
///
/// ```
/// use qmind::pipeline::{MetricsObserver, SharedObserver};
///
/// let shared = SharedObserver::new(MetricsObserver::new());
/// let boxed = Box::new(shared.clone());
/// // hand `boxed` to a pipeline, keep `shared` for reading
/// # drop(boxed);
/// assert_eq!(shared.with(|metrics| metrics.summary().episodes), 0);
/// ```
pub struct SharedObserver<O> {
    inner: Arc<Mutex<O>>,
}

impl<O> Clone for SharedObserver<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: Observer> SharedObserver<O> {
    pub fn new(observer: O) -> Self {
        Self {
            inner: Arc::new(Mutex::new(observer)),
        }
    }

    /// Run `f` against the wrapped observer
    pub fn with<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, O> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<O: Observer> Observer for SharedObserver<O> {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.lock().on_training_start(total_episodes)
    }

    fn on_episode_start(&mut self, episode: usize) -> Result<()> {
        self.lock().on_episode_start(episode)
    }

    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        self.lock().on_step(record)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.lock().on_episode_end(summary)
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.lock().on_training_end()
    }
}
