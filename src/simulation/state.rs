//! Engine lifecycle, status snapshots and step timing.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Lifecycle of the simulation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimState {
    /// No automaton bound
    Idle,
    /// Worker is stepping
    Running,
    /// Worker is parked on the pause gate
    Paused,
    /// Stop requested, worker not yet finished
    Stopping,
    /// Worker finished; `start()` launches a new run
    Stopped,
}

impl Default for SimState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SimState {
    /// A run is in progress, paused or not
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Why the worker loop ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// `stop()` was called
    Stopped,
    /// The step limit for this run was reached
    MaxGenerations,
    /// A row-advance automaton has no rows left
    Exhausted,
    /// A step failed and no error callback was registered
    Failed(String),
    /// The automaton was removed while running
    Unbound,
}

/// Passed to the step callback after every successful step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Generation after the step
    pub generation: u64,
    /// Steps taken since `start()`
    pub steps: u64,
    pub duration: Duration,
}

/// Point-in-time view of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub state: SimState,
    pub running: bool,
    pub paused: bool,
    pub generation: u64,
    pub total_steps: u64,
    pub elapsed_seconds: f64,
    pub fps: f64,
    pub speed_ms: u64,
    pub max_generations: Option<u64>,
}

/// Rolling window of step durations
#[derive(Debug, Clone)]
pub struct StepTimer {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl StepTimer {
    pub const WINDOW: usize = 10;

    pub fn new() -> Self {
        Self::with_capacity(Self::WINDOW)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, duration: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    /// Steps per second from the mean step duration; 0 without samples
    pub fn fps(&self) -> f64 {
        match self.mean() {
            Some(mean) if mean > Duration::ZERO => 1.0 / mean.as_secs_f64(),
            _ => 0.0,
        }
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_keeps_last_ten() {
        let mut timer = StepTimer::new();
        for _ in 0..5 {
            timer.record(Duration::from_millis(100));
        }
        for _ in 0..10 {
            timer.record(Duration::from_millis(10));
        }
        assert_eq!(timer.len(), 10);
        assert_eq!(timer.mean(), Some(Duration::from_millis(10)));
        assert!((timer.fps() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_timer_empty() {
        let timer = StepTimer::new();
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.mean(), None);
    }

    #[test]
    fn test_zero_duration_fps() {
        let mut timer = StepTimer::new();
        timer.record(Duration::ZERO);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn test_state_flags() {
        assert!(SimState::Running.is_active());
        assert!(SimState::Paused.is_active());
        assert!(!SimState::Stopping.is_active());
        assert_eq!(SimState::default(), SimState::Idle);
        assert_eq!(SimState::Paused.to_string(), "paused");
    }
}
