//! Simulation control: the threaded engine and its status types.

pub mod engine;
pub mod state;

pub use engine::{CompleteCallback, ErrorCallback, SimulationEngine, StepCallback};
pub use state::{ExitReason, SimState, SimulationStatus, StepEvent, StepTimer};
