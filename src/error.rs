//! Error types shared by every part of the crate.

use crate::neighborhood::NeighborhoodKind;
use thiserror::Error;

/// Errors produced by automata, rules, the engine and persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// Imported grid has different dimensions than the automaton's grid
    #[error("grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A cell value outside `[0, num_states)`
    #[error("invalid state {state} at ({x}, {y}): automaton has {num_states} states")]
    InvalidState {
        x: usize,
        y: usize,
        state: u8,
        num_states: u8,
    },

    #[error("rule parse error: {0}")]
    RuleParse(String),

    #[error("unsupported neighborhood: {0:?}")]
    UnsupportedNeighborhood(NeighborhoodKind),

    /// A step failed, either by returning an error or by panicking
    #[error("step failed: {0}")]
    StepFailure(String),

    #[error("worker thread did not finish within {0:?}")]
    JoinTimeout(std::time::Duration),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    #[error("unsupported rule type for {variant}: {rule_type}")]
    UnsupportedRuleType { variant: String, rule_type: String },

    #[error("no automaton bound to the simulation engine")]
    NoAutomaton,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid checkpoint: {0}")]
    InvalidCheckpoint(String),

    #[error("checkpoint version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
