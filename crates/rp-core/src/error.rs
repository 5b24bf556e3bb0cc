//! Error taxonomy.
//!
//! | Type | Raised by | Recovery |
//! |------|-----------|----------|
//! | [`GraphError`] | graph construction | fatal for the built-in grid |
//! | [`ProtocolError`] | inbound/outbound frame codec | frame dropped, connection kept |
//! | [`ServiceError`] | service `error` frames | rewind to edge removal, retry |
//! | [`SelectionError`] | guard failures in the selection machine | notice only, no state change |
//! | [`TransportError`] | connection closed or unusable | visible indicator, send refused |
//! | [`ConfigError`] | client config loading | caller falls back to defaults |

use crate::model::SelectionStage;
use std::fmt;

/// Static graph declaration is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateVertex(String),
    UnknownVertex { edge: String, label: String },
    DuplicateEdge(String),
    SelfLoop(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateVertex(label) => write!(f, "vertex `{label}` declared twice"),
            GraphError::UnknownVertex { edge, label } => {
                write!(f, "edge `{edge}` references undeclared vertex `{label}`")
            }
            GraphError::DuplicateEdge(edge) => write!(f, "edge `{edge}` declared twice"),
            GraphError::SelfLoop(edge) => write!(f, "edge `{edge}` connects a vertex to itself"),
        }
    }
}

impl std::error::Error for GraphError {}

/// A frame could not be decoded or encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not valid JSON, or JSON of the wrong shape.
    Malformed(String),
    /// A JSON object with none of the recognised keys.
    UnrecognisedFrame,
    /// `candidate_paths` present but empty.
    NoCandidates,
    /// A route with fewer than two labels.
    RouteTooShort { index: usize, len: usize },
    Encode(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(reason) => write!(f, "malformed frame: {reason}"),
            ProtocolError::UnrecognisedFrame => {
                f.write_str("frame has none of `error`, `path`, `candidate_paths`")
            }
            ProtocolError::NoCandidates => f.write_str("`candidate_paths` is empty"),
            ProtocolError::RouteTooShort { index, len } => {
                write!(f, "candidate route {index} has {len} label(s), need at least 2")
            }
            ProtocolError::Encode(reason) => write!(f, "could not encode frame: {reason}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// The path-computation service answered with an `error` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError(pub String);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route service error: {}", self.0)
    }
}

impl std::error::Error for ServiceError {}

/// A user action was rejected by a selection guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    NoStartChosen,
    NoGoalChosen,
    GoalEqualsStart(String),
    NoCandidateChosen,
    CandidateOutOfRange { index: usize, count: usize },
    NothingToUndo,
    QueryInFlight,
    CycleComplete,
    UnknownVertex(String),
    UnknownEdge(String),
    /// The action has no meaning in the current stage.
    Unavailable(SelectionStage),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NoStartChosen => f.write_str("pick a start vertex first"),
            SelectionError::NoGoalChosen => f.write_str("pick a goal vertex first"),
            SelectionError::GoalEqualsStart(label) => {
                write!(f, "`{label}` is already the start; pick a different goal")
            }
            SelectionError::NoCandidateChosen => {
                f.write_str("pick one of the candidate routes first")
            }
            SelectionError::CandidateOutOfRange { index, count } => {
                write!(f, "candidate {} does not exist ({count} available)", index + 1)
            }
            SelectionError::NothingToUndo => f.write_str("already at the first step"),
            SelectionError::QueryInFlight => {
                f.write_str("waiting for the route service; cancel the query to go back")
            }
            SelectionError::CycleComplete => {
                f.write_str("route already confirmed; reset to start over")
            }
            SelectionError::UnknownVertex(label) => write!(f, "no vertex named `{label}`"),
            SelectionError::UnknownEdge(label) => write!(f, "no edge `{label}` in this graph"),
            SelectionError::Unavailable(stage) => write!(f, "not available while {stage}"),
        }
    }
}

impl std::error::Error for SelectionError {}

/// The connection to the route service is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    NotConnected,
    Closed,
    Send(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotConnected => f.write_str("not connected to the route service"),
            TransportError::Closed => f.write_str("connection to the route service is closed"),
            TransportError::Send(reason) => write!(f, "send failed: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Client configuration could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    InvalidRadius { field: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(reason) => write!(f, "invalid config: {reason}"),
            ConfigError::InvalidRadius { field, value } => {
                write!(f, "`{field}` must be a positive finite number, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
