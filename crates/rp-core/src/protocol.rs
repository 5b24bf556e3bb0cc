//! JSON wire format spoken with the route service.
//!
//! Outbound:
//! - query: `{"start": "v0", "goal": "v9", "remove_edges": ["v1-v6"]}`
//! - confirmation: `{"selected_path": ["v0", "v5", ...]}`
//!
//! Inbound (checked in this order):
//! - `{"error": "..."}`
//! - `{"candidate_paths": [[...], ...], "candidate_edges": [...]}`
//! - `{"path": [...]}` (legacy single route)

use crate::error::ProtocolError;
use crate::model::{CandidateRoute, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
struct QueryFrame<'a> {
    start: &'a str,
    goal: &'a str,
    remove_edges: Vec<String>,
}

#[derive(Serialize)]
struct ConfirmationFrame<'a> {
    selected_path: Vec<&'a str>,
}

#[derive(Deserialize)]
struct RawInbound {
    error: Option<String>,
    path: Option<Vec<String>>,
    candidate_paths: Option<Vec<Vec<String>>>,
    #[serde(default)]
    candidate_edges: Vec<Value>,
}

/// Encode a route query frame.
pub fn encode_query(query: &Query) -> Result<String, ProtocolError> {
    let frame = QueryFrame {
        start: query.start.as_str(),
        goal: query.goal.as_str(),
        remove_edges: query.removed_edges.iter().map(|k| k.label()).collect(),
    };
    serde_json::to_string(&frame).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Encode the final route confirmation frame.
pub fn encode_confirmation(route: &CandidateRoute) -> Result<String, ProtocolError> {
    let frame = ConfirmationFrame {
        selected_path: route.labels(),
    };
    serde_json::to_string(&frame).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// The service could not answer the query.
    Error(String),
    /// Legacy single-route answer.
    Route(CandidateRoute),
    /// One or more candidates in display order, plus the service's
    /// per-candidate edge metadata (passed through untouched).
    Candidates {
        routes: Vec<CandidateRoute>,
        edges: Vec<Value>,
    },
}

impl InboundMessage {
    /// Decode one text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(ProtocolError::Malformed("expected a JSON object".into()));
        }
        let raw: RawInbound =
            serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        if let Some(error) = raw.error {
            return Ok(InboundMessage::Error(error));
        }

        if let Some(paths) = raw.candidate_paths {
            if paths.is_empty() {
                return Err(ProtocolError::NoCandidates);
            }
            let routes = paths
                .iter()
                .enumerate()
                .map(|(index, labels)| route_from_labels(index, labels))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(InboundMessage::Candidates {
                routes,
                edges: raw.candidate_edges,
            });
        }

        if let Some(path) = raw.path {
            return Ok(InboundMessage::Route(route_from_labels(0, &path)?));
        }

        Err(ProtocolError::UnrecognisedFrame)
    }

    /// Candidate routes carried by this message, in display order.
    /// Empty for error frames.
    pub fn routes(&self) -> &[CandidateRoute] {
        match self {
            InboundMessage::Error(_) => &[],
            InboundMessage::Route(route) => std::slice::from_ref(route),
            InboundMessage::Candidates { routes, .. } => routes,
        }
    }
}

fn route_from_labels(index: usize, labels: &[String]) -> Result<CandidateRoute, ProtocolError> {
    if labels.len() < 2 {
        return Err(ProtocolError::RouteTooShort {
            index,
            len: labels.len(),
        });
    }
    Ok(CandidateRoute::from_labels(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::VertexId;
    use crate::model::EdgeKey;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_frame_layout() {
        let query = Query {
            start: VertexId::intern("v0"),
            goal: VertexId::intern("v9"),
            removed_edges: vec![EdgeKey::parse("v1-v6").unwrap()],
        };
        assert_eq!(
            encode_query(&query).unwrap(),
            r#"{"start":"v0","goal":"v9","remove_edges":["v1-v6"]}"#
        );
    }

    #[test]
    fn empty_removal_set_is_an_empty_array() {
        let query = Query {
            start: VertexId::intern("v2"),
            goal: VertexId::intern("v3"),
            removed_edges: Vec::new(),
        };
        assert_eq!(
            encode_query(&query).unwrap(),
            r#"{"start":"v2","goal":"v3","remove_edges":[]}"#
        );
    }

    #[test]
    fn confirmation_frame_layout() {
        let route = CandidateRoute::from_labels(&["v0", "v5", "v6"]);
        assert_eq!(
            encode_confirmation(&route).unwrap(),
            r#"{"selected_path":["v0","v5","v6"]}"#
        );
    }

    #[test]
    fn decode_error_frame() {
        let frame = r#"{"error":"Path not found or path is too short"}"#;
        let msg = InboundMessage::decode(frame).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Error("Path not found or path is too short".into())
        );
        assert!(msg.routes().is_empty());
    }

    #[test]
    fn decode_legacy_path() {
        let msg = InboundMessage::decode(r#"{"path":["v4","v9"]}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Route(CandidateRoute::from_labels(&["v4", "v9"]))
        );
    }

    #[test]
    fn decode_candidates_keeps_order_and_metadata() {
        let msg = InboundMessage::decode(
            r#"{"candidate_paths":[["v0","v1"],["v0","v5","v6","v1"]],"candidate_edges":[[1],[5,10,6]]}"#,
        )
        .unwrap();
        match &msg {
            InboundMessage::Candidates { routes, edges } => {
                assert_eq!(routes.len(), 2);
                assert_eq!(routes[1].labels(), vec!["v0", "v5", "v6", "v1"]);
                assert_eq!(edges.len(), 2);
            }
            other => panic!("expected candidates, got {other:?}"),
        }
    }

    #[test]
    fn candidate_edges_are_optional() {
        let msg = InboundMessage::decode(r#"{"candidate_paths":[["v0","v1"]]}"#).unwrap();
        assert_eq!(msg.routes().len(), 1);
    }

    #[test]
    fn error_wins_over_routes() {
        let msg = InboundMessage::decode(r#"{"error":"boom","path":["v0","v1"]}"#).unwrap();
        assert_eq!(msg, InboundMessage::Error("boom".into()));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            InboundMessage::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            InboundMessage::decode(r#"["v0","v1"]"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            InboundMessage::decode(r#"{"path":"v0"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert_eq!(
            InboundMessage::decode(r#"{"hello":1}"#),
            Err(ProtocolError::UnrecognisedFrame)
        );
        assert_eq!(
            InboundMessage::decode(r#"{"candidate_paths":[]}"#),
            Err(ProtocolError::NoCandidates)
        );
        assert_eq!(
            InboundMessage::decode(r#"{"candidate_paths":[["v0","v1"],["v0"]]}"#),
            Err(ProtocolError::RouteTooShort { index: 1, len: 1 })
        );
    }
}
