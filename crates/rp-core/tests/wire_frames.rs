//! Integration tests: reference grid → query frame → response decoding.

use pretty_assertions::assert_eq;
use rp_core::protocol::{encode_confirmation, encode_query};
use rp_core::{EdgeKey, GraphModel, InboundMessage, ProtocolError, Query, VertexId};

#[test]
fn every_edge_label_round_trips_through_the_graph() {
    let g = GraphModel::reference();
    for edge in g.edges() {
        let label = edge.key.label();
        let parsed = EdgeKey::parse(&label).expect("label parses");
        assert_eq!(parsed, edge.key);
        assert!(g.edge(parsed.b(), parsed.a()).is_some(), "{label} reversed");
    }
}

#[test]
fn removed_edges_are_sent_in_declaration_order() {
    let mut g = GraphModel::reference();
    for label in ["v16-v17", "v6-v1", "v9-v4"] {
        let key = EdgeKey::parse(label).unwrap();
        assert_eq!(g.toggle_removed(key), Some(true));
    }

    let query = Query {
        start: VertexId::intern("v0"),
        goal: VertexId::intern("v17"),
        removed_edges: g.removed_edges(),
    };
    assert_eq!(
        encode_query(&query).unwrap(),
        r#"{"start":"v0","goal":"v17","remove_edges":["v1-v6","v4-v9","v16-v17"]}"#
    );
}

#[test]
fn decoded_routes_confirm_verbatim() {
    let frame = r#"{"candidate_paths":[["v0","v5","v14","v15"],["v0","v1","v6","v10","v15"]],"candidate_edges":[["v0-v5"],["v0-v1"]]}"#;
    let message = InboundMessage::decode(frame).unwrap();
    let routes = message.routes();
    assert_eq!(routes.len(), 2);

    let g = GraphModel::reference();
    for route in routes {
        assert!(route.vertices().iter().all(|v| g.vertex(*v).is_some()));
    }
    assert_eq!(
        encode_confirmation(&routes[1]).unwrap(),
        r#"{"selected_path":["v0","v1","v6","v10","v15"]}"#
    );
}

#[test]
fn error_wins_over_routes() {
    let frame = r#"{"error":"Path not found","path":["v0","v1"]}"#;
    let message = InboundMessage::decode(frame).unwrap();
    assert_eq!(message, InboundMessage::Error("Path not found".into()));
    assert_eq!(
        InboundMessage::decode(r#"{"path":["v0"]}"#),
        Err(ProtocolError::RouteTooShort { index: 0, len: 1 })
    );
}
