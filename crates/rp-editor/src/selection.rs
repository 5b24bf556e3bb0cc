//! Selection state machine.
//!
//! The single authority over what a click means. Every change to the
//! selection (and to the graph's `removed` flags) goes through
//! [`SelectionMachine::apply`], which implements this table:
//!
//! | From | Event | Guard | To |
//! |------|-------|-------|----|
//! | ChoosingStart | vertex | — | ChoosingStart (start = v) |
//! | ChoosingStart | confirm | start set | ChoosingGoal |
//! | ChoosingGoal | vertex | v ≠ start | ChoosingGoal (goal = v) |
//! | ChoosingGoal | confirm | goal set | ChoosingRemovedEdges |
//! | ChoosingGoal | back | — | ChoosingStart (start, goal cleared) |
//! | ChoosingRemovedEdges | marker | — | ChoosingRemovedEdges (toggle) |
//! | ChoosingRemovedEdges | confirm | — | AwaitingRoutes (query sent) |
//! | ChoosingRemovedEdges | back | — | ChoosingGoal (goal cleared) |
//! | AwaitingRoutes | error / timeout / cancel / send failure | active ticket | ChoosingRemovedEdges |
//! | AwaitingRoutes | one candidate | active ticket | Confirmed (auto-selected) |
//! | AwaitingRoutes | several candidates | active ticket | DisambiguatingCandidates |
//! | DisambiguatingCandidates | pick | index valid | DisambiguatingCandidates |
//! | DisambiguatingCandidates | confirm | pick made | Confirmed |
//! | DisambiguatingCandidates | back | — | ChoosingRemovedEdges |
//! | any | reset | — | ChoosingStart (everything cleared) |
//!
//! Rejected actions return a [`SelectionError`] and leave the state
//! untouched. Transitions return [`Effect`]s for the caller to carry out;
//! the machine itself never touches the network.

use rp_core::{
    CandidateRoute, EdgeKey, GraphModel, InboundMessage, Query, SelectionError, SelectionStage,
    ServiceError, VertexId,
};
use serde_json::Value;
use std::fmt;

/// Identity of one submitted query.
///
/// The wire protocol has no correlation id; tickets exist client-side only
/// and are matched to responses by arrival order (see `connector`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryTicket(u64);

impl QueryTicket {
    pub fn new(serial: u64) -> Self {
        Self(serial)
    }
}

impl fmt::Display for QueryTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    VertexClicked(VertexId),
    EdgeMarkerClicked(EdgeKey),
    /// By line proximity or by control; both modalities send this.
    CandidatePicked(usize),
    Confirm,
    Back,
    /// Abandon the in-flight query.
    Cancel,
    TimedOut,
    /// The query could not be sent, or the connection dropped before
    /// the answer arrived.
    QueryFailed(String),
    /// A decoded service frame, tagged with the ticket it answers
    /// (`None` if nothing was outstanding).
    Response {
        ticket: Option<QueryTicket>,
        message: InboundMessage,
    },
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendQuery { ticket: QueryTicket, query: Query },
    SendConfirmation(CandidateRoute),
    Notify(Notice),
}

pub struct SelectionMachine {
    graph: GraphModel,
    stage: SelectionStage,
    start: Option<VertexId>,
    goal: Option<VertexId>,
    query: Option<Query>,
    candidates: Vec<CandidateRoute>,
    candidate_edges: Vec<Value>,
    selected_candidate: Option<usize>,
    selected_route: Option<CandidateRoute>,
    active_ticket: Option<QueryTicket>,
    issued_tickets: u64,
}

impl SelectionMachine {
    pub fn new(graph: GraphModel) -> Self {
        Self {
            graph,
            stage: SelectionStage::ChoosingStart,
            start: None,
            goal: None,
            query: None,
            candidates: Vec::new(),
            candidate_edges: Vec::new(),
            selected_candidate: None,
            selected_route: None,
            active_ticket: None,
            issued_tickets: 0,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn stage(&self) -> SelectionStage {
        self.stage
    }

    pub fn start(&self) -> Option<VertexId> {
        self.start
    }

    pub fn goal(&self) -> Option<VertexId> {
        self.goal
    }

    /// The query in flight or being disambiguated.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn candidates(&self) -> &[CandidateRoute] {
        &self.candidates
    }

    /// Per-candidate metadata from the service, untouched.
    pub fn candidate_edges(&self) -> &[Value] {
        &self.candidate_edges
    }

    pub fn selected_candidate(&self) -> Option<usize> {
        self.selected_candidate
    }

    /// The confirmed route of this cycle.
    pub fn selected_route(&self) -> Option<&CandidateRoute> {
        self.selected_route.as_ref()
    }

    pub fn active_ticket(&self) -> Option<QueryTicket> {
        self.active_ticket
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Apply one event. On `Err` nothing has changed.
    pub fn apply(&mut self, event: SelectionEvent) -> Result<Vec<Effect>, SelectionError> {
        let before = self.stage;
        let result = self.transition(event);
        match &result {
            Ok(_) if self.stage != before => {
                log::debug!("selection: {before:?} → {:?}", self.stage);
            }
            Ok(_) => {}
            Err(e) => log::info!("selection rejected in {before:?}: {e}"),
        }
        result
    }

    fn transition(&mut self, event: SelectionEvent) -> Result<Vec<Effect>, SelectionError> {
        use SelectionEvent as E;
        use SelectionStage as S;

        match (self.stage, event) {
            (_, E::Reset) => {
                self.reset();
                Ok(vec![Effect::Notify(Notice::info("selection reset"))])
            }

            // ── Start ──
            (S::ChoosingStart, E::VertexClicked(id)) => {
                self.require_vertex(id)?;
                self.start = Some(id);
                Ok(vec![Effect::Notify(Notice::info(format!("{id} set as start")))])
            }
            (S::ChoosingStart, E::Confirm) => {
                if self.start.is_none() {
                    return Err(SelectionError::NoStartChosen);
                }
                self.stage = S::ChoosingGoal;
                Ok(Vec::new())
            }
            (S::ChoosingStart, E::Back) => Err(SelectionError::NothingToUndo),

            // ── Goal ──
            (S::ChoosingGoal, E::VertexClicked(id)) => {
                self.require_vertex(id)?;
                if Some(id) == self.start {
                    return Err(SelectionError::GoalEqualsStart(id.to_string()));
                }
                self.goal = Some(id);
                Ok(vec![Effect::Notify(Notice::info(format!("{id} set as goal")))])
            }
            (S::ChoosingGoal, E::Confirm) => {
                if self.goal.is_none() {
                    return Err(SelectionError::NoGoalChosen);
                }
                self.stage = S::ChoosingRemovedEdges;
                Ok(Vec::new())
            }
            (S::ChoosingGoal, E::Back) => {
                self.start = None;
                self.goal = None;
                self.stage = S::ChoosingStart;
                Ok(Vec::new())
            }

            // ── Edge removal ──
            (S::ChoosingRemovedEdges, E::EdgeMarkerClicked(key)) => {
                let removed = self
                    .graph
                    .toggle_removed(key)
                    .ok_or_else(|| SelectionError::UnknownEdge(key.label()))?;
                log::debug!("edge {key} removed = {removed}");
                Ok(Vec::new())
            }
            (S::ChoosingRemovedEdges, E::Confirm) => self.submit(),
            (S::ChoosingRemovedEdges, E::Back) => {
                // Removal flags stay as they are.
                self.goal = None;
                self.stage = S::ChoosingGoal;
                Ok(Vec::new())
            }

            // ── Awaiting the service ──
            (S::AwaitingRoutes, E::Response { ticket, message })
                if ticket.is_some() && ticket == self.active_ticket =>
            {
                self.receive(message)
            }
            (_, E::Response { ticket, .. }) => {
                log::warn!(
                    "dropping stale route response (ticket {ticket:?}, active {:?})",
                    self.active_ticket
                );
                Ok(Vec::new())
            }
            (S::AwaitingRoutes, E::TimedOut) => {
                self.rewind_to_edges();
                Ok(vec![Effect::Notify(Notice::warning(
                    "route service did not answer in time; adjust and retry",
                ))])
            }
            (S::AwaitingRoutes, E::Cancel) => {
                self.rewind_to_edges();
                Ok(vec![Effect::Notify(Notice::info("query cancelled"))])
            }
            (S::AwaitingRoutes, E::QueryFailed(reason)) => {
                self.rewind_to_edges();
                Ok(vec![Effect::Notify(Notice::error(format!(
                    "query abandoned: {reason}"
                )))])
            }
            (S::AwaitingRoutes, E::Back | E::Confirm) => Err(SelectionError::QueryInFlight),
            (_, E::TimedOut | E::QueryFailed(_)) => Ok(Vec::new()),

            // ── Disambiguation ──
            (S::DisambiguatingCandidates, E::CandidatePicked(index)) => {
                if index >= self.candidates.len() {
                    return Err(SelectionError::CandidateOutOfRange {
                        index,
                        count: self.candidates.len(),
                    });
                }
                self.selected_candidate = Some(index);
                Ok(Vec::new())
            }
            (S::DisambiguatingCandidates, E::Confirm) => {
                let index = self
                    .selected_candidate
                    .ok_or(SelectionError::NoCandidateChosen)?;
                Ok(self.confirm_candidate(index))
            }
            (S::DisambiguatingCandidates, E::Back) => {
                self.rewind_to_edges();
                Ok(Vec::new())
            }

            // Clicks that mean nothing in this stage are ignored.
            (_, E::VertexClicked(_) | E::EdgeMarkerClicked(_)) => Ok(Vec::new()),

            (S::Confirmed, _) => Err(SelectionError::CycleComplete),
            (stage, _) => Err(SelectionError::Unavailable(stage)),
        }
    }

    fn require_vertex(&self, id: VertexId) -> Result<(), SelectionError> {
        match self.graph.vertex(id) {
            Some(_) => Ok(()),
            None => Err(SelectionError::UnknownVertex(id.to_string())),
        }
    }

    fn submit(&mut self) -> Result<Vec<Effect>, SelectionError> {
        let start = self.start.ok_or(SelectionError::NoStartChosen)?;
        let goal = self.goal.ok_or(SelectionError::NoGoalChosen)?;
        let query = Query {
            start,
            goal,
            removed_edges: self.graph.removed_edges(),
        };
        self.issued_tickets += 1;
        let ticket = QueryTicket::new(self.issued_tickets);
        self.active_ticket = Some(ticket);
        self.query = Some(query.clone());
        self.stage = SelectionStage::AwaitingRoutes;
        log::info!(
            "submitting {ticket}: {start} → {goal}, {} edge(s) removed",
            query.removed_edges.len()
        );
        Ok(vec![Effect::SendQuery { ticket, query }])
    }

    fn receive(&mut self, message: InboundMessage) -> Result<Vec<Effect>, SelectionError> {
        self.active_ticket = None;
        let (routes, edges) = match message {
            InboundMessage::Error(reason) => {
                self.rewind_to_edges();
                return Ok(vec![Effect::Notify(Notice::error(
                    ServiceError(reason).to_string(),
                ))]);
            }
            InboundMessage::Route(route) => (vec![route], Vec::new()),
            InboundMessage::Candidates { routes, edges } => (routes, edges),
        };

        self.candidates = routes;
        self.candidate_edges = edges;
        self.selected_candidate = None;

        match self.candidates.len() {
            0 => {
                self.rewind_to_edges();
                Ok(vec![Effect::Notify(Notice::error(
                    "route service returned no routes",
                ))])
            }
            1 => Ok(self.confirm_candidate(0)),
            n => {
                self.stage = SelectionStage::DisambiguatingCandidates;
                Ok(vec![Effect::Notify(Notice::info(format!(
                    "{n} candidate routes; pick one"
                )))])
            }
        }
    }

    fn confirm_candidate(&mut self, index: usize) -> Vec<Effect> {
        let route = self.candidates[index].clone();
        self.selected_candidate = Some(index);
        self.selected_route = Some(route.clone());
        self.stage = SelectionStage::Confirmed;
        let notice = Notice::info(format!("route confirmed: {route}"));
        vec![Effect::SendConfirmation(route), Effect::Notify(notice)]
    }

    fn rewind_to_edges(&mut self) {
        self.stage = SelectionStage::ChoosingRemovedEdges;
        self.query = None;
        self.active_ticket = None;
        self.candidates.clear();
        self.candidate_edges.clear();
        self.selected_candidate = None;
    }

    fn reset(&mut self) {
        self.rewind_to_edges();
        self.graph.clear_removed();
        self.start = None;
        self.goal = None;
        self.selected_route = None;
        self.stage = SelectionStage::ChoosingStart;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(label: &str) -> VertexId {
        VertexId::intern(label)
    }

    fn edge(label: &str) -> EdgeKey {
        EdgeKey::parse(label).unwrap()
    }

    fn machine() -> SelectionMachine {
        SelectionMachine::new(GraphModel::reference())
    }

    /// Drive a fresh machine to `ChoosingRemovedEdges` with start/goal set.
    fn at_edges(start: &str, goal: &str) -> SelectionMachine {
        let mut m = machine();
        m.apply(SelectionEvent::VertexClicked(v(start))).unwrap();
        m.apply(SelectionEvent::Confirm).unwrap();
        m.apply(SelectionEvent::VertexClicked(v(goal))).unwrap();
        m.apply(SelectionEvent::Confirm).unwrap();
        m
    }

    fn submit(m: &mut SelectionMachine) -> QueryTicket {
        match m.apply(SelectionEvent::Confirm).unwrap().as_slice() {
            [Effect::SendQuery { ticket, .. }] => *ticket,
            other => panic!("expected SendQuery, got {other:?}"),
        }
    }

    fn respond(m: &mut SelectionMachine, ticket: QueryTicket, frame: &str) -> Vec<Effect> {
        let message = InboundMessage::decode(frame).unwrap();
        m.apply(SelectionEvent::Response {
            ticket: Some(ticket),
            message,
        })
        .unwrap()
    }

    #[test]
    fn start_is_repickable_until_confirmed() {
        let mut m = machine();
        m.apply(SelectionEvent::VertexClicked(v("v0"))).unwrap();
        m.apply(SelectionEvent::VertexClicked(v("v4"))).unwrap();
        assert_eq!(m.start(), Some(v("v4")));
        assert_eq!(m.stage(), SelectionStage::ChoosingStart);
        m.apply(SelectionEvent::Confirm).unwrap();
        assert_eq!(m.stage(), SelectionStage::ChoosingGoal);
        // Start is locked now: vertex clicks set the goal.
        m.apply(SelectionEvent::VertexClicked(v("v9"))).unwrap();
        assert_eq!(m.start(), Some(v("v4")));
        assert_eq!(m.goal(), Some(v("v9")));
    }

    #[test]
    fn confirm_without_start_is_rejected() {
        let mut m = machine();
        assert_eq!(
            m.apply(SelectionEvent::Confirm),
            Err(SelectionError::NoStartChosen)
        );
        assert_eq!(m.stage(), SelectionStage::ChoosingStart);
    }

    #[test]
    fn goal_equal_to_start_is_rejected() {
        let mut m = machine();
        m.apply(SelectionEvent::VertexClicked(v("v0"))).unwrap();
        m.apply(SelectionEvent::Confirm).unwrap();
        m.apply(SelectionEvent::VertexClicked(v("v3"))).unwrap();
        assert_eq!(
            m.apply(SelectionEvent::VertexClicked(v("v0"))),
            Err(SelectionError::GoalEqualsStart("v0".into()))
        );
        assert_eq!(m.goal(), Some(v("v3")));
        assert_eq!(m.stage(), SelectionStage::ChoosingGoal);
    }

    #[test]
    fn confirm_without_goal_is_rejected() {
        let mut m = machine();
        m.apply(SelectionEvent::VertexClicked(v("v0"))).unwrap();
        m.apply(SelectionEvent::Confirm).unwrap();
        assert_eq!(
            m.apply(SelectionEvent::Confirm),
            Err(SelectionError::NoGoalChosen)
        );
    }

    #[test]
    fn unknown_vertex_is_rejected() {
        let mut m = machine();
        assert_eq!(
            m.apply(SelectionEvent::VertexClicked(v("not_on_grid"))),
            Err(SelectionError::UnknownVertex("not_on_grid".into()))
        );
        assert_eq!(m.start(), None);
    }

    #[test]
    fn edge_toggle_pair_is_idempotent() {
        let mut m = at_edges("v0", "v9");
        let key = edge("v1-v6");
        m.apply(SelectionEvent::EdgeMarkerClicked(key)).unwrap();
        assert!(m.graph().edge(v("v1"), v("v6")).unwrap().removed);
        m.apply(SelectionEvent::EdgeMarkerClicked(key)).unwrap();
        assert!(!m.graph().edge(v("v1"), v("v6")).unwrap().removed);
    }

    #[test]
    fn markers_are_ignored_outside_edge_stage() {
        let mut m = machine();
        m.apply(SelectionEvent::EdgeMarkerClicked(edge("v1-v6")))
            .unwrap();
        assert!(m.graph().removed_edges().is_empty());
    }

    #[test]
    fn submit_builds_query_from_removed_flags() {
        let mut m = at_edges("v0", "v9");
        m.apply(SelectionEvent::EdgeMarkerClicked(edge("v6-v1")))
            .unwrap();
        let effects = m.apply(SelectionEvent::Confirm).unwrap();
        assert_eq!(m.stage(), SelectionStage::AwaitingRoutes);
        match effects.as_slice() {
            [Effect::SendQuery { query, ticket }] => {
                assert_eq!(query.start, v("v0"));
                assert_eq!(query.goal, v("v9"));
                assert_eq!(query.removed_edges, vec![edge("v1-v6")]);
                assert_eq!(m.active_ticket(), Some(*ticket));
            }
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn empty_removal_set_may_be_submitted() {
        let mut m = at_edges("v2", "v3");
        submit(&mut m);
        assert!(m.query().unwrap().removed_edges.is_empty());
    }

    #[test]
    fn single_candidate_auto_confirms() {
        let mut m = at_edges("v0", "v4");
        let t = submit(&mut m);
        let effects = respond(&mut m, t, r#"{"candidate_paths":[["v0","v1","v2","v3","v4"]]}"#);
        assert_eq!(m.stage(), SelectionStage::Confirmed);
        assert_eq!(m.selected_candidate(), Some(0));
        let expected = CandidateRoute::from_labels(&["v0", "v1", "v2", "v3", "v4"]);
        assert_eq!(m.selected_route(), Some(&expected));
        assert_eq!(effects[0], Effect::SendConfirmation(expected));
    }

    #[test]
    fn legacy_path_auto_confirms() {
        let mut m = at_edges("v4", "v9");
        let t = submit(&mut m);
        respond(&mut m, t, r#"{"path":["v4","v9"]}"#);
        assert_eq!(m.stage(), SelectionStage::Confirmed);
    }

    #[test]
    fn several_candidates_need_a_pick() {
        let mut m = at_edges("v0", "v9");
        let t = submit(&mut m);
        respond(
            &mut m,
            t,
            r#"{"candidate_paths":[["v0","v1","v2","v3","v4","v9"],["v0","v5","v6","v7","v8","v9"]]}"#,
        );
        assert_eq!(m.stage(), SelectionStage::DisambiguatingCandidates);
        assert_eq!(m.selected_candidate(), None);
        assert_eq!(
            m.apply(SelectionEvent::Confirm),
            Err(SelectionError::NoCandidateChosen)
        );
        assert_eq!(
            m.apply(SelectionEvent::CandidatePicked(2)),
            Err(SelectionError::CandidateOutOfRange { index: 2, count: 2 })
        );
        m.apply(SelectionEvent::CandidatePicked(0)).unwrap();
        m.apply(SelectionEvent::CandidatePicked(1)).unwrap();
        let effects = m.apply(SelectionEvent::Confirm).unwrap();
        assert_eq!(m.stage(), SelectionStage::Confirmed);
        assert_eq!(
            effects[0],
            Effect::SendConfirmation(CandidateRoute::from_labels(&[
                "v0", "v5", "v6", "v7", "v8", "v9"
            ]))
        );
    }

    #[test]
    fn service_error_rewinds_to_edge_removal() {
        let mut m = at_edges("v0", "v9");
        m.apply(SelectionEvent::EdgeMarkerClicked(edge("v4-v9")))
            .unwrap();
        let t = submit(&mut m);
        let effects = respond(&mut m, t, r#"{"error":"Path not found"}"#);
        assert_eq!(m.stage(), SelectionStage::ChoosingRemovedEdges);
        assert_eq!(m.query(), None);
        // Selections survive for the retry.
        assert_eq!(m.goal(), Some(v("v9")));
        assert_eq!(m.graph().removed_edges(), vec![edge("v4-v9")]);
        assert!(matches!(
            &effects[0],
            Effect::Notify(Notice { level: NoticeLevel::Error, .. })
        ));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut m = at_edges("v0", "v9");
        let first = submit(&mut m);
        m.apply(SelectionEvent::TimedOut).unwrap();
        let second = submit(&mut m);
        assert_ne!(first, second);

        let effects = respond(&mut m, first, r#"{"path":["v0","v5"]}"#);
        assert!(effects.is_empty());
        assert_eq!(m.stage(), SelectionStage::AwaitingRoutes);

        respond(&mut m, second, r#"{"path":["v0","v1"]}"#);
        assert_eq!(m.stage(), SelectionStage::Confirmed);
    }

    #[test]
    fn response_without_ticket_is_dropped() {
        let mut m = at_edges("v0", "v9");
        submit(&mut m);
        let message = InboundMessage::decode(r#"{"path":["v0","v1"]}"#).unwrap();
        m.apply(SelectionEvent::Response {
            ticket: None,
            message,
        })
        .unwrap();
        assert_eq!(m.stage(), SelectionStage::AwaitingRoutes);
    }

    #[test]
    fn back_during_edges_keeps_start_and_flags() {
        let mut m = at_edges("v0", "v9");
        m.apply(SelectionEvent::EdgeMarkerClicked(edge("v1-v6")))
            .unwrap();
        m.apply(SelectionEvent::Back).unwrap();
        assert_eq!(m.stage(), SelectionStage::ChoosingGoal);
        assert_eq!(m.goal(), None);
        assert_eq!(m.start(), Some(v("v0")));
        assert_eq!(m.graph().removed_edges(), vec![edge("v1-v6")]);
    }

    #[test]
    fn back_during_goal_clears_start() {
        let mut m = machine();
        m.apply(SelectionEvent::VertexClicked(v("v0"))).unwrap();
        m.apply(SelectionEvent::Confirm).unwrap();
        m.apply(SelectionEvent::Back).unwrap();
        assert_eq!(m.stage(), SelectionStage::ChoosingStart);
        assert_eq!(m.start(), None);
        assert_eq!(m.apply(SelectionEvent::Back), Err(SelectionError::NothingToUndo));
    }

    #[test]
    fn back_during_disambiguation_discards_candidates() {
        let mut m = at_edges("v0", "v9");
        let t = submit(&mut m);
        respond(
            &mut m,
            t,
            r#"{"candidate_paths":[["v0","v1","v2","v3","v4","v9"],["v0","v5","v6","v7","v8","v9"]]}"#,
        );
        m.apply(SelectionEvent::CandidatePicked(1)).unwrap();
        m.apply(SelectionEvent::Back).unwrap();
        assert_eq!(m.stage(), SelectionStage::ChoosingRemovedEdges);
        assert!(m.candidates().is_empty());
        assert_eq!(m.selected_candidate(), None);
        assert_eq!(m.goal(), Some(v("v9")));
    }

    #[test]
    fn back_and_confirm_rejected_while_awaiting() {
        let mut m = at_edges("v0", "v9");
        submit(&mut m);
        assert_eq!(m.apply(SelectionEvent::Back), Err(SelectionError::QueryInFlight));
        assert_eq!(m.apply(SelectionEvent::Confirm), Err(SelectionError::QueryInFlight));
        m.apply(SelectionEvent::Cancel).unwrap();
        assert_eq!(m.stage(), SelectionStage::ChoosingRemovedEdges);
        assert_eq!(m.active_ticket(), None);
    }

    #[test]
    fn confirmed_is_terminal_until_reset() {
        let mut m = at_edges("v4", "v9");
        m.apply(SelectionEvent::EdgeMarkerClicked(edge("v3-v4")))
            .unwrap();
        let t = submit(&mut m);
        respond(&mut m, t, r#"{"path":["v4","v9"]}"#);
        assert_eq!(m.apply(SelectionEvent::Back), Err(SelectionError::CycleComplete));
        assert_eq!(m.apply(SelectionEvent::Confirm), Err(SelectionError::CycleComplete));
        assert_eq!(
            m.apply(SelectionEvent::CandidatePicked(0)),
            Err(SelectionError::CycleComplete)
        );

        m.apply(SelectionEvent::Reset).unwrap();
        assert_eq!(m.stage(), SelectionStage::ChoosingStart);
        assert_eq!(m.start(), None);
        assert_eq!(m.selected_route(), None);
        assert!(m.graph().removed_edges().is_empty());
    }

    #[test]
    fn picks_outside_disambiguation_are_unavailable() {
        let mut m = machine();
        assert_eq!(
            m.apply(SelectionEvent::CandidatePicked(0)),
            Err(SelectionError::Unavailable(SelectionStage::ChoosingStart))
        );
        assert_eq!(
            m.apply(SelectionEvent::Cancel),
            Err(SelectionError::Unavailable(SelectionStage::ChoosingStart))
        );
    }
}
