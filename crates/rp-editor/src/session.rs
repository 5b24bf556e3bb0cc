//! Session: the interaction controller a host embeds.
//!
//! Wires host events (pointer, keys, connection lifecycle, inbound frames,
//! clock ticks) to the selection machine, carries out the machine's
//! effects through the route connector, and exposes a read-only view for
//! rendering. The host owns the event loop; every method here runs to
//! completion and returns whether a redraw is needed.

use crate::connector::{ConnectionStatus, Delivery, RouteConnector, Transport};
use crate::input::{InputEvent, Modifiers};
use crate::selection::{Effect, Notice, SelectionEvent, SelectionMachine};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use kurbo::Point;
use rp_core::{
    CandidateRoute, ClientConfig, GraphModel, SelectionMode, SelectionStage, TransportError,
};
use rp_render::hit::{
    resolve_edge_marker, resolve_edge_segment, resolve_legend, resolve_vertex,
};
use rp_render::{DisplayList, RenderState, Theme, build_display_list};

pub struct Session<T: Transport> {
    machine: SelectionMachine,
    connector: RouteConnector<T>,
    config: ClientConfig,
    theme: Theme,
    mode: SelectionMode,
    notices: Vec<Notice>,
    /// Host time of the first tick after the current query was sent.
    awaiting_since: Option<u64>,
    /// A confirmed route the connector refused to send.
    unsent_confirmation: Option<CandidateRoute>,
}

impl<T: Transport> Session<T> {
    pub fn new(graph: GraphModel, transport: T, config: ClientConfig) -> Self {
        let connector = RouteConnector::new(transport, config.reconnect)
            .with_confirmation_reply(config.expect_confirmation_reply);
        let mode = config.selection_mode;
        Self {
            machine: SelectionMachine::new(graph),
            connector,
            config,
            theme: Theme::light(),
            mode,
            notices: Vec::new(),
            awaiting_since: None,
            unsent_confirmation: None,
        }
    }

    pub fn machine(&self) -> &SelectionMachine {
        &self.machine
    }

    pub fn stage(&self) -> SelectionStage {
        self.machine.stage()
    }

    pub fn connector(&self) -> &RouteConnector<T> {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut RouteConnector<T> {
        &mut self.connector
    }

    pub fn status(&self) -> &ConnectionStatus {
        self.connector.status()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn unsent_confirmation(&self) -> Option<&CandidateRoute> {
        self.unsent_confirmation.as_ref()
    }

    /// Drain the notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render_state(&self) -> RenderState<'_> {
        RenderState {
            graph: self.machine.graph(),
            stage: self.machine.stage(),
            start: self.machine.start(),
            goal: self.machine.goal(),
            candidates: self.machine.candidates(),
            selected_candidate: self.machine.selected_candidate(),
            confirmed: self.machine.selected_route(),
            mode: self.mode,
            connected: self.connector.is_open(),
        }
    }

    pub fn display_list(&self) -> DisplayList {
        build_display_list(&self.render_state(), &self.theme)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_down(*x, *y),
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers),
        }
    }

    /// Resolve a click against whatever the current stage makes clickable.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let p = Point::new(x, y);
        let graph = self.machine.graph();
        let event = match self.machine.stage() {
            SelectionStage::ChoosingStart | SelectionStage::ChoosingGoal => {
                resolve_vertex(graph, p, self.config.vertex_hit_radius)
                    .map(|v| SelectionEvent::VertexClicked(v.id))
            }
            SelectionStage::ChoosingRemovedEdges => {
                resolve_edge_marker(graph, p, self.config.edge_marker_hit_radius)
                    .map(|e| SelectionEvent::EdgeMarkerClicked(e.key))
            }
            SelectionStage::DisambiguatingCandidates => {
                self.candidate_at(p).map(SelectionEvent::CandidatePicked)
            }
            SelectionStage::AwaitingRoutes | SelectionStage::Confirmed => None,
        };
        match event {
            Some(event) => self.dispatch(event),
            None => {
                log::trace!("click at ({x}, {y}) hit nothing");
                false
            }
        }
    }

    fn candidate_at(&self, p: Point) -> Option<usize> {
        match self.mode {
            SelectionMode::LineClick => resolve_edge_segment(
                self.machine.graph(),
                p,
                self.machine.candidates(),
                self.config.route_hit_threshold,
            ),
            SelectionMode::ControlList => resolve_legend(&self.display_list().legend, p),
        }
    }

    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match ShortcutMap::resolve(key, modifiers) {
            Some(ShortcutAction::Confirm) => self.confirm(),
            Some(ShortcutAction::Back) => self.back(),
            Some(ShortcutAction::PickCandidate(index)) => self.pick_candidate(index),
            Some(ShortcutAction::ToggleSelectionMode) => {
                self.toggle_mode();
                true
            }
            Some(ShortcutAction::CancelQuery) => self.cancel(),
            Some(ShortcutAction::Reset) => self.reset(),
            None => false,
        }
    }

    // ─── Discrete controls ───────────────────────────────────────────────

    pub fn confirm(&mut self) -> bool {
        self.dispatch(SelectionEvent::Confirm)
    }

    pub fn back(&mut self) -> bool {
        self.dispatch(SelectionEvent::Back)
    }

    pub fn cancel(&mut self) -> bool {
        self.dispatch(SelectionEvent::Cancel)
    }

    pub fn pick_candidate(&mut self, index: usize) -> bool {
        self.dispatch(SelectionEvent::CandidatePicked(index))
    }

    pub fn reset(&mut self) -> bool {
        self.unsent_confirmation = None;
        self.dispatch(SelectionEvent::Reset)
    }

    /// Switch disambiguation modality. The selected candidate is kept.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if mode != self.mode {
            log::debug!("selection mode: {} → {}", self.mode.name(), mode.name());
            self.mode = mode;
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    // ─── Connection lifecycle ────────────────────────────────────────────

    pub fn on_open(&mut self) -> bool {
        self.connector.on_open();
        self.notices.push(Notice::info("connected to the route service"));
        true
    }

    pub fn on_close(&mut self) -> bool {
        self.connector.on_close();
        self.notices
            .push(Notice::error("disconnected from the route service"));
        self.fail_in_flight("connection closed");
        true
    }

    pub fn on_transport_error(&mut self, reason: &str) -> bool {
        self.connector.on_error(reason);
        self.notices
            .push(Notice::error(format!("route service connection failed: {reason}")));
        self.fail_in_flight(reason);
        true
    }

    /// Replace a dropped transport. The host calls [`Session::on_open`]
    /// once the new one is ready.
    pub fn reconnect(&mut self, transport: T) {
        self.connector.reconnect(transport);
    }

    pub fn next_reconnect_delay(&mut self) -> Option<u64> {
        self.connector.next_reconnect_delay()
    }

    /// One inbound text frame. Unparseable frames are dropped without a
    /// state change.
    pub fn on_frame(&mut self, text: &str) -> bool {
        match self.connector.receive(text) {
            Ok(Some(Delivery { ticket, message })) => {
                self.dispatch(SelectionEvent::Response { ticket, message })
            }
            Ok(None) | Err(_) => false,
        }
    }

    /// Advance the clock; fires the route timeout if it has elapsed.
    ///
    /// The timeout counts from the first tick after the query was sent, so
    /// a host that only ticks while a query is in flight still gets the
    /// full allowance.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.machine.stage() != SelectionStage::AwaitingRoutes {
            self.awaiting_since = None;
            return false;
        }
        let Some(limit) = self.config.route_timeout_ms else {
            return false;
        };
        let since = *self.awaiting_since.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) < limit {
            return false;
        }
        log::warn!("route query timed out after {limit} ms");
        self.dispatch(SelectionEvent::TimedOut)
    }

    /// Re-send a confirmation that failed to go out.
    pub fn retry_confirmation(&mut self) -> Result<(), TransportError> {
        let Some(route) = self.unsent_confirmation.take() else {
            return Ok(());
        };
        if let Err(e) = self.connector.send_confirmation(&route) {
            self.unsent_confirmation = Some(route);
            return Err(e);
        }
        log::info!("confirmation delivered on retry: {route}");
        Ok(())
    }

    // ─── Effects ─────────────────────────────────────────────────────────

    fn fail_in_flight(&mut self, reason: &str) {
        if self.machine.stage() == SelectionStage::AwaitingRoutes {
            self.dispatch(SelectionEvent::QueryFailed(reason.to_string()));
        }
    }

    /// Apply an event and carry out its effects. Returns whether it was
    /// accepted.
    fn dispatch(&mut self, event: SelectionEvent) -> bool {
        match self.machine.apply(event) {
            Ok(effects) => {
                self.run(effects);
                if self.machine.stage() != SelectionStage::AwaitingRoutes {
                    self.awaiting_since = None;
                }
                true
            }
            Err(e) => {
                self.notices.push(Notice::warning(e.to_string()));
                false
            }
        }
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendQuery { ticket, query } => {
                    match self.connector.send_query(ticket, &query) {
                        Ok(()) => self.awaiting_since = None,
                        Err(e) => {
                            log::warn!("query {ticket} not sent: {e}");
                            let failed = SelectionEvent::QueryFailed(e.to_string());
                            if let Ok(more) = self.machine.apply(failed) {
                                self.run(more);
                            }
                        }
                    }
                }
                Effect::SendConfirmation(route) => {
                    if let Err(e) = self.connector.send_confirmation(&route) {
                        log::warn!("confirmation not sent: {e}");
                        self.notices.push(Notice::error(format!(
                            "route confirmed but not delivered ({e}); retry when reconnected"
                        )));
                        self.unsent_confirmation = Some(route);
                    }
                }
                Effect::Notify(notice) => self.notices.push(notice),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::tests::Recorder;
    use crate::selection::NoticeLevel;
    use pretty_assertions::assert_eq;

    fn session() -> Session<Recorder> {
        let config = ClientConfig::default();
        let mut s = Session::new(GraphModel::reference(), Recorder::default(), config);
        s.on_open();
        s.take_notices();
        s
    }

    /// Start v0, goal v9, then submit with no edges removed.
    fn submitted(s: &mut Session<Recorder>) {
        assert!(s.pointer_down(50.0, 50.0));
        assert!(s.confirm());
        assert!(s.pointer_down(650.0, 200.0));
        assert!(s.confirm());
        assert!(s.confirm());
        assert_eq!(s.stage(), SelectionStage::AwaitingRoutes);
    }

    #[test]
    fn clicks_resolve_by_stage() {
        let mut s = session();
        // Edge marker position means nothing while choosing the start.
        assert!(!s.pointer_down(200.0, 125.0));
        assert!(s.pointer_down(52.0, 48.0));
        assert_eq!(s.machine().start().map(|v| v.to_string()), Some("v0".into()));
        s.confirm();
        s.pointer_down(650.0, 200.0);
        s.confirm();
        assert!(s.pointer_down(200.0, 125.0));
        assert_eq!(s.machine().graph().removed_edges().len(), 1);
    }

    #[test]
    fn timeout_rewinds_only_after_limit() {
        let mut s = session();
        submitted(&mut s);
        assert!(!s.tick(1_000));
        assert!(!s.tick(15_999));
        assert!(s.tick(16_000));
        assert_eq!(s.stage(), SelectionStage::ChoosingRemovedEdges);
        assert!(
            s.take_notices()
                .iter()
                .any(|n| n.level == NoticeLevel::Warning)
        );
        assert!(!s.tick(40_000));
    }

    #[test]
    fn idle_time_before_submit_does_not_count() {
        let mut s = session();
        assert!(!s.tick(100_000));
        submitted(&mut s);
        // The user spent a minute choosing; the host's next tick lands
        // right after the query went out.
        assert!(!s.tick(160_001));
        assert_eq!(s.stage(), SelectionStage::AwaitingRoutes);
        assert!(!s.tick(175_000));
        assert!(s.tick(175_001));
        assert_eq!(s.stage(), SelectionStage::ChoosingRemovedEdges);
    }

    #[test]
    fn no_timeout_when_disabled() {
        let config = ClientConfig {
            route_timeout_ms: None,
            ..ClientConfig::default()
        };
        let mut s = Session::new(GraphModel::reference(), Recorder::default(), config);
        s.on_open();
        submitted(&mut s);
        assert!(!s.tick(u64::MAX));
        assert_eq!(s.stage(), SelectionStage::AwaitingRoutes);
    }

    #[test]
    fn close_while_awaiting_rewinds() {
        let mut s = session();
        submitted(&mut s);
        s.on_close();
        assert_eq!(s.stage(), SelectionStage::ChoosingRemovedEdges);
        assert_eq!(s.status(), &ConnectionStatus::Closed);
        assert!(!s.render_state().connected);
    }

    #[test]
    fn rejected_action_raises_warning() {
        let mut s = session();
        assert!(!s.confirm());
        assert_eq!(
            s.take_notices(),
            vec![Notice::warning("pick a start vertex first")]
        );
    }

    #[test]
    fn unsent_confirmation_can_be_retried() {
        let mut s = session();
        submitted(&mut s);
        s.connector_mut().transport_mut().fail_with = Some("socket busy".into());
        s.on_frame(r#"{"path":["v0","v5"]}"#);
        assert_eq!(s.stage(), SelectionStage::Confirmed);
        assert!(s.unsent_confirmation().is_some());

        s.connector_mut().transport_mut().fail_with = None;
        s.retry_confirmation().unwrap();
        assert_eq!(s.unsent_confirmation(), None);
        assert_eq!(
            s.connector().transport().sent.last().map(String::as_str),
            Some(r#"{"selected_path":["v0","v5"]}"#)
        );
    }
}
