//! Route service connector.
//!
//! Owns the single long-lived connection to the path-computation service:
//! encodes outbound frames, decodes inbound ones, and tracks connection
//! status. The actual socket is behind the [`Transport`] trait so the
//! browser bridge and tests can plug in their own.
//!
//! ## Matching responses to queries
//!
//! The service handles one message at a time per connection and answers
//! in order, but its frames carry no query id. Every query sent pushes its
//! [`QueryTicket`] onto a FIFO; every decoded response pops the oldest.
//! The selection machine then drops responses whose ticket is no longer
//! the active one.
//!
//! The reference service also answers every `selected_path` frame (with an
//! `error`, since it only understands queries). A sent confirmation
//! therefore holds a slot in the FIFO too, and the reply that fills it is
//! discarded here.

use crate::selection::QueryTicket;
use rp_core::protocol::{encode_confirmation, encode_query};
use rp_core::{
    CandidateRoute, InboundMessage, ProtocolError, Query, ReconnectPolicy, TransportError,
};
use std::collections::VecDeque;

/// A bidirectional text-frame channel.
pub trait Transport {
    /// Hand one text frame to the channel.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Close the channel. Further sends fail.
    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Closed,
    Failed(String),
}

impl ConnectionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Open => "open",
            ConnectionStatus::Closed => "closed",
            ConnectionStatus::Failed(_) => "failed",
        }
    }
}

/// What an outstanding reply will answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Query(QueryTicket),
    Confirmation,
}

/// A decoded inbound frame and the query it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub ticket: Option<QueryTicket>,
    pub message: InboundMessage,
}

pub struct RouteConnector<T: Transport> {
    transport: T,
    status: ConnectionStatus,
    outstanding: VecDeque<Pending>,
    policy: ReconnectPolicy,
    reconnect_attempts: u32,
    confirmation_reply: bool,
}

impl<T: Transport> RouteConnector<T> {
    /// Wrap a transport whose connection is being established.
    pub fn new(transport: T, policy: ReconnectPolicy) -> Self {
        Self {
            transport,
            status: ConnectionStatus::Connecting,
            outstanding: VecDeque::new(),
            policy,
            reconnect_attempts: 0,
            confirmation_reply: true,
        }
    }

    /// Whether the service sends a reply to `selected_path` frames.
    pub fn with_confirmation_reply(mut self, expected: bool) -> Self {
        self.confirmation_reply = expected;
        self
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == ConnectionStatus::Open
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Number of frames sent whose reply has not arrived yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// The transport reported the connection is open ("ready").
    pub fn on_open(&mut self) {
        log::info!("route service connection ready");
        self.status = ConnectionStatus::Open;
        self.reconnect_attempts = 0;
    }

    /// The transport closed. Outstanding queries will never be answered.
    pub fn on_close(&mut self) {
        log::warn!(
            "route service connection closed ({} reply(ies) outstanding)",
            self.outstanding.len()
        );
        self.outstanding.clear();
        if !matches!(self.status, ConnectionStatus::Failed(_)) {
            self.status = ConnectionStatus::Closed;
        }
    }

    /// The transport reported an error; the connection is considered lost.
    pub fn on_error(&mut self, reason: &str) {
        log::warn!("route service transport error: {reason}");
        self.outstanding.clear();
        self.status = ConnectionStatus::Failed(reason.to_string());
    }

    /// Swap in a fresh transport after a drop; status goes back to
    /// `Connecting` until the new one opens.
    pub fn reconnect(&mut self, transport: T) {
        self.transport.close();
        self.transport = transport;
        self.outstanding.clear();
        self.status = ConnectionStatus::Connecting;
    }

    /// Delay before the next reconnect attempt, per policy. Counts the
    /// attempt. `None` means stay disconnected.
    pub fn next_reconnect_delay(&mut self) -> Option<u64> {
        if self.is_open() {
            return None;
        }
        let delay = self.policy.next_delay(self.reconnect_attempts + 1)?;
        self.reconnect_attempts += 1;
        Some(delay)
    }

    pub fn close(&mut self) {
        self.transport.close();
        self.on_close();
    }

    // ─── Outbound ────────────────────────────────────────────────────────

    pub fn send_query(
        &mut self,
        ticket: QueryTicket,
        query: &Query,
    ) -> Result<(), TransportError> {
        let frame = encode_query(query).map_err(|e| TransportError::Send(e.to_string()))?;
        self.send(&frame)?;
        self.outstanding.push_back(Pending::Query(ticket));
        Ok(())
    }

    pub fn send_confirmation(&mut self, route: &CandidateRoute) -> Result<(), TransportError> {
        let frame =
            encode_confirmation(route).map_err(|e| TransportError::Send(e.to_string()))?;
        self.send(&frame)?;
        if self.confirmation_reply {
            self.outstanding.push_back(Pending::Confirmation);
        }
        Ok(())
    }

    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        match &self.status {
            ConnectionStatus::Open => {}
            ConnectionStatus::Connecting => return Err(TransportError::NotConnected),
            ConnectionStatus::Closed | ConnectionStatus::Failed(_) => {
                return Err(TransportError::Closed);
            }
        }
        log::debug!("→ {frame}");
        self.transport.send_text(frame)
    }

    // ─── Inbound ─────────────────────────────────────────────────────────

    /// Decode one inbound frame. Parse failures leave the connection and
    /// the outstanding queue untouched. Returns `None` for the service's
    /// reply to a confirmation.
    pub fn receive(&mut self, text: &str) -> Result<Option<Delivery>, ProtocolError> {
        log::debug!("← {text}");
        let message = InboundMessage::decode(text).inspect_err(|e| {
            log::warn!("ignoring unparseable frame: {e}");
        })?;
        let ticket = match self.outstanding.pop_front() {
            Some(Pending::Confirmation) => {
                log::debug!("discarding service reply to a confirmation: {message:?}");
                return Ok(None);
            }
            Some(Pending::Query(ticket)) => Some(ticket),
            None => {
                log::warn!("route response arrived with no query outstanding");
                None
            }
        };
        Ok(Some(Delivery { ticket, message }))
    }
}
