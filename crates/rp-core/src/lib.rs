pub mod config;
pub mod error;
pub mod grid;
pub mod id;
pub mod model;
pub mod protocol;

pub use config::{ClientConfig, ReconnectPolicy, SelectionMode};
pub use error::{
    ConfigError, GraphError, ProtocolError, SelectionError, ServiceError, TransportError,
};
pub use id::VertexId;
pub use model::*;
pub use protocol::InboundMessage;
