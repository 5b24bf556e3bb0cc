pub mod connector;
pub mod input;
pub mod selection;
pub mod session;
pub mod shortcuts;

pub use connector::{ConnectionStatus, RouteConnector, Transport};
pub use input::{InputEvent, Modifiers};
pub use selection::{Effect, Notice, NoticeLevel, QueryTicket, SelectionEvent, SelectionMachine};
pub use session::Session;
