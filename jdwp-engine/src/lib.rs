// JDWP client protocol engine
//
// Implements the debugger side of the Java Debug Wire Protocol:
// - Handshake and framed packet I/O over TCP
// - The full command catalog with a schema-driven serializer
// - Composite event parsing and handler fan-out
// - Reply correlation by packet id across concurrent senders
//
// Reply bodies are delivered as raw bytes keyed by id; decoding them is
// left to the embedding front-end (see `codec::JdwpReader`).

pub mod codec;
pub mod commands;
pub mod connection;
pub mod events;
pub mod eventrequest;
pub mod method;
pub mod object;
pub mod protocol;
pub mod reftype;
pub mod socket;
pub mod stackframe;
pub mod string;
pub mod thread;
pub mod types;
pub mod vm;
pub mod wire;

pub use connection::Connection;
pub use events::{Event, EventHandler, EventSet};
pub use protocol::{Command, CommandPacket, JdwpError, JdwpResult, ReplyPacket};
pub use types::{IdSizes, Location, Tag, TaggedObjectId, Value};
