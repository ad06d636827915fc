// JDWP packet framing and error definitions
//
// Reference: https://docs.oracle.com/javase/8/docs/platform/jpda/jdwp/jdwp-protocol.html
//
// Packet structure:
// length (4 bytes) - includes header
// id (4 bytes)
// flags (1 byte) - 0x00 = command, 0x80 = reply
// [Command packet: command set (1 byte) + command (1 byte)]
// [Reply packet: error code (2 bytes)]
// data (variable)

use bytes::{BufMut, BytesMut};
use thiserror::Error;

use crate::codec::{write_fields, Field, JdwpWriter};
use crate::commands::command_sets;
use crate::eventrequest::EventRequestCommand;
use crate::method::MethodCommand;
use crate::object::{
    ArrayReferenceCommand, ClassLoaderReferenceCommand, ObjectReferenceCommand,
};
use crate::reftype::{
    ArrayTypeCommand, ClassObjectReferenceCommand, ClassTypeCommand, ReferenceTypeCommand,
};
use crate::stackframe::StackFrameCommand;
use crate::string::StringReferenceCommand;
use crate::thread::{ThreadGroupReferenceCommand, ThreadReferenceCommand};
use crate::types::IdSizes;
use crate::vm::VirtualMachineCommand;
use crate::wire;

pub type JdwpResult<T> = Result<T, JdwpError>;

#[derive(Debug, Error)]
pub enum JdwpError {
    #[error("could not connect: {0}")]
    Connect(#[source] std::io::Error),

    #[error("invalid handshake")]
    InvalidHandshake,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("protocol error at byte {offset}: {message}")]
    Protocol { offset: usize, message: String },

    #[error("packet body too long: {0} bytes")]
    BodyTooLong(usize),

    #[error("logic error: {0}")]
    Logic(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JdwpError {
    pub(crate) fn protocol(offset: usize, message: impl Into<String>) -> Self {
        JdwpError::Protocol {
            offset,
            message: message.into(),
        }
    }
}

// JDWP handshake string
pub const JDWP_HANDSHAKE: &[u8] = b"JDWP-Handshake";

pub const HEADER_SIZE: usize = 11;
pub const REPLY_FLAG: u8 = 0x80;

/// Largest body an outgoing packet may carry; the length field counts the
/// header too.
pub const MAX_BODY_LEN: usize = (u32::MAX as usize) - HEADER_SIZE;

/// True iff an 11-byte header announces a composite event packet.
pub fn header_is_event(header: &[u8]) -> bool {
    header.len() >= HEADER_SIZE
        && header[8] & REPLY_FLAG == 0
        && header[9] == command_sets::EVENT
        && header[10] == crate::commands::composite_commands::COMPOSITE
}

/// A typed command body, one variant per JDWP command set.
#[derive(Debug, Clone)]
pub enum Command {
    VirtualMachine(VirtualMachineCommand),
    ReferenceType(ReferenceTypeCommand),
    ClassType(ClassTypeCommand),
    ArrayType(ArrayTypeCommand),
    Method(MethodCommand),
    ObjectReference(ObjectReferenceCommand),
    StringReference(StringReferenceCommand),
    ThreadReference(ThreadReferenceCommand),
    ThreadGroupReference(ThreadGroupReferenceCommand),
    ArrayReference(ArrayReferenceCommand),
    ClassLoaderReference(ClassLoaderReferenceCommand),
    EventRequest(EventRequestCommand),
    StackFrame(StackFrameCommand),
    ClassObjectReference(ClassObjectReferenceCommand),
}

impl Command {
    pub fn command_set(&self) -> u8 {
        match self {
            Command::VirtualMachine(_) => command_sets::VIRTUAL_MACHINE,
            Command::ReferenceType(_) => command_sets::REFERENCE_TYPE,
            Command::ClassType(_) => command_sets::CLASS_TYPE,
            Command::ArrayType(_) => command_sets::ARRAY_TYPE,
            Command::Method(_) => command_sets::METHOD,
            Command::ObjectReference(_) => command_sets::OBJECT_REFERENCE,
            Command::StringReference(_) => command_sets::STRING_REFERENCE,
            Command::ThreadReference(_) => command_sets::THREAD_REFERENCE,
            Command::ThreadGroupReference(_) => command_sets::THREAD_GROUP_REFERENCE,
            Command::ArrayReference(_) => command_sets::ARRAY_REFERENCE,
            Command::ClassLoaderReference(_) => command_sets::CLASS_LOADER_REFERENCE,
            Command::EventRequest(_) => command_sets::EVENT_REQUEST,
            Command::StackFrame(_) => command_sets::STACK_FRAME,
            Command::ClassObjectReference(_) => command_sets::CLASS_OBJECT_REFERENCE,
        }
    }

    pub fn command(&self) -> u8 {
        match self {
            Command::VirtualMachine(c) => c.command(),
            Command::ReferenceType(c) => c.command(),
            Command::ClassType(c) => c.command(),
            Command::ArrayType(c) => c.command(),
            Command::Method(c) => c.command(),
            Command::ObjectReference(c) => c.command(),
            Command::StringReference(c) => c.command(),
            Command::ThreadReference(c) => c.command(),
            Command::ThreadGroupReference(c) => c.command(),
            Command::ArrayReference(c) => c.command(),
            Command::ClassLoaderReference(c) => c.command(),
            Command::EventRequest(c) => c.command(),
            Command::StackFrame(c) => c.command(),
            Command::ClassObjectReference(c) => c.command(),
        }
    }

    /// The body schema in declaration order.
    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Command::VirtualMachine(c) => c.fields(),
            Command::ReferenceType(c) => c.fields(),
            Command::ClassType(c) => c.fields(),
            Command::ArrayType(c) => c.fields(),
            Command::Method(c) => c.fields(),
            Command::ObjectReference(c) => c.fields(),
            Command::StringReference(c) => c.fields(),
            Command::ThreadReference(c) => c.fields(),
            Command::ThreadGroupReference(c) => c.fields(),
            Command::ArrayReference(c) => c.fields(),
            Command::ClassLoaderReference(c) => c.fields(),
            Command::EventRequest(c) => c.fields(),
            Command::StackFrame(c) => c.fields(),
            Command::ClassObjectReference(c) => c.fields(),
        }
    }
}

/// An outbound command packet: assigned id plus typed body.
#[derive(Debug, Clone)]
pub struct CommandPacket {
    pub id: u32,
    pub command: Command,
}

impl CommandPacket {
    pub fn new(id: u32, command: Command) -> Self {
        Self { id, command }
    }

    /// Serialize header and body for transmission. Identifier fields take
    /// their widths from `sizes`.
    pub fn encode(&self, sizes: &IdSizes) -> JdwpResult<Vec<u8>> {
        let mut body = JdwpWriter::new();
        write_fields(&mut body, &self.command.fields(), sizes)?;
        let body = body.into_vec();
        if body.len() >= MAX_BODY_LEN {
            return Err(JdwpError::BodyTooLong(body.len()));
        }

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + body.len());
        buf.put_u32((HEADER_SIZE + body.len()) as u32);
        buf.put_u32(self.id);
        buf.put_u8(0x00); // command flag
        buf.put_u8(self.command.command_set());
        buf.put_u8(self.command.command());
        buf.put_slice(&body);
        Ok(buf.to_vec())
    }
}

/// An inbound reply packet. The body is handed over verbatim; the VM's
/// error code is preserved, never translated into a transport error.
#[derive(Debug, Clone)]
pub struct ReplyPacket {
    pub id: u32,
    pub error_code: u16,
    pub data: Vec<u8>,
}

impl ReplyPacket {
    /// Decode a full packet (header included) whose reply bit is set.
    pub fn decode(buf: &[u8]) -> JdwpResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(JdwpError::protocol(buf.len(), "reply packet too short"));
        }
        let length = wire::read_u32_be(&buf[0..4]) as usize;
        if length != buf.len() {
            return Err(JdwpError::protocol(
                0,
                format!("length field {length} does not match packet of {} bytes", buf.len()),
            ));
        }
        let flags = buf[8];
        if flags & REPLY_FLAG == 0 {
            return Err(JdwpError::protocol(8, format!("reply bit clear: {flags:#04x}")));
        }
        Ok(Self {
            id: wire::read_u32_be(&buf[4..8]),
            error_code: wire::read_u16_be(&buf[9..11]),
            data: buf[HEADER_SIZE..].to_vec(),
        })
    }

    pub fn is_error(&self) -> bool {
        self.error_code != 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The JDWP-published name of this reply's error code.
    pub fn error_description(&self) -> &'static str {
        error_description(self.error_code)
    }
}

/// JDWP error-code names as published by the protocol specification.
pub fn error_description(code: u16) -> &'static str {
    match code {
        0 => "NONE",
        10 => "INVALID_THREAD",
        11 => "INVALID_THREAD_GROUP",
        12 => "INVALID_PRIORITY",
        13 => "THREAD_NOT_SUSPENDED",
        14 => "THREAD_SUSPENDED",
        15 => "THREAD_NOT_ALIVE",
        20 => "INVALID_OBJECT",
        21 => "INVALID_CLASS",
        22 => "CLASS_NOT_PREPARED",
        23 => "INVALID_METHODID",
        24 => "INVALID_LOCATION",
        25 => "INVALID_FIELDID",
        30 => "INVALID_FRAMEID",
        31 => "NO_MORE_FRAMES",
        32 => "OPAQUE_FRAME",
        33 => "NOT_CURRENT_FRAME",
        34 => "TYPE_MISMATCH",
        35 => "INVALID_SLOT",
        40 => "DUPLICATE",
        41 => "NOT_FOUND",
        50 => "INVALID_MONITOR",
        51 => "NOT_MONITOR_OWNER",
        52 => "INTERRUPT",
        60 => "INVALID_CLASS_FORMAT",
        61 => "CIRCULAR_CLASS_DEFINITION",
        62 => "FAILS_VERIFICATION",
        63 => "ADD_METHOD_NOT_IMPLEMENTED",
        64 => "SCHEMA_CHANGE_NOT_IMPLEMENTED",
        65 => "INVALID_TYPESTATE",
        66 => "HIERARCHY_CHANGE_NOT_IMPLEMENTED",
        67 => "DELETE_METHOD_NOT_IMPLEMENTED",
        68 => "UNSUPPORTED_VERSION",
        69 => "NAMES_DONT_MATCH",
        70 => "CLASS_MODIFIERS_CHANGE_NOT_IMPLEMENTED",
        71 => "METHOD_MODIFIERS_CHANGE_NOT_IMPLEMENTED",
        99 => "NOT_IMPLEMENTED",
        100 => "NULL_POINTER",
        101 => "ABSENT_INFORMATION",
        102 => "INVALID_EVENT_TYPE",
        103 => "ILLEGAL_ARGUMENT",
        110 => "OUT_OF_MEMORY",
        111 => "ACCESS_DENIED",
        112 => "VM_DEAD",
        113 => "INTERNAL",
        115 => "UNATTACHED_THREAD",
        500 => "INVALID_TAG",
        502 => "ALREADY_INVOKING",
        503 => "INVALID_INDEX",
        504 => "INVALID_LENGTH",
        506 => "INVALID_STRING",
        507 => "INVALID_CLASS_LOADER",
        508 => "INVALID_ARRAY",
        509 => "TRANSPORT_LOAD",
        510 => "TRANSPORT_INIT",
        511 => "NATIVE_METHOD",
        512 => "INVALID_COUNT",
        _ => "UNKNOWN_ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectId;
    use crate::vm::{DisposeRequest, VirtualMachineCommand};

    #[test]
    fn version_command_serializes_to_known_bytes() {
        let packet = CommandPacket::new(
            0x0000_0001,
            Command::VirtualMachine(VirtualMachineCommand::Version),
        );
        let encoded = packet.encode(&IdSizes::default()).unwrap();
        assert_eq!(
            encoded,
            [0x00, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x01]
        );
    }

    #[test]
    fn classes_by_signature_frames_string_body() {
        let packet = CommandPacket::new(
            7,
            Command::VirtualMachine(VirtualMachineCommand::ClassesBySignature {
                signature: "Ljava/lang/String;".to_string(),
            }),
        );
        let encoded = packet.encode(&IdSizes::default()).unwrap();
        assert_eq!(
            &encoded[0..11],
            &[0x00, 0x00, 0x00, 0x21, 0x00, 0x00, 0x00, 0x07, 0x00, 0x01, 0x02]
        );
        assert_eq!(&encoded[11..15], &[0x00, 0x00, 0x00, 0x12]);
        assert_eq!(&encoded[15..], b"Ljava/lang/String;");
    }

    #[test]
    fn dispose_objects_repeats_id_refcount_pairs() {
        let object: ObjectId = 0xDEAD_BEEF_CAFE_F00D;
        let requests = (0..4)
            .map(|_| DisposeRequest {
                object,
                ref_count: 1,
            })
            .collect();
        let packet = CommandPacket::new(
            3,
            Command::VirtualMachine(VirtualMachineCommand::DisposeObjects { requests }),
        );
        let encoded = packet.encode(&IdSizes::default()).unwrap();
        let body = &encoded[HEADER_SIZE..];
        assert_eq!(&body[0..4], &[0x00, 0x00, 0x00, 0x04]);
        for i in 0..4 {
            let pair = &body[4 + i * 12..4 + (i + 1) * 12];
            assert_eq!(
                pair,
                [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xF0, 0x0D, 0x00, 0x00, 0x00, 0x01]
            );
        }
    }

    #[test]
    fn length_field_counts_the_whole_packet() {
        let commands = [
            Command::VirtualMachine(VirtualMachineCommand::IdSizes),
            Command::VirtualMachine(VirtualMachineCommand::ClassesBySignature {
                signature: "LMain;".to_string(),
            }),
            Command::VirtualMachine(VirtualMachineCommand::Exit { exit_code: 3 }),
        ];
        for command in commands {
            let encoded = CommandPacket::new(9, command).encode(&IdSizes::default()).unwrap();
            assert_eq!(wire::read_u32_be(&encoded[0..4]) as usize, encoded.len());
        }
    }

    #[test]
    fn header_classification_follows_reply_bit_and_composite_ids() {
        let mut header = [0u8; HEADER_SIZE];
        header[9] = 64;
        header[10] = 100;
        assert!(header_is_event(&header));

        header[8] = REPLY_FLAG;
        assert!(!header_is_event(&header));

        header[8] = 0;
        header[9] = 1;
        assert!(!header_is_event(&header));

        header[9] = 64;
        header[10] = 1;
        assert!(!header_is_event(&header));
    }

    #[test]
    fn reply_decode_extracts_id_code_and_body() {
        let packet = [
            0, 0, 0, 14, // length = 14
            0, 0, 0, 9, // id = 9
            0x80, // reply flag
            0, 21, // error code = INVALID_CLASS
            0xAA, 0xBB, 0xCC, // body
        ];
        let reply = ReplyPacket::decode(&packet).unwrap();
        assert_eq!(reply.id, 9);
        assert_eq!(reply.error_code, 21);
        assert!(reply.is_error());
        assert_eq!(reply.error_description(), "INVALID_CLASS");
        assert_eq!(reply.data(), &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn reply_decode_rejects_command_packets() {
        let packet = [0, 0, 0, 11, 0, 0, 0, 1, 0x00, 1, 1];
        assert!(matches!(
            ReplyPacket::decode(&packet),
            Err(JdwpError::Protocol { offset: 8, .. })
        ));
    }

    #[test]
    fn error_descriptions_cover_the_published_table() {
        assert_eq!(error_description(0), "NONE");
        assert_eq!(error_description(10), "INVALID_THREAD");
        assert_eq!(error_description(112), "VM_DEAD");
        assert_eq!(error_description(512), "INVALID_COUNT");
        assert_eq!(error_description(9999), "UNKNOWN_ERROR");
    }
}
