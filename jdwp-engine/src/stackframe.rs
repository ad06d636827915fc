// StackFrame command set (16)
//
// GetValues names slots by index plus the signature byte of the expected
// type; SetValues carries tagged values because slots have no declared
// type the VM could infer a tag from.

use serde::{Deserialize, Serialize};

use crate::codec::Field;
use crate::commands::stack_frame_commands;
use crate::types::{FrameId, IdKind, ThreadId, Value};

/// One slot to fetch in `StackFrame.GetValues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRequest {
    pub slot: i32,
    /// First byte of the variable's JNI signature.
    pub sig_byte: u8,
}

/// One slot assignment in `StackFrame.SetValues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: i32,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum StackFrameCommand {
    GetValues {
        thread: ThreadId,
        frame: FrameId,
        slots: Vec<SlotRequest>,
    },
    SetValues {
        thread: ThreadId,
        frame: FrameId,
        assignments: Vec<SlotAssignment>,
    },
    ThisObject {
        thread: ThreadId,
        frame: FrameId,
    },
    /// Pop every frame up to and including `frame`.
    PopFrames {
        thread: ThreadId,
        frame: FrameId,
    },
}

impl StackFrameCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::GetValues { .. } => stack_frame_commands::GET_VALUES,
            Self::SetValues { .. } => stack_frame_commands::SET_VALUES,
            Self::ThisObject { .. } => stack_frame_commands::THIS_OBJECT,
            Self::PopFrames { .. } => stack_frame_commands::POP_FRAMES,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::GetValues {
                thread,
                frame,
                slots,
            } => vec![
                Field::Id(IdKind::Object, *thread),
                Field::Id(IdKind::Frame, *frame),
                Field::Repeat(
                    slots
                        .iter()
                        .map(|s| vec![Field::Int(s.slot), Field::Byte(s.sig_byte)])
                        .collect(),
                ),
            ],
            Self::SetValues {
                thread,
                frame,
                assignments,
            } => vec![
                Field::Id(IdKind::Object, *thread),
                Field::Id(IdKind::Frame, *frame),
                Field::Repeat(
                    assignments
                        .iter()
                        .map(|a| vec![Field::Int(a.slot), Field::Tagged(a.value.clone())])
                        .collect(),
                ),
            ],
            Self::ThisObject { thread, frame } | Self::PopFrames { thread, frame } => vec![
                Field::Id(IdKind::Object, *thread),
                Field::Id(IdKind::Frame, *frame),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, CommandPacket, HEADER_SIZE};
    use crate::types::{IdSizes, Tag};

    #[test]
    fn get_values_interleaves_slot_and_signature_byte() {
        let sizes = IdSizes {
            object_id: 4,
            frame_id: 2,
            ..IdSizes::default()
        };
        let packet = CommandPacket::new(
            1,
            Command::StackFrame(StackFrameCommand::GetValues {
                thread: 1,
                frame: 2,
                slots: vec![
                    SlotRequest {
                        slot: 0,
                        sig_byte: b'I',
                    },
                    SlotRequest {
                        slot: 3,
                        sig_byte: b'L',
                    },
                ],
            }),
        );
        let body = &packet.encode(&sizes).unwrap()[HEADER_SIZE..];
        assert_eq!(
            body,
            [
                0, 0, 0, 1, // thread at object width
                0, 2, // frame at frame width
                0, 0, 0, 2, // slot count
                0, 0, 0, 0, b'I', //
                0, 0, 0, 3, b'L',
            ]
        );
    }

    #[test]
    fn set_values_keeps_value_tags() {
        let sizes = IdSizes {
            object_id: 2,
            frame_id: 2,
            ..IdSizes::default()
        };
        let packet = CommandPacket::new(
            1,
            Command::StackFrame(StackFrameCommand::SetValues {
                thread: 1,
                frame: 2,
                assignments: vec![SlotAssignment {
                    slot: 4,
                    value: Value::Int(-1),
                }],
            }),
        );
        let body = &packet.encode(&sizes).unwrap()[HEADER_SIZE..];
        assert_eq!(
            body,
            [
                0, 1, 0, 2, // ids
                0, 0, 0, 1, // count
                0, 0, 0, 4, // slot
                Tag::Int as u8,
                0xFF, 0xFF, 0xFF, 0xFF,
            ]
        );
    }
}
