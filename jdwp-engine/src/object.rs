// ObjectReference (9), ArrayReference (13), and ClassLoaderReference (14)
// command sets
//
// ObjectReference.SetValues and ArrayReference.SetValues carry *untagged*
// trailing values; the receiving VM knows each element's type from the
// field declaration or the array's component type.

use crate::codec::Field;
use crate::commands::{
    array_reference_commands, class_loader_commands, object_reference_commands,
};
use crate::reftype::FieldAssignment;
use crate::types::{ArrayId, ClassId, ClassLoaderId, FieldId, IdKind, MethodId, ObjectId, ThreadId, Value};

#[derive(Debug, Clone)]
pub enum ObjectReferenceCommand {
    ReferenceType {
        object: ObjectId,
    },
    GetValues {
        object: ObjectId,
        fields: Vec<FieldId>,
    },
    /// Trailing values are untagged.
    SetValues {
        object: ObjectId,
        assignments: Vec<FieldAssignment>,
    },
    MonitorInfo {
        object: ObjectId,
    },
    InvokeMethod {
        object: ObjectId,
        thread: ThreadId,
        class: ClassId,
        method: MethodId,
        arguments: Vec<Value>,
        options: i32,
    },
    DisableCollection {
        object: ObjectId,
    },
    EnableCollection {
        object: ObjectId,
    },
    IsCollected {
        object: ObjectId,
    },
    ReferringObjects {
        object: ObjectId,
        max_referrers: i32,
    },
}

impl ObjectReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::ReferenceType { .. } => object_reference_commands::REFERENCE_TYPE,
            Self::GetValues { .. } => object_reference_commands::GET_VALUES,
            Self::SetValues { .. } => object_reference_commands::SET_VALUES,
            Self::MonitorInfo { .. } => object_reference_commands::MONITOR_INFO,
            Self::InvokeMethod { .. } => object_reference_commands::INVOKE_METHOD,
            Self::DisableCollection { .. } => object_reference_commands::DISABLE_COLLECTION,
            Self::EnableCollection { .. } => object_reference_commands::ENABLE_COLLECTION,
            Self::IsCollected { .. } => object_reference_commands::IS_COLLECTED,
            Self::ReferringObjects { .. } => object_reference_commands::REFERRING_OBJECTS,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::ReferenceType { object }
            | Self::MonitorInfo { object }
            | Self::DisableCollection { object }
            | Self::EnableCollection { object }
            | Self::IsCollected { object } => vec![Field::Id(IdKind::Object, *object)],
            Self::GetValues { object, fields } => vec![
                Field::Id(IdKind::Object, *object),
                Field::Repeat(
                    fields
                        .iter()
                        .map(|f| vec![Field::Id(IdKind::Field, *f)])
                        .collect(),
                ),
            ],
            Self::SetValues {
                object,
                assignments,
            } => vec![
                Field::Id(IdKind::Object, *object),
                Field::Repeat(
                    assignments
                        .iter()
                        .map(|a| {
                            vec![
                                Field::Id(IdKind::Field, a.field_id),
                                Field::Untagged(a.value.clone()),
                            ]
                        })
                        .collect(),
                ),
            ],
            Self::InvokeMethod {
                object,
                thread,
                class,
                method,
                arguments,
                options,
            } => vec![
                Field::Id(IdKind::Object, *object),
                Field::Id(IdKind::Object, *thread),
                Field::Id(IdKind::Object, *class),
                Field::Id(IdKind::Method, *method),
                Field::Repeat(
                    arguments
                        .iter()
                        .map(|v| vec![Field::Tagged(v.clone())])
                        .collect(),
                ),
                Field::Int(*options),
            ],
            Self::ReferringObjects {
                object,
                max_referrers,
            } => vec![
                Field::Id(IdKind::Object, *object),
                Field::Int(*max_referrers),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArrayReferenceCommand {
    Length {
        array: ArrayId,
    },
    GetValues {
        array: ArrayId,
        first_index: i32,
        length: i32,
    },
    /// Trailing values are untagged; the component type is implicit.
    SetValues {
        array: ArrayId,
        first_index: i32,
        values: Vec<Value>,
    },
}

impl ArrayReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Length { .. } => array_reference_commands::LENGTH,
            Self::GetValues { .. } => array_reference_commands::GET_VALUES,
            Self::SetValues { .. } => array_reference_commands::SET_VALUES,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Length { array } => vec![Field::Id(IdKind::Object, *array)],
            Self::GetValues {
                array,
                first_index,
                length,
            } => vec![
                Field::Id(IdKind::Object, *array),
                Field::Int(*first_index),
                Field::Int(*length),
            ],
            Self::SetValues {
                array,
                first_index,
                values,
            } => vec![
                Field::Id(IdKind::Object, *array),
                Field::Int(*first_index),
                Field::Repeat(
                    values
                        .iter()
                        .map(|v| vec![Field::Untagged(v.clone())])
                        .collect(),
                ),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClassLoaderReferenceCommand {
    VisibleClasses { class_loader: ClassLoaderId },
}

impl ClassLoaderReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::VisibleClasses { .. } => class_loader_commands::VISIBLE_CLASSES,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::VisibleClasses { class_loader } => {
                vec![Field::Id(IdKind::Object, *class_loader)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, CommandPacket, HEADER_SIZE};
    use crate::types::IdSizes;

    #[test]
    fn array_set_values_strips_value_tags() {
        let sizes = IdSizes {
            object_id: 4,
            ..IdSizes::default()
        };
        let packet = CommandPacket::new(
            1,
            Command::ArrayReference(ArrayReferenceCommand::SetValues {
                array: 9,
                first_index: 2,
                values: vec![Value::Short(-1), Value::Short(5)],
            }),
        );
        let body = &packet.encode(&sizes).unwrap()[HEADER_SIZE..];
        assert_eq!(
            body,
            [
                0, 0, 0, 9, // array id
                0, 0, 0, 2, // first index
                0, 0, 0, 2, // value count
                0xFF, 0xFF, // -1 as short, no tag
                0x00, 0x05,
            ]
        );
    }

    #[test]
    fn object_invoke_method_orders_ids_before_arguments() {
        let sizes = IdSizes {
            method_id: 2,
            object_id: 2,
            ..IdSizes::default()
        };
        let packet = CommandPacket::new(
            1,
            Command::ObjectReference(ObjectReferenceCommand::InvokeMethod {
                object: 1,
                thread: 2,
                class: 3,
                method: 4,
                arguments: vec![],
                options: 1,
            }),
        );
        let body = &packet.encode(&sizes).unwrap()[HEADER_SIZE..];
        assert_eq!(
            body,
            [0, 1, 0, 2, 0, 3, 0, 4, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }
}
