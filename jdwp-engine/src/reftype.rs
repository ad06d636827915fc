// ReferenceType (2), ClassType (3), ArrayType (4), and
// ClassObjectReference (17) command sets
//
// ClassType.SetValues carries *untagged* trailing values: the tag is
// implicit in each paired field's declared type, so only the payloads go
// on the wire.

use serde::{Deserialize, Serialize};

use crate::codec::Field;
use crate::commands::{
    array_type_commands, class_object_reference_commands, class_type_commands,
    reference_type_commands,
};
use crate::types::{
    ArrayTypeId, ClassId, ClassObjectId, FieldId, IdKind, MethodId, ReferenceTypeId, ThreadId,
    Value,
};

/// A field assignment whose value travels untagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub field_id: FieldId,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum ReferenceTypeCommand {
    Signature { ref_type: ReferenceTypeId },
    ClassLoader { ref_type: ReferenceTypeId },
    Modifiers { ref_type: ReferenceTypeId },
    Fields { ref_type: ReferenceTypeId },
    Methods { ref_type: ReferenceTypeId },
    GetValues { ref_type: ReferenceTypeId, fields: Vec<FieldId> },
    SourceFile { ref_type: ReferenceTypeId },
    NestedTypes { ref_type: ReferenceTypeId },
    Status { ref_type: ReferenceTypeId },
    Interfaces { ref_type: ReferenceTypeId },
    ClassObject { ref_type: ReferenceTypeId },
    SourceDebugExtension { ref_type: ReferenceTypeId },
    SignatureWithGeneric { ref_type: ReferenceTypeId },
    FieldsWithGeneric { ref_type: ReferenceTypeId },
    MethodsWithGeneric { ref_type: ReferenceTypeId },
    Instances { ref_type: ReferenceTypeId, max_instances: i32 },
    ClassFileVersion { ref_type: ReferenceTypeId },
    ConstantPool { ref_type: ReferenceTypeId },
}

impl ReferenceTypeCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Signature { .. } => reference_type_commands::SIGNATURE,
            Self::ClassLoader { .. } => reference_type_commands::CLASS_LOADER,
            Self::Modifiers { .. } => reference_type_commands::MODIFIERS,
            Self::Fields { .. } => reference_type_commands::FIELDS,
            Self::Methods { .. } => reference_type_commands::METHODS,
            Self::GetValues { .. } => reference_type_commands::GET_VALUES,
            Self::SourceFile { .. } => reference_type_commands::SOURCE_FILE,
            Self::NestedTypes { .. } => reference_type_commands::NESTED_TYPES,
            Self::Status { .. } => reference_type_commands::STATUS,
            Self::Interfaces { .. } => reference_type_commands::INTERFACES,
            Self::ClassObject { .. } => reference_type_commands::CLASS_OBJECT,
            Self::SourceDebugExtension { .. } => reference_type_commands::SOURCE_DEBUG_EXTENSION,
            Self::SignatureWithGeneric { .. } => reference_type_commands::SIGNATURE_WITH_GENERIC,
            Self::FieldsWithGeneric { .. } => reference_type_commands::FIELDS_WITH_GENERIC,
            Self::MethodsWithGeneric { .. } => reference_type_commands::METHODS_WITH_GENERIC,
            Self::Instances { .. } => reference_type_commands::INSTANCES,
            Self::ClassFileVersion { .. } => reference_type_commands::CLASS_FILE_VERSION,
            Self::ConstantPool { .. } => reference_type_commands::CONSTANT_POOL,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Signature { ref_type }
            | Self::ClassLoader { ref_type }
            | Self::Modifiers { ref_type }
            | Self::Fields { ref_type }
            | Self::Methods { ref_type }
            | Self::SourceFile { ref_type }
            | Self::NestedTypes { ref_type }
            | Self::Status { ref_type }
            | Self::Interfaces { ref_type }
            | Self::ClassObject { ref_type }
            | Self::SourceDebugExtension { ref_type }
            | Self::SignatureWithGeneric { ref_type }
            | Self::FieldsWithGeneric { ref_type }
            | Self::MethodsWithGeneric { ref_type }
            | Self::ClassFileVersion { ref_type }
            | Self::ConstantPool { ref_type } => vec![Field::Id(IdKind::Object, *ref_type)],
            Self::GetValues { ref_type, fields } => vec![
                Field::Id(IdKind::Object, *ref_type),
                Field::Repeat(
                    fields
                        .iter()
                        .map(|f| vec![Field::Id(IdKind::Field, *f)])
                        .collect(),
                ),
            ],
            Self::Instances {
                ref_type,
                max_instances,
            } => vec![
                Field::Id(IdKind::Object, *ref_type),
                Field::Int(*max_instances),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClassTypeCommand {
    Superclass {
        class: ClassId,
    },
    /// Trailing values are untagged.
    SetValues {
        class: ClassId,
        assignments: Vec<FieldAssignment>,
    },
    InvokeMethod {
        class: ClassId,
        thread: ThreadId,
        method: MethodId,
        arguments: Vec<Value>,
        options: i32,
    },
    NewInstance {
        class: ClassId,
        thread: ThreadId,
        method: MethodId,
        arguments: Vec<Value>,
        options: i32,
    },
}

impl ClassTypeCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Superclass { .. } => class_type_commands::SUPERCLASS,
            Self::SetValues { .. } => class_type_commands::SET_VALUES,
            Self::InvokeMethod { .. } => class_type_commands::INVOKE_METHOD,
            Self::NewInstance { .. } => class_type_commands::NEW_INSTANCE,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Superclass { class } => vec![Field::Id(IdKind::Object, *class)],
            Self::SetValues { class, assignments } => vec![
                Field::Id(IdKind::Object, *class),
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
                class,
                thread,
                method,
                arguments,
                options,
            }
            | Self::NewInstance {
                class,
                thread,
                method,
                arguments,
                options,
            } => vec![
                Field::Id(IdKind::Object, *class),
                Field::Id(IdKind::Object, *thread),
                Field::Id(IdKind::Method, *method),
                Field::Repeat(
                    arguments
                        .iter()
                        .map(|v| vec![Field::Tagged(v.clone())])
                        .collect(),
                ),
                Field::Int(*options),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArrayTypeCommand {
    NewInstance { array_type: ArrayTypeId, length: i32 },
}

impl ArrayTypeCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::NewInstance { .. } => array_type_commands::NEW_INSTANCE,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::NewInstance { array_type, length } => vec![
                Field::Id(IdKind::Object, *array_type),
                Field::Int(*length),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClassObjectReferenceCommand {
    ReflectedType { class_object: ClassObjectId },
}

impl ClassObjectReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::ReflectedType { .. } => class_object_reference_commands::REFLECTED_TYPE,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::ReflectedType { class_object } => {
                vec![Field::Id(IdKind::Object, *class_object)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, CommandPacket, HEADER_SIZE};
    use crate::types::{IdSizes, Tag};

    fn body(command: Command, sizes: &IdSizes) -> Vec<u8> {
        CommandPacket::new(1, command).encode(sizes).unwrap()[HEADER_SIZE..].to_vec()
    }

    #[test]
    fn class_set_values_writes_untagged_payloads() {
        let sizes = IdSizes {
            field_id: 2,
            object_id: 4,
            ..IdSizes::default()
        };
        let bytes = body(
            Command::ClassType(ClassTypeCommand::SetValues {
                class: 0x10,
                assignments: vec![FieldAssignment {
                    field_id: 0x20,
                    value: Value::Int(7),
                }],
            }),
            &sizes,
        );
        assert_eq!(
            bytes,
            [
                0, 0, 0, 0x10, // class id, width 4
                0, 0, 0, 1, // assignment count
                0, 0x20, // field id, width 2
                0, 0, 0, 7, // int payload, no tag byte
            ]
        );
    }

    #[test]
    fn invoke_method_tags_each_argument() {
        let sizes = IdSizes {
            method_id: 2,
            object_id: 4,
            ..IdSizes::default()
        };
        let bytes = body(
            Command::ClassType(ClassTypeCommand::InvokeMethod {
                class: 1,
                thread: 2,
                method: 3,
                arguments: vec![Value::Boolean(true)],
                options: 0,
            }),
            &sizes,
        );
        assert_eq!(
            bytes,
            [
                0, 0, 0, 1, // class
                0, 0, 0, 2, // thread
                0, 3, // method, width 2
                0, 0, 0, 1, // argument count
                Tag::Boolean as u8,
                1, // tagged boolean true
                0, 0, 0, 0, // options
            ]
        );
    }

    #[test]
    fn reference_type_get_values_repeats_field_ids() {
        let sizes = IdSizes {
            field_id: 8,
            object_id: 8,
            ..IdSizes::default()
        };
        let bytes = body(
            Command::ReferenceType(ReferenceTypeCommand::GetValues {
                ref_type: 5,
                fields: vec![6, 7],
            }),
            &sizes,
        );
        assert_eq!(bytes.len(), 8 + 4 + 2 * 8);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 2]);
    }
}
