// VirtualMachine command set (1)
//
// Typed command bodies; replies come back as raw bytes keyed by packet id.

use serde::{Deserialize, Serialize};

use crate::codec::Field;
use crate::commands::vm_commands;
use crate::types::{IdKind, ObjectId, ReferenceTypeId};

/// One entry of `VirtualMachine.DisposeObjects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisposeRequest {
    pub object: ObjectId,
    /// How many times the id may be used after disposal before the VM
    /// garbage collects the back-reference.
    pub ref_count: i32,
}

/// One entry of `VirtualMachine.RedefineClasses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRedefinition {
    pub ref_type: ReferenceTypeId,
    pub class_file: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum VirtualMachineCommand {
    /// VirtualMachine.Version
    Version,
    /// VirtualMachine.ClassesBySignature; JNI signature, e.g. `Ljava/lang/String;`
    ClassesBySignature { signature: String },
    AllClasses,
    AllThreads,
    TopLevelThreadGroups,
    Dispose,
    /// VirtualMachine.IDSizes; the reply drives all variable-width serialization
    IdSizes,
    Suspend,
    Resume,
    Exit { exit_code: i32 },
    CreateString { utf: String },
    Capabilities,
    ClassPaths,
    DisposeObjects { requests: Vec<DisposeRequest> },
    HoldEvents,
    ReleaseEvents,
    CapabilitiesNew,
    RedefineClasses { classes: Vec<ClassRedefinition> },
    SetDefaultStratum { stratum: String },
    AllClassesWithGeneric,
    InstanceCounts { ref_types: Vec<ReferenceTypeId> },
}

impl VirtualMachineCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Version => vm_commands::VERSION,
            Self::ClassesBySignature { .. } => vm_commands::CLASSES_BY_SIGNATURE,
            Self::AllClasses => vm_commands::ALL_CLASSES,
            Self::AllThreads => vm_commands::ALL_THREADS,
            Self::TopLevelThreadGroups => vm_commands::TOP_LEVEL_THREAD_GROUPS,
            Self::Dispose => vm_commands::DISPOSE,
            Self::IdSizes => vm_commands::ID_SIZES,
            Self::Suspend => vm_commands::SUSPEND,
            Self::Resume => vm_commands::RESUME,
            Self::Exit { .. } => vm_commands::EXIT,
            Self::CreateString { .. } => vm_commands::CREATE_STRING,
            Self::Capabilities => vm_commands::CAPABILITIES,
            Self::ClassPaths => vm_commands::CLASS_PATHS,
            Self::DisposeObjects { .. } => vm_commands::DISPOSE_OBJECTS,
            Self::HoldEvents => vm_commands::HOLD_EVENTS,
            Self::ReleaseEvents => vm_commands::RELEASE_EVENTS,
            Self::CapabilitiesNew => vm_commands::CAPABILITIES_NEW,
            Self::RedefineClasses { .. } => vm_commands::REDEFINE_CLASSES,
            Self::SetDefaultStratum { .. } => vm_commands::SET_DEFAULT_STRATUM,
            Self::AllClassesWithGeneric => vm_commands::ALL_CLASSES_WITH_GENERIC,
            Self::InstanceCounts { .. } => vm_commands::INSTANCE_COUNTS,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Version
            | Self::AllClasses
            | Self::AllThreads
            | Self::TopLevelThreadGroups
            | Self::Dispose
            | Self::IdSizes
            | Self::Suspend
            | Self::Resume
            | Self::Capabilities
            | Self::ClassPaths
            | Self::HoldEvents
            | Self::ReleaseEvents
            | Self::CapabilitiesNew
            | Self::AllClassesWithGeneric => Vec::new(),
            Self::ClassesBySignature { signature } => vec![Field::Str(signature.clone())],
            Self::Exit { exit_code } => vec![Field::Int(*exit_code)],
            Self::CreateString { utf } => vec![Field::Str(utf.clone())],
            Self::DisposeObjects { requests } => vec![Field::Repeat(
                requests
                    .iter()
                    .map(|r| {
                        vec![
                            Field::Id(IdKind::Object, r.object),
                            Field::Int(r.ref_count),
                        ]
                    })
                    .collect(),
            )],
            Self::RedefineClasses { classes } => vec![Field::Repeat(
                classes
                    .iter()
                    .map(|c| {
                        vec![
                            Field::Id(IdKind::Object, c.ref_type),
                            Field::Bytes(c.class_file.clone()),
                        ]
                    })
                    .collect(),
            )],
            Self::SetDefaultStratum { stratum } => vec![Field::Str(stratum.clone())],
            Self::InstanceCounts { ref_types } => vec![Field::Repeat(
                ref_types
                    .iter()
                    .map(|id| vec![Field::Id(IdKind::Object, *id)])
                    .collect(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, CommandPacket, HEADER_SIZE};
    use crate::types::IdSizes;

    #[test]
    fn redefine_classes_length_prefixes_each_class_file() {
        let packet = CommandPacket::new(
            1,
            Command::VirtualMachine(VirtualMachineCommand::RedefineClasses {
                classes: vec![ClassRedefinition {
                    ref_type: 0x0102,
                    class_file: vec![0xCA, 0xFE, 0xBA, 0xBE],
                }],
            }),
        );
        let sizes = IdSizes {
            object_id: 2,
            ..IdSizes::default()
        };
        let body = &packet.encode(&sizes).unwrap()[HEADER_SIZE..];
        assert_eq!(
            body,
            [
                0, 0, 0, 1, // class count
                0x01, 0x02, // reference type id at width 2
                0, 0, 0, 4, // class file byte count
                0xCA, 0xFE, 0xBA, 0xBE,
            ]
        );
    }

    #[test]
    fn instance_counts_repeats_bare_ids() {
        let packet = CommandPacket::new(
            1,
            Command::VirtualMachine(VirtualMachineCommand::InstanceCounts {
                ref_types: vec![1, 2, 3],
            }),
        );
        let sizes = IdSizes {
            object_id: 4,
            ..IdSizes::default()
        };
        let body = &packet.encode(&sizes).unwrap()[HEADER_SIZE..];
        assert_eq!(body.len(), 4 + 3 * 4);
        assert_eq!(&body[0..4], &[0, 0, 0, 3]);
    }
}
