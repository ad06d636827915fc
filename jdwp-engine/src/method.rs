// Method command set (6)

use crate::codec::Field;
use crate::commands::method_commands;
use crate::types::{IdKind, MethodId, ReferenceTypeId};

/// Every command in the set addresses a method within its declaring type.
#[derive(Debug, Clone)]
pub enum MethodCommand {
    LineTable {
        ref_type: ReferenceTypeId,
        method: MethodId,
    },
    VariableTable {
        ref_type: ReferenceTypeId,
        method: MethodId,
    },
    Bytecodes {
        ref_type: ReferenceTypeId,
        method: MethodId,
    },
    IsObsolete {
        ref_type: ReferenceTypeId,
        method: MethodId,
    },
    VariableTableWithGeneric {
        ref_type: ReferenceTypeId,
        method: MethodId,
    },
}

impl MethodCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::LineTable { .. } => method_commands::LINE_TABLE,
            Self::VariableTable { .. } => method_commands::VARIABLE_TABLE,
            Self::Bytecodes { .. } => method_commands::BYTECODES,
            Self::IsObsolete { .. } => method_commands::IS_OBSOLETE,
            Self::VariableTableWithGeneric { .. } => {
                method_commands::VARIABLE_TABLE_WITH_GENERIC
            }
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        let (Self::LineTable { ref_type, method }
        | Self::VariableTable { ref_type, method }
        | Self::Bytecodes { ref_type, method }
        | Self::IsObsolete { ref_type, method }
        | Self::VariableTableWithGeneric { ref_type, method }) = self;
        vec![
            Field::Id(IdKind::Object, *ref_type),
            Field::Id(IdKind::Method, *method),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, CommandPacket, HEADER_SIZE};
    use crate::types::IdSizes;

    #[test]
    fn line_table_writes_type_then_method() {
        let sizes = IdSizes {
            method_id: 4,
            object_id: 8,
            ..IdSizes::default()
        };
        let packet = CommandPacket::new(
            1,
            Command::Method(MethodCommand::LineTable {
                ref_type: 0x0102,
                method: 0x0304,
            }),
        );
        let encoded = packet.encode(&sizes).unwrap();
        assert_eq!(
            &encoded[HEADER_SIZE..],
            &[0, 0, 0, 0, 0, 0, 0x01, 0x02, 0, 0, 0x03, 0x04]
        );
    }
}
