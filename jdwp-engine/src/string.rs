// StringReference command set (10)

use crate::codec::Field;
use crate::commands::string_reference_commands;
use crate::types::{IdKind, StringId};

#[derive(Debug, Clone)]
pub enum StringReferenceCommand {
    /// StringReference.Value: fetch the UTF contents of a string object.
    Value { string: StringId },
}

impl StringReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Value { .. } => string_reference_commands::VALUE,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Value { string } => vec![Field::Id(IdKind::Object, *string)],
        }
    }
}
