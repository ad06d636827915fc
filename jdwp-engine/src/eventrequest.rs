// EventRequest command set (15)
//
// EventRequest.Set is the one command with a fully custom wire form:
// event kind, suspend policy, then a counted list of modifiers, each a
// modKind byte followed by its own field list.

use serde::{Deserialize, Serialize};

use crate::codec::Field;
use crate::commands::{event_commands, modifier_kinds};
use crate::types::{FieldId, IdKind, Location, ObjectId, ReferenceTypeId, ThreadId};

/// Which threads the VM suspends when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SuspendPolicy {
    None = 0,
    EventThread = 1,
    All = 2,
}

/// A filter constraining which raw VM occurrences are reported.
#[derive(Debug, Clone)]
pub enum Modifier {
    /// Report every `count`-th occurrence, then expire.
    Count(i32),
    Conditional { expr_id: i32 },
    ThreadOnly(ThreadId),
    ClassOnly(ReferenceTypeId),
    /// Restricted wildcard, e.g. `com.foo.*` or `*.Main`.
    ClassMatch(String),
    ClassExclude(String),
    LocationOnly(Location),
    ExceptionOnly {
        exception_or_null: ReferenceTypeId,
        caught: bool,
        uncaught: bool,
    },
    FieldOnly {
        ref_type: ReferenceTypeId,
        field_id: FieldId,
    },
    Step {
        thread: ThreadId,
        size: i32,
        depth: i32,
    },
    InstanceOnly(ObjectId),
    SourceNameMatch(String),
}

impl Modifier {
    pub fn mod_kind(&self) -> u8 {
        match self {
            Modifier::Count(_) => modifier_kinds::COUNT,
            Modifier::Conditional { .. } => modifier_kinds::CONDITIONAL,
            Modifier::ThreadOnly(_) => modifier_kinds::THREAD_ONLY,
            Modifier::ClassOnly(_) => modifier_kinds::CLASS_ONLY,
            Modifier::ClassMatch(_) => modifier_kinds::CLASS_MATCH,
            Modifier::ClassExclude(_) => modifier_kinds::CLASS_EXCLUDE,
            Modifier::LocationOnly(_) => modifier_kinds::LOCATION_ONLY,
            Modifier::ExceptionOnly { .. } => modifier_kinds::EXCEPTION_ONLY,
            Modifier::FieldOnly { .. } => modifier_kinds::FIELD_ONLY,
            Modifier::Step { .. } => modifier_kinds::STEP,
            Modifier::InstanceOnly(_) => modifier_kinds::INSTANCE_ONLY,
            Modifier::SourceNameMatch(_) => modifier_kinds::SOURCE_NAME_MATCH,
        }
    }

    fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Byte(self.mod_kind())];
        match self {
            Modifier::Count(count) => fields.push(Field::Int(*count)),
            Modifier::Conditional { expr_id } => fields.push(Field::Int(*expr_id)),
            Modifier::ThreadOnly(thread) => fields.push(Field::Id(IdKind::Object, *thread)),
            Modifier::ClassOnly(ref_type) => fields.push(Field::Id(IdKind::Object, *ref_type)),
            Modifier::ClassMatch(pattern) => fields.push(Field::Str(pattern.clone())),
            Modifier::ClassExclude(pattern) => fields.push(Field::Str(pattern.clone())),
            Modifier::LocationOnly(location) => fields.push(Field::Loc(*location)),
            Modifier::ExceptionOnly {
                exception_or_null,
                caught,
                uncaught,
            } => {
                fields.push(Field::Id(IdKind::Object, *exception_or_null));
                fields.push(Field::Boolean(*caught));
                fields.push(Field::Boolean(*uncaught));
            }
            Modifier::FieldOnly { ref_type, field_id } => {
                fields.push(Field::Id(IdKind::Object, *ref_type));
                fields.push(Field::Id(IdKind::Field, *field_id));
            }
            Modifier::Step {
                thread,
                size,
                depth,
            } => {
                fields.push(Field::Id(IdKind::Object, *thread));
                fields.push(Field::Int(*size));
                fields.push(Field::Int(*depth));
            }
            Modifier::InstanceOnly(object) => fields.push(Field::Id(IdKind::Object, *object)),
            Modifier::SourceNameMatch(pattern) => fields.push(Field::Str(pattern.clone())),
        }
        fields
    }
}

#[derive(Debug, Clone)]
pub enum EventRequestCommand {
    /// EventRequest.Set; the reply carries the assigned request id.
    Set {
        event_kind: u8,
        suspend_policy: SuspendPolicy,
        modifiers: Vec<Modifier>,
    },
    Clear {
        event_kind: u8,
        request_id: i32,
    },
    ClearAllBreakpoints,
}

impl EventRequestCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Set { .. } => event_commands::SET,
            Self::Clear { .. } => event_commands::CLEAR,
            Self::ClearAllBreakpoints => event_commands::CLEAR_ALL_BREAKPOINTS,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Set {
                event_kind,
                suspend_policy,
                modifiers,
            } => vec![
                Field::Byte(*event_kind),
                Field::Byte(*suspend_policy as u8),
                Field::Repeat(modifiers.iter().map(Modifier::fields).collect()),
            ],
            Self::Clear {
                event_kind,
                request_id,
            } => vec![Field::Byte(*event_kind), Field::Int(*request_id)],
            Self::ClearAllBreakpoints => Vec::new(),
        }
    }
}
