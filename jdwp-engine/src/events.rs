// JDWP event handling
//
// The VM reports occurrences as composite packets (command set 64,
// command 100): one suspend policy, then a counted list of event records.
// Records are parsed in encounter order and fanned out to registered
// handlers on the reader task.

use serde::{Deserialize, Serialize};

use crate::codec::JdwpReader;
use crate::commands::event_kinds;
use crate::protocol::{header_is_event, JdwpError, JdwpResult, HEADER_SIZE};
use crate::types::{
    FieldId, IdKind, IdSizes, Location, ReferenceTypeId, TaggedObjectId, ThreadId, Value,
};
use crate::wire;

/// One parsed composite packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSet {
    /// Which threads the VM suspended before reporting; not consulted for
    /// dispatch.
    pub suspend_policy: u8,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    VmStart {
        request_id: i32,
        thread: ThreadId,
    },
    SingleStep {
        request_id: i32,
        thread: ThreadId,
        location: Location,
    },
    Breakpoint {
        request_id: i32,
        thread: ThreadId,
        location: Location,
    },
    MethodEntry {
        request_id: i32,
        thread: ThreadId,
        location: Location,
    },
    MethodExit {
        request_id: i32,
        thread: ThreadId,
        location: Location,
    },
    MethodExitWithReturnValue {
        request_id: i32,
        thread: ThreadId,
        location: Location,
        return_value: Value,
    },
    MonitorContendedEnter {
        request_id: i32,
        thread: ThreadId,
        monitor: TaggedObjectId,
        location: Location,
    },
    MonitorContendedEntered {
        request_id: i32,
        thread: ThreadId,
        monitor: TaggedObjectId,
        location: Location,
    },
    MonitorWait {
        request_id: i32,
        thread: ThreadId,
        monitor: TaggedObjectId,
        location: Location,
        timeout_ms: i64,
    },
    MonitorWaited {
        request_id: i32,
        thread: ThreadId,
        monitor: TaggedObjectId,
        location: Location,
        timed_out: bool,
    },
    Exception {
        request_id: i32,
        thread: ThreadId,
        location: Location,
        exception: TaggedObjectId,
        /// `None` when the exception is uncaught (the VM sends an
        /// all-zero location).
        catch_location: Option<Location>,
    },
    ThreadStart {
        request_id: i32,
        thread: ThreadId,
    },
    ThreadDeath {
        request_id: i32,
        thread: ThreadId,
    },
    ClassPrepare {
        request_id: i32,
        thread: ThreadId,
        ref_type_tag: u8,
        ref_type: ReferenceTypeId,
        signature: String,
        status: i32,
    },
    ClassUnload {
        request_id: i32,
        signature: String,
    },
    FieldAccess {
        request_id: i32,
        thread: ThreadId,
        location: Location,
        ref_type_tag: u8,
        ref_type: ReferenceTypeId,
        field_id: FieldId,
        object: TaggedObjectId,
    },
    FieldModification {
        request_id: i32,
        thread: ThreadId,
        location: Location,
        ref_type_tag: u8,
        ref_type: ReferenceTypeId,
        field_id: FieldId,
        object: TaggedObjectId,
        value_to_be: Value,
    },
    VmDeath {
        request_id: i32,
    },
}

impl Event {
    /// The wire-level event kind.
    pub fn kind(&self) -> u8 {
        match self {
            Event::VmStart { .. } => event_kinds::VM_START,
            Event::SingleStep { .. } => event_kinds::SINGLE_STEP,
            Event::Breakpoint { .. } => event_kinds::BREAKPOINT,
            Event::MethodEntry { .. } => event_kinds::METHOD_ENTRY,
            Event::MethodExit { .. } => event_kinds::METHOD_EXIT,
            Event::MethodExitWithReturnValue { .. } => {
                event_kinds::METHOD_EXIT_WITH_RETURN_VALUE
            }
            Event::MonitorContendedEnter { .. } => event_kinds::MONITOR_CONTENDED_ENTER,
            Event::MonitorContendedEntered { .. } => event_kinds::MONITOR_CONTENDED_ENTERED,
            Event::MonitorWait { .. } => event_kinds::MONITOR_WAIT,
            Event::MonitorWaited { .. } => event_kinds::MONITOR_WAITED,
            Event::Exception { .. } => event_kinds::EXCEPTION,
            Event::ThreadStart { .. } => event_kinds::THREAD_START,
            Event::ThreadDeath { .. } => event_kinds::THREAD_DEATH,
            Event::ClassPrepare { .. } => event_kinds::CLASS_PREPARE,
            Event::ClassUnload { .. } => event_kinds::CLASS_UNLOAD,
            Event::FieldAccess { .. } => event_kinds::FIELD_ACCESS,
            Event::FieldModification { .. } => event_kinds::FIELD_MODIFICATION,
            Event::VmDeath { .. } => event_kinds::VM_DEATH,
        }
    }

    /// The id of the event request that produced this event, 0 for
    /// automatic events.
    pub fn request_id(&self) -> i32 {
        match self {
            Event::VmStart { request_id, .. }
            | Event::SingleStep { request_id, .. }
            | Event::Breakpoint { request_id, .. }
            | Event::MethodEntry { request_id, .. }
            | Event::MethodExit { request_id, .. }
            | Event::MethodExitWithReturnValue { request_id, .. }
            | Event::MonitorContendedEnter { request_id, .. }
            | Event::MonitorContendedEntered { request_id, .. }
            | Event::MonitorWait { request_id, .. }
            | Event::MonitorWaited { request_id, .. }
            | Event::Exception { request_id, .. }
            | Event::ThreadStart { request_id, .. }
            | Event::ThreadDeath { request_id, .. }
            | Event::ClassPrepare { request_id, .. }
            | Event::ClassUnload { request_id, .. }
            | Event::FieldAccess { request_id, .. }
            | Event::FieldModification { request_id, .. }
            | Event::VmDeath { request_id } => *request_id,
        }
    }
}

/// Parse a full composite event packet, header included.
///
/// The packet must classify as an event (reply bit clear, command set 64,
/// command 100) and the records must account for every body byte.
pub fn parse_composite(packet: &[u8], sizes: &IdSizes) -> JdwpResult<EventSet> {
    if packet.len() < HEADER_SIZE {
        return Err(JdwpError::protocol(packet.len(), "packet shorter than header"));
    }
    let length = wire::read_u32_be(&packet[0..4]) as usize;
    if length != packet.len() {
        return Err(JdwpError::protocol(
            0,
            format!("length field {length} does not match packet of {} bytes", packet.len()),
        ));
    }
    if !header_is_event(packet) {
        return Err(JdwpError::protocol(
            8,
            "packet does not classify as a composite event",
        ));
    }

    let mut r = JdwpReader::new(&packet[HEADER_SIZE..]);
    let suspend_policy = r.read_u8()?;
    let count = r.read_u32()? as usize;
    let mut events = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        events.push(parse_event(&mut r, sizes)?);
    }
    if r.remaining() != 0 {
        return Err(JdwpError::protocol(
            HEADER_SIZE + r.position(),
            format!("{} trailing bytes after last event record", r.remaining()),
        ));
    }

    Ok(EventSet {
        suspend_policy,
        events,
    })
}

fn parse_event(r: &mut JdwpReader<'_>, sizes: &IdSizes) -> JdwpResult<Event> {
    let kind_at = r.position();
    let kind = r.read_u8()?;
    let request_id = r.read_i32()?;

    let event = match kind {
        event_kinds::VM_START => Event::VmStart {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
        },
        event_kinds::SINGLE_STEP => Event::SingleStep {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
        },
        event_kinds::BREAKPOINT => Event::Breakpoint {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
        },
        event_kinds::METHOD_ENTRY => Event::MethodEntry {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
        },
        event_kinds::METHOD_EXIT => Event::MethodExit {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
        },
        event_kinds::METHOD_EXIT_WITH_RETURN_VALUE => Event::MethodExitWithReturnValue {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
            return_value: r.read_value(sizes)?,
        },
        event_kinds::MONITOR_CONTENDED_ENTER => Event::MonitorContendedEnter {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            monitor: r.read_tagged_object_id(sizes)?,
            location: r.read_location(sizes)?,
        },
        event_kinds::MONITOR_CONTENDED_ENTERED => Event::MonitorContendedEntered {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            monitor: r.read_tagged_object_id(sizes)?,
            location: r.read_location(sizes)?,
        },
        event_kinds::MONITOR_WAIT => Event::MonitorWait {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            monitor: r.read_tagged_object_id(sizes)?,
            location: r.read_location(sizes)?,
            timeout_ms: r.read_i64()?,
        },
        event_kinds::MONITOR_WAITED => Event::MonitorWaited {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            monitor: r.read_tagged_object_id(sizes)?,
            location: r.read_location(sizes)?,
            timed_out: r.read_bool()?,
        },
        event_kinds::EXCEPTION => {
            let thread = r.read_id(IdKind::Object, sizes)?;
            let location = r.read_location(sizes)?;
            let exception = r.read_tagged_object_id(sizes)?;
            let catch_location = r.read_location(sizes)?;
            Event::Exception {
                request_id,
                thread,
                location,
                exception,
                catch_location: (!catch_location.is_null()).then_some(catch_location),
            }
        }
        event_kinds::THREAD_START => Event::ThreadStart {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
        },
        event_kinds::THREAD_DEATH => Event::ThreadDeath {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
        },
        event_kinds::CLASS_PREPARE => Event::ClassPrepare {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            ref_type_tag: r.read_u8()?,
            ref_type: r.read_id(IdKind::Object, sizes)?,
            signature: r.read_string()?,
            status: r.read_i32()?,
        },
        event_kinds::CLASS_UNLOAD => Event::ClassUnload {
            request_id,
            signature: r.read_string()?,
        },
        event_kinds::FIELD_ACCESS => Event::FieldAccess {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
            ref_type_tag: r.read_u8()?,
            ref_type: r.read_id(IdKind::Object, sizes)?,
            field_id: r.read_id(IdKind::Field, sizes)?,
            object: r.read_tagged_object_id(sizes)?,
        },
        event_kinds::FIELD_MODIFICATION => Event::FieldModification {
            request_id,
            thread: r.read_id(IdKind::Object, sizes)?,
            location: r.read_location(sizes)?,
            ref_type_tag: r.read_u8()?,
            ref_type: r.read_id(IdKind::Object, sizes)?,
            field_id: r.read_id(IdKind::Field, sizes)?,
            object: r.read_tagged_object_id(sizes)?,
            value_to_be: r.read_value(sizes)?,
        },
        event_kinds::VM_DEATH => Event::VmDeath { request_id },
        other => {
            return Err(JdwpError::protocol(
                HEADER_SIZE + kind_at,
                format!("unknown event kind {other}"),
            ))
        }
    };
    Ok(event)
}

/// Receives events on the connection's reader task.
///
/// Override the kinds you care about; everything else lands in
/// `on_event`. Handlers must not block waiting for replies to commands
/// they send (enqueueing new commands is fine).
pub trait EventHandler: Send + Sync {
    /// Catch-all for kinds without an override.
    fn on_event(&self, event: &Event) {
        let _ = event;
    }

    fn on_vm_start(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_single_step(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_breakpoint(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_method_entry(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_method_exit(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_method_exit_with_return_value(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_monitor_contended_enter(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_monitor_contended_entered(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_monitor_wait(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_monitor_waited(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_exception(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_thread_start(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_thread_death(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_class_prepare(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_class_unload(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_field_access(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_field_modification(&self, event: &Event) {
        self.on_event(event)
    }

    fn on_vm_death(&self, event: &Event) {
        self.on_event(event)
    }
}

/// Route an event to the handler method matching its kind.
pub fn dispatch(handler: &dyn EventHandler, event: &Event) {
    match event {
        Event::VmStart { .. } => handler.on_vm_start(event),
        Event::SingleStep { .. } => handler.on_single_step(event),
        Event::Breakpoint { .. } => handler.on_breakpoint(event),
        Event::MethodEntry { .. } => handler.on_method_entry(event),
        Event::MethodExit { .. } => handler.on_method_exit(event),
        Event::MethodExitWithReturnValue { .. } => {
            handler.on_method_exit_with_return_value(event)
        }
        Event::MonitorContendedEnter { .. } => handler.on_monitor_contended_enter(event),
        Event::MonitorContendedEntered { .. } => handler.on_monitor_contended_entered(event),
        Event::MonitorWait { .. } => handler.on_monitor_wait(event),
        Event::MonitorWaited { .. } => handler.on_monitor_waited(event),
        Event::Exception { .. } => handler.on_exception(event),
        Event::ThreadStart { .. } => handler.on_thread_start(event),
        Event::ThreadDeath { .. } => handler.on_thread_death(event),
        Event::ClassPrepare { .. } => handler.on_class_prepare(event),
        Event::ClassUnload { .. } => handler.on_class_unload(event),
        Event::FieldAccess { .. } => handler.on_field_access(event),
        Event::FieldModification { .. } => handler.on_field_modification(event),
        Event::VmDeath { .. } => handler.on_vm_death(event),
    }
}
