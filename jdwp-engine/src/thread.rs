// ThreadReference (11) and ThreadGroupReference (12) command sets

use crate::codec::Field;
use crate::commands::{thread_commands, thread_group_commands};
use crate::types::{IdKind, ObjectId, ThreadGroupId, ThreadId, Value};

#[derive(Debug, Clone)]
pub enum ThreadReferenceCommand {
    Name {
        thread: ThreadId,
    },
    Suspend {
        thread: ThreadId,
    },
    Resume {
        thread: ThreadId,
    },
    Status {
        thread: ThreadId,
    },
    ThreadGroup {
        thread: ThreadId,
    },
    /// `start_frame` 0 is the current frame; `length` -1 means all
    /// remaining frames.
    Frames {
        thread: ThreadId,
        start_frame: i32,
        length: i32,
    },
    FrameCount {
        thread: ThreadId,
    },
    OwnedMonitors {
        thread: ThreadId,
    },
    CurrentContendedMonitor {
        thread: ThreadId,
    },
    /// Asynchronously throw `throwable` in the target thread.
    Stop {
        thread: ThreadId,
        throwable: ObjectId,
    },
    Interrupt {
        thread: ThreadId,
    },
    SuspendCount {
        thread: ThreadId,
    },
    OwnedMonitorsStackDepthInfo {
        thread: ThreadId,
    },
    ForceEarlyReturn {
        thread: ThreadId,
        value: Value,
    },
}

impl ThreadReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Name { .. } => thread_commands::NAME,
            Self::Suspend { .. } => thread_commands::SUSPEND,
            Self::Resume { .. } => thread_commands::RESUME,
            Self::Status { .. } => thread_commands::STATUS,
            Self::ThreadGroup { .. } => thread_commands::THREAD_GROUP,
            Self::Frames { .. } => thread_commands::FRAMES,
            Self::FrameCount { .. } => thread_commands::FRAME_COUNT,
            Self::OwnedMonitors { .. } => thread_commands::OWNED_MONITORS,
            Self::CurrentContendedMonitor { .. } => thread_commands::CURRENT_CONTENDED_MONITOR,
            Self::Stop { .. } => thread_commands::STOP,
            Self::Interrupt { .. } => thread_commands::INTERRUPT,
            Self::SuspendCount { .. } => thread_commands::SUSPEND_COUNT,
            Self::OwnedMonitorsStackDepthInfo { .. } => {
                thread_commands::OWNED_MONITORS_STACK_DEPTH_INFO
            }
            Self::ForceEarlyReturn { .. } => thread_commands::FORCE_EARLY_RETURN,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        match self {
            Self::Name { thread }
            | Self::Suspend { thread }
            | Self::Resume { thread }
            | Self::Status { thread }
            | Self::ThreadGroup { thread }
            | Self::FrameCount { thread }
            | Self::OwnedMonitors { thread }
            | Self::CurrentContendedMonitor { thread }
            | Self::Interrupt { thread }
            | Self::SuspendCount { thread }
            | Self::OwnedMonitorsStackDepthInfo { thread } => {
                vec![Field::Id(IdKind::Object, *thread)]
            }
            Self::Frames {
                thread,
                start_frame,
                length,
            } => vec![
                Field::Id(IdKind::Object, *thread),
                Field::Int(*start_frame),
                Field::Int(*length),
            ],
            Self::Stop { thread, throwable } => vec![
                Field::Id(IdKind::Object, *thread),
                Field::Id(IdKind::Object, *throwable),
            ],
            Self::ForceEarlyReturn { thread, value } => vec![
                Field::Id(IdKind::Object, *thread),
                Field::Tagged(value.clone()),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ThreadGroupReferenceCommand {
    Name { group: ThreadGroupId },
    Parent { group: ThreadGroupId },
    Children { group: ThreadGroupId },
}

impl ThreadGroupReferenceCommand {
    pub fn command(&self) -> u8 {
        match self {
            Self::Name { .. } => thread_group_commands::NAME,
            Self::Parent { .. } => thread_group_commands::PARENT,
            Self::Children { .. } => thread_group_commands::CHILDREN,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        let (Self::Name { group } | Self::Parent { group } | Self::Children { group }) = self;
        vec![Field::Id(IdKind::Object, *group)]
    }
}
