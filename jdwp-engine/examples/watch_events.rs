// Watch class-prepare events for a package pattern.
//
// Requests ClassPrepare notifications matching the pattern given on the
// command line (default com.example.*), resumes the VM, and prints every
// event that arrives.

use std::sync::Arc;

use jdwp_engine::commands::event_kinds;
use jdwp_engine::eventrequest::{EventRequestCommand, Modifier, SuspendPolicy};
use jdwp_engine::events::{Event, EventHandler};
use jdwp_engine::protocol::Command;
use jdwp_engine::vm::VirtualMachineCommand;
use jdwp_engine::Connection;

struct Printer;

impl EventHandler for Printer {
    fn on_event(&self, event: &Event) {
        println!("event: {event:?}");
    }

    fn on_class_prepare(&self, event: &Event) {
        if let Event::ClassPrepare { signature, .. } = event {
            println!("prepared: {signature}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("jdwp_engine=info")
        .init();

    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "com.example.*".to_string());

    let conn = Connection::open("localhost", 5005).await?;
    conn.register_event_handler(Arc::new(Printer));

    let id = conn.send_message(Command::EventRequest(EventRequestCommand::Set {
        event_kind: event_kinds::CLASS_PREPARE,
        suspend_policy: SuspendPolicy::None,
        modifiers: vec![Modifier::ClassMatch(pattern.clone())],
    }))?;
    let reply = conn.await_reply(id).await?;
    anyhow::ensure!(
        !reply.is_error(),
        "EventRequest.Set failed: {}",
        reply.error_description()
    );
    println!("watching class prepares for {pattern}; press Ctrl-C to stop");

    let id = conn.send_message(Command::VirtualMachine(VirtualMachineCommand::Resume))?;
    conn.await_reply(id).await?;

    tokio::signal::ctrl_c().await?;
    Ok(())
}
