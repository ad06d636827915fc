// Attach to a JVM started with
//   java -agentlib:jdwp=transport=dt_socket,server=y,suspend=n,address=5005 ...
// and print its version banner.

use jdwp_engine::codec::JdwpReader;
use jdwp_engine::protocol::Command;
use jdwp_engine::vm::VirtualMachineCommand;
use jdwp_engine::Connection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("jdwp_engine=debug")
        .init();

    let mut conn = Connection::open("localhost", 5005).await?;
    println!("connected; object id width = {} bytes", conn.object_id_size());

    let id = conn.send_message(Command::VirtualMachine(VirtualMachineCommand::Version))?;
    let reply = conn.await_reply(id).await?;
    if reply.is_error() {
        println!(
            "VM refused Version: {} ({})",
            reply.error_code,
            reply.error_description()
        );
    } else {
        let mut r = JdwpReader::new(reply.data());
        let description = r.read_string()?;
        let jdwp_major = r.read_i32()?;
        let jdwp_minor = r.read_i32()?;
        let vm_version = r.read_string()?;
        let vm_name = r.read_string()?;
        println!("{description}");
        println!("JDWP {jdwp_major}.{jdwp_minor} on {vm_name} {vm_version}");
    }

    conn.close().await;
    Ok(())
}
