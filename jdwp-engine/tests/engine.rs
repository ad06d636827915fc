// End-to-end tests against a tiny in-process JDWP server.
//
// The mock speaks just enough of the protocol to exercise the engine:
// handshake, IDSizes negotiation, scripted replies, and raw event
// injection. Everything runs over a loopback TCP socket.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use jdwp_engine::codec::{JdwpReader, JdwpWriter};
use jdwp_engine::commands::{command_sets, event_kinds};
use jdwp_engine::events::{Event, EventHandler};
use jdwp_engine::protocol::{Command, JdwpError, HEADER_SIZE, JDWP_HANDSHAKE, REPLY_FLAG};
use jdwp_engine::thread::ThreadReferenceCommand;
use jdwp_engine::types::{IdKind, IdSizes, Location};
use jdwp_engine::vm::VirtualMachineCommand;
use jdwp_engine::Connection;

/// A command packet as seen by the mock VM.
#[derive(Debug)]
struct RawCommand {
    id: u32,
    command_set: u8,
    command: u8,
    data: Vec<u8>,
}

/// Minimal scripted JDWP server: answers the handshake and IDSizes by
/// itself, records every other command, and writes whatever bytes the
/// test injects.
struct MockVm {
    addr: std::net::SocketAddr,
    received: mpsc::UnboundedReceiver<RawCommand>,
    inject: mpsc::UnboundedSender<Vec<u8>>,
    reader_task: tokio::task::JoinHandle<()>,
    writer_task: tokio::task::JoinHandle<()>,
}

impl MockVm {
    async fn spawn(id_sizes: [i32; 5]) -> MockVm {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (received_tx, received) = mpsc::unbounded_channel();
        let (inject_tx, mut inject_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let reply_tx = inject_tx.clone();

        let (stream_tx, stream_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut handshake = [0u8; 14];
            stream.read_exact(&mut handshake).await.unwrap();
            assert_eq!(&handshake[..], JDWP_HANDSHAKE);
            stream.write_all(JDWP_HANDSHAKE).await.unwrap();
            let _ = stream_tx.send(stream);
        });
        let stream = stream_rx.await.unwrap();
        let (mut read_half, mut write_half) = stream.into_split();

        let reader_task = tokio::spawn(async move {
            loop {
                let mut header = [0u8; HEADER_SIZE];
                if read_half.read_exact(&mut header).await.is_err() {
                    break;
                }
                let length =
                    u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
                let mut data = vec![0u8; length - HEADER_SIZE];
                if read_half.read_exact(&mut data).await.is_err() {
                    break;
                }
                let id = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
                let (command_set, command) = (header[9], header[10]);

                if command_set == command_sets::VIRTUAL_MACHINE && command == 7 {
                    let mut body = JdwpWriter::new();
                    for size in id_sizes {
                        body.write_i32(size);
                    }
                    let _ = reply_tx.send(reply_packet(id, 0, &body.into_vec()));
                    continue;
                }

                if received_tx
                    .send(RawCommand {
                        id,
                        command_set,
                        command,
                        data,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        let writer_task = tokio::spawn(async move {
            while let Some(bytes) = inject_rx.recv().await {
                if write_half.write_all(&bytes).await.is_err() {
                    break;
                }
            }
        });

        MockVm {
            addr,
            received,
            inject: inject_tx,
            reader_task,
            writer_task,
        }
    }

    async fn recv_command(&mut self) -> RawCommand {
        timeout(Duration::from_secs(5), self.received.recv())
            .await
            .expect("timed out waiting for a command")
            .expect("mock VM reader stopped")
    }

    fn reply_to(&self, id: u32, error_code: u16, body: &[u8]) {
        self.inject.send(reply_packet(id, error_code, body)).unwrap();
    }

    fn inject_raw(&self, bytes: Vec<u8>) {
        self.inject.send(bytes).unwrap();
    }

    /// Drop the socket to simulate the debuggee going away.
    fn disconnect(&self) {
        self.reader_task.abort();
        self.writer_task.abort();
    }
}

fn reply_packet(id: u32, error_code: u16, body: &[u8]) -> Vec<u8> {
    let mut w = JdwpWriter::new();
    w.write_u32((HEADER_SIZE + body.len()) as u32);
    w.write_u32(id);
    w.write_u8(REPLY_FLAG);
    w.write_u16(error_code);
    w.write_bytes(body);
    w.into_vec()
}

fn composite_packet(suspend_policy: u8, records: &[Vec<u8>]) -> Vec<u8> {
    let mut body = JdwpWriter::new();
    body.write_u8(suspend_policy);
    body.write_u32(records.len() as u32);
    for record in records {
        body.write_bytes(record);
    }
    let body = body.into_vec();

    let mut w = JdwpWriter::new();
    w.write_u32((HEADER_SIZE + body.len()) as u32);
    w.write_u32(0);
    w.write_u8(0x00);
    w.write_u8(command_sets::EVENT);
    w.write_u8(100);
    w.write_bytes(&body);
    w.into_vec()
}

#[tokio::test]
async fn open_negotiates_id_sizes_and_serializes_with_them() {
    let mut vm = MockVm::spawn([4, 4, 4, 4, 4]).await;
    let conn = Connection::open("127.0.0.1", vm.addr.port()).await.unwrap();

    assert_eq!(conn.object_id_size(), 4);
    assert_eq!(conn.method_id_size(), 4);
    assert_eq!(conn.field_id_size(), 4);
    assert_eq!(conn.frame_id_size(), 4);

    let id = conn
        .send_message(Command::ThreadReference(ThreadReferenceCommand::Name {
            thread: 0x0A0B_0C0D,
        }))
        .unwrap();

    let seen = vm.recv_command().await;
    assert_eq!(seen.id, id);
    assert_eq!(seen.command_set, command_sets::THREAD_REFERENCE);
    assert_eq!(seen.command, 1);
    // the thread id went out at the negotiated 4-byte width
    assert_eq!(seen.data, [0x0A, 0x0B, 0x0C, 0x0D]);

    let mut body = JdwpWriter::new();
    body.write_string("main");
    vm.reply_to(id, 0, &body.into_vec());

    let reply = timeout(Duration::from_secs(5), conn.await_reply(id))
        .await
        .unwrap()
        .unwrap();
    assert!(!reply.is_error());
    let mut r = JdwpReader::new(reply.data());
    assert_eq!(r.read_string().unwrap(), "main");
}

#[tokio::test]
async fn replies_correlate_by_id_in_any_order() {
    let mut vm = MockVm::spawn([8, 8, 8, 8, 8]).await;
    let conn = Connection::open("127.0.0.1", vm.addr.port()).await.unwrap();

    let first = conn
        .send_message(Command::VirtualMachine(VirtualMachineCommand::Version))
        .unwrap();
    let second = conn
        .send_message(Command::VirtualMachine(VirtualMachineCommand::AllThreads))
        .unwrap();
    assert_ne!(first, second);

    let seen_first = vm.recv_command().await;
    let seen_second = vm.recv_command().await;
    // FIFO transmission from a single caller
    assert_eq!(seen_first.id, first);
    assert_eq!(seen_second.id, second);

    vm.reply_to(second, 0, &[2]);
    vm.reply_to(first, 0, &[1]);

    let reply_first = timeout(Duration::from_secs(5), conn.await_reply(first))
        .await
        .unwrap()
        .unwrap();
    let reply_second = timeout(Duration::from_secs(5), conn.await_reply(second))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply_first.data(), &[1]);
    assert_eq!(reply_second.data(), &[2]);
}

#[tokio::test]
async fn vm_error_codes_pass_through_verbatim() {
    let mut vm = MockVm::spawn([8, 8, 8, 8, 8]).await;
    let conn = Connection::open("127.0.0.1", vm.addr.port()).await.unwrap();

    let id = conn
        .send_message(Command::VirtualMachine(VirtualMachineCommand::Resume))
        .unwrap();
    let seen = vm.recv_command().await;
    vm.reply_to(seen.id, 112, &[]);

    let reply = timeout(Duration::from_secs(5), conn.await_reply(id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.error_code, 112);
    assert_eq!(reply.error_description(), "VM_DEAD");
}

#[tokio::test]
async fn packet_ids_are_pairwise_distinct() {
    let mut vm = MockVm::spawn([8, 8, 8, 8, 8]).await;
    let conn = Connection::open("127.0.0.1", vm.addr.port()).await.unwrap();

    let mut ids = std::collections::HashSet::new();
    for _ in 0..50 {
        let id = conn
            .send_message(Command::VirtualMachine(VirtualMachineCommand::Suspend))
            .unwrap();
        assert!(ids.insert(id), "duplicate packet id {id}");
        let seen = vm.recv_command().await;
        vm.reply_to(seen.id, 0, &[]);
    }
}

struct ChannelHandler(mpsc::UnboundedSender<Event>);

impl EventHandler for ChannelHandler {
    fn on_breakpoint(&self, event: &Event) {
        let _ = self.0.send(event.clone());
    }

    fn on_vm_death(&self, event: &Event) {
        let _ = self.0.send(event.clone());
    }
}

#[tokio::test]
async fn composite_events_fan_out_to_handlers_in_order() {
    let vm = MockVm::spawn([8, 8, 8, 8, 8]).await;
    let conn = Connection::open("127.0.0.1", vm.addr.port()).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    conn.register_event_handler(Arc::new(ChannelHandler(tx)));

    let sizes = IdSizes::default();
    let location = Location::new(1, 0xC1A5, 0x3E7, 9);
    let mut breakpoint = JdwpWriter::new();
    breakpoint.write_u8(event_kinds::BREAKPOINT);
    breakpoint.write_i32(3);
    breakpoint.write_id(IdKind::Object, 0x7EAD, &sizes).unwrap();
    breakpoint.write_location(&location, &sizes).unwrap();

    let mut vm_death = JdwpWriter::new();
    vm_death.write_u8(event_kinds::VM_DEATH);
    vm_death.write_i32(0);

    vm.inject_raw(composite_packet(
        2,
        &[breakpoint.into_vec(), vm_death.into_vec()],
    ));

    let first = timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        first,
        Event::Breakpoint {
            request_id: 3,
            thread: 0x7EAD,
            location,
        }
    );
    let second = timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, Event::VmDeath { request_id: 0 });
}

#[tokio::test]
async fn disconnect_wakes_pending_awaits() {
    let mut vm = MockVm::spawn([8, 8, 8, 8, 8]).await;
    let conn = Connection::open("127.0.0.1", vm.addr.port()).await.unwrap();

    let id = conn
        .send_message(Command::VirtualMachine(VirtualMachineCommand::AllClasses))
        .unwrap();
    let _ = vm.recv_command().await;
    vm.disconnect();

    let result = timeout(Duration::from_secs(5), conn.await_reply(id))
        .await
        .unwrap();
    assert!(matches!(result, Err(JdwpError::ConnectionClosed)));
}

#[tokio::test]
async fn closed_connections_reject_further_use() {
    let _vm = MockVm::spawn([8, 8, 8, 8, 8]).await;
    let mut conn = Connection::open("127.0.0.1", _vm.addr.port()).await.unwrap();

    conn.close().await;
    assert!(conn.is_closed());
    assert!(matches!(
        conn.send_message(Command::VirtualMachine(VirtualMachineCommand::Version)),
        Err(JdwpError::ConnectionClosed)
    ));

    // an id nobody registered is API misuse, not a transport failure
    assert!(matches!(
        conn.await_reply(0xDEAD).await,
        Err(JdwpError::Logic(_))
    ));
}

#[tokio::test]
async fn handshake_mismatch_is_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 14];
        stream.read_exact(&mut buf).await.unwrap();
        stream.write_all(b"NOT-A-DEBUGGEE").await.unwrap();
        // keep the socket open so the client sees the bad bytes
        tokio::time::sleep(Duration::from_secs(1)).await;
    });

    let result = Connection::open("127.0.0.1", addr.port()).await;
    assert!(matches!(result, Err(JdwpError::InvalidHandshake)));
}

#[tokio::test]
async fn socket_readiness_probe_reports_pending_bytes() {
    use jdwp_engine::socket::JdwpSocket;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 14];
        stream.read_exact(&mut buf).await.unwrap();
        stream.write_all(JDWP_HANDSHAKE).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        stream.write_all(&[0xFF]).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
    });

    let socket = JdwpSocket::connect("127.0.0.1", addr.port()).await.unwrap();
    assert!(!socket.can_read().await.unwrap());

    let mut ready = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if socket.can_read().await.unwrap() {
            ready = true;
            break;
        }
    }
    assert!(ready, "byte never became visible to the readiness probe");
}
