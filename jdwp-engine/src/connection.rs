// JDWP connection engine
//
// Owns the socket halves, a writer task draining the outbound queue, and
// a reader task demultiplexing inbound packets: replies complete the
// pending slot matching their id, composite events fan out to registered
// handlers. Identifier widths are negotiated once via
// VirtualMachine.IDSizes before `open` returns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::codec::JdwpReader;
use crate::events::{dispatch, parse_composite, EventHandler};
use crate::protocol::{
    header_is_event, Command, CommandPacket, JdwpError, JdwpResult, ReplyPacket, HEADER_SIZE,
    REPLY_FLAG,
};
use crate::socket::JdwpSocket;
use crate::types::IdSizes;
use crate::vm::VirtualMachineCommand;
use crate::wire;

/// Maximum allowed inbound packet size (10MB). Prevents memory
/// exhaustion from a malicious or buggy VM.
const MAX_PACKET_SIZE: usize = 10 * 1024 * 1024;

type ReplySlot = oneshot::Sender<JdwpResult<ReplyPacket>>;
type ReplyWaiter = oneshot::Receiver<JdwpResult<ReplyPacket>>;

struct Inner {
    outbound: mpsc::UnboundedSender<CommandPacket>,
    pending: Mutex<HashMap<u32, ReplySlot>>,
    waiters: Mutex<HashMap<u32, ReplyWaiter>>,
    handlers: Mutex<Vec<Arc<dyn EventHandler>>>,
    id_sizes: RwLock<IdSizes>,
    next_id: AtomicU32,
    shutdown: CancellationToken,
}

impl Inner {
    fn sizes(&self) -> IdSizes {
        *self.id_sizes.read().unwrap()
    }

    fn fail_pending(&self, id: u32, err: JdwpError) {
        if let Some(tx) = self.pending.lock().unwrap().remove(&id) {
            let _ = tx.send(Err(err));
        }
    }

    fn fail_all_pending(&self) {
        let pending = std::mem::take(&mut *self.pending.lock().unwrap());
        for (_, tx) in pending {
            let _ = tx.send(Err(JdwpError::ConnectionClosed));
        }
    }
}

/// A live JDWP connection.
pub struct Connection {
    inner: Arc<Inner>,
    writer_task: Option<JoinHandle<()>>,
    reader_task: Option<JoinHandle<()>>,
}

impl Connection {
    /// Connect, handshake, start both I/O tasks, and negotiate
    /// identifier widths.
    pub async fn open(host: &str, port: u16) -> JdwpResult<Self> {
        info!("opening JDWP connection to {host}:{port}");
        let socket = JdwpSocket::connect(host, port).await?;
        let (read_half, write_half) = socket.into_split();

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            outbound: outbound_tx,
            pending: Mutex::new(HashMap::new()),
            waiters: Mutex::new(HashMap::new()),
            handlers: Mutex::new(Vec::new()),
            id_sizes: RwLock::new(IdSizes::default()),
            next_id: AtomicU32::new(1),
            shutdown: CancellationToken::new(),
        });

        let writer_task = tokio::spawn(writer_loop(write_half, outbound_rx, inner.clone()));
        let reader_task = tokio::spawn(reader_loop(read_half, inner.clone()));

        let connection = Self {
            inner,
            writer_task: Some(writer_task),
            reader_task: Some(reader_task),
        };
        connection.negotiate_id_sizes().await?;
        Ok(connection)
    }

    /// Variable-width serialization needs the VM's answer before any
    /// command carrying identifiers goes out, so this runs inside `open`.
    async fn negotiate_id_sizes(&self) -> JdwpResult<()> {
        let id = self.send_message(Command::VirtualMachine(VirtualMachineCommand::IdSizes))?;
        let reply = self.await_reply(id).await?;
        if reply.is_error() {
            warn!(
                "IDSizes failed with {} ({}); keeping 8-byte defaults",
                reply.error_code,
                reply.error_description()
            );
            return Ok(());
        }

        let mut r = JdwpReader::new(reply.data());
        let sizes = IdSizes {
            field_id: r.read_i32()? as usize,
            method_id: r.read_i32()? as usize,
            object_id: r.read_i32()? as usize,
            reference_type_id: r.read_i32()? as usize,
            frame_id: r.read_i32()? as usize,
        };
        debug!(?sizes, "identifier widths negotiated");
        *self.inner.id_sizes.write().unwrap() = sizes;
        Ok(())
    }

    /// Enqueue a command and return its assigned packet id immediately.
    ///
    /// Packets from one caller transmit in FIFO order; the reply arrives
    /// whenever the VM answers and is claimed with [`Connection::await_reply`].
    pub fn send_message(&self, command: Command) -> JdwpResult<u32> {
        if self.inner.shutdown.is_cancelled() {
            return Err(JdwpError::ConnectionClosed);
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().unwrap().insert(id, tx);
        self.inner.waiters.lock().unwrap().insert(id, rx);

        let packet = CommandPacket::new(id, command);
        self.inner
            .outbound
            .send(packet)
            .map_err(|_| JdwpError::ConnectionClosed)?;
        Ok(id)
    }

    /// Block until the reply for `id` arrives or the connection closes.
    ///
    /// The VM's error code comes back verbatim inside the packet; only
    /// transport-level failures surface as errors here.
    pub async fn await_reply(&self, id: u32) -> JdwpResult<ReplyPacket> {
        let waiter = self.inner.waiters.lock().unwrap().remove(&id);
        let Some(rx) = waiter else {
            return Err(JdwpError::Logic(format!(
                "no outstanding request with id {id}"
            )));
        };
        match rx.await {
            Ok(result) => result,
            // Slot dropped without a send: teardown raced us.
            Err(_) => Err(JdwpError::ConnectionClosed),
        }
    }

    /// Register a handler for future events. Handlers run on the reader
    /// task and must not block on replies to commands they enqueue.
    pub fn register_event_handler(&self, handler: Arc<dyn EventHandler>) {
        self.inner.handlers.lock().unwrap().push(handler);
    }

    /// Identifier widths currently in force.
    pub fn id_sizes(&self) -> IdSizes {
        self.inner.sizes()
    }

    pub fn object_id_size(&self) -> usize {
        self.inner.sizes().object_id
    }

    pub fn method_id_size(&self) -> usize {
        self.inner.sizes().method_id
    }

    pub fn field_id_size(&self) -> usize {
        self.inner.sizes().field_id
    }

    pub fn frame_id_size(&self) -> usize {
        self.inner.sizes().frame_id
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Graceful teardown: cancel both tasks, join them, and wake every
    /// pending `await_reply` with `ConnectionClosed`.
    pub async fn close(&mut self) {
        self.inner.shutdown.cancel();
        if let Some(task) = self.writer_task.take() {
            let _ = task.await;
        }
        if let Some(task) = self.reader_task.take() {
            let _ = task.await;
        }
        self.inner.fail_all_pending();
        info!("JDWP connection closed");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Tasks observe the token, drain the pending map, and drop the
        // socket halves on their way out.
        self.inner.shutdown.cancel();
    }
}

async fn writer_loop(
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<CommandPacket>,
    inner: Arc<Inner>,
) {
    loop {
        let packet = tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            maybe = outbound.recv() => match maybe {
                Some(packet) => packet,
                None => break,
            },
        };

        // Serialize outside any lock; a bad packet fails only its own
        // reply slot.
        let sizes = inner.sizes();
        let encoded = match packet.encode(&sizes) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("could not serialize command id={}: {e}", packet.id);
                inner.fail_pending(packet.id, e);
                continue;
            }
        };

        debug!(
            "sending command id={} set={} cmd={} len={}",
            packet.id,
            packet.command.command_set(),
            packet.command.command(),
            encoded.len()
        );
        if let Err(e) = writer.write_all(&encoded).await {
            error!("write failed: {e}");
            break;
        }
        if let Err(e) = writer.flush().await {
            error!("flush failed: {e}");
            break;
        }
    }

    inner.shutdown.cancel();
    inner.fail_all_pending();
    debug!("writer task stopped");
}

async fn reader_loop(mut reader: OwnedReadHalf, inner: Arc<Inner>) {
    loop {
        let mut header = [0u8; HEADER_SIZE];
        let read = tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            res = reader.read_exact(&mut header) => res,
        };
        if let Err(e) = read {
            debug!("connection closed while reading header: {e}");
            break;
        }

        let length = wire::read_u32_be(&header[0..4]) as usize;
        if length < HEADER_SIZE || length > MAX_PACKET_SIZE {
            error!("invalid packet length {length}; stream framing lost");
            break;
        }

        let mut packet = vec![0u8; length];
        packet[..HEADER_SIZE].copy_from_slice(&header);
        if length > HEADER_SIZE {
            let read = tokio::select! {
                _ = inner.shutdown.cancelled() => break,
                res = reader.read_exact(&mut packet[HEADER_SIZE..]) => res,
            };
            if let Err(e) = read {
                debug!("connection closed while reading body: {e}");
                break;
            }
        }

        if header[8] & REPLY_FLAG != 0 {
            let reply = match ReplyPacket::decode(&packet) {
                Ok(reply) => reply,
                Err(e) => {
                    error!("could not decode reply: {e}");
                    break;
                }
            };
            debug!("received reply id={} error={}", reply.id, reply.error_code);
            let slot = inner.pending.lock().unwrap().remove(&reply.id);
            match slot {
                Some(tx) => {
                    let _ = tx.send(Ok(reply));
                }
                None => warn!("dropping reply for unknown command id={}", reply.id),
            }
        } else if header_is_event(&header) {
            let sizes = inner.sizes();
            let set = match parse_composite(&packet, &sizes) {
                Ok(set) => set,
                Err(e) => {
                    error!("could not parse composite event: {e}");
                    break;
                }
            };
            debug!(
                "received {} event(s), suspend_policy={}",
                set.events.len(),
                set.suspend_policy
            );
            let handlers = inner.handlers.lock().unwrap().clone();
            for event in &set.events {
                for handler in &handlers {
                    dispatch(handler.as_ref(), event);
                }
            }
        } else {
            // A well-behaved VM only originates composite events.
            warn!(
                "dropping unexpected command packet set={} cmd={}",
                header[9], header[10]
            );
        }
    }

    inner.shutdown.cancel();
    inner.fail_all_pending();
    debug!("reader task stopped");
}
