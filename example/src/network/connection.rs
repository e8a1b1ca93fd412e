use std::sync::mpsc::Sender;

use tracing::warn;

use super::packet_handler::{ClientBoundPacket, ServerBoundPacket, WrappedServerBoundPacket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Handshake,
    Status,
    Login,
    Play,
}

/// One client connection as seen from its I/O thread.
///
/// Sync packets are queued to the main thread through `queue`; replies from
/// async handlers collect in `outgoing` until the I/O loop flushes them.
#[derive(Debug)]
pub struct Connection {
    pub id:               usize,
    pub state:            ConnectionState,
    pub protocol_version: i32,
    outgoing:             Vec<ClientBoundPacket>,
    queue:                Sender<WrappedServerBoundPacket>,
}

impl Connection {
    pub fn new(id: usize, queue: Sender<WrappedServerBoundPacket>) -> Self {
        Connection {
            id,
            state: ConnectionState::Handshake,
            protocol_version: 0,
            outgoing: Vec::new(),
            queue,
        }
    }

    pub fn forward_to_server(&mut self, packet: ServerBoundPacket) {
        let wrapped = WrappedServerBoundPacket { sender: self.id, packet };
        if self.queue.send(wrapped).is_err() {
            warn!(connection = self.id, "main thread is gone, dropping packet");
        }
    }

    pub fn send(&mut self, packet: ClientBoundPacket) {
        self.outgoing.push(packet);
    }

    pub fn take_outgoing(&mut self) -> Vec<ClientBoundPacket> {
        std::mem::take(&mut self.outgoing)
    }
}
