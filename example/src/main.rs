use std::sync::mpsc;

use quarry_runtime::PacketWriter;
use tracing::{error, info};

use example_server::{
    dispatch_sync_packet, encode, read_packet, AsyncPacketHandler, Connection, ServerBoundPacket,
    SyncPacketHandler,
};

fn handshake(next_state: i32) -> Vec<u8> {
    let mut buffer = PacketWriter::new();
    buffer.write_varint(0x00);
    buffer.write_varint(760);
    buffer.write_string("localhost");
    buffer.write_u16(25565);
    buffer.write_varint(next_state);
    buffer.data()
}

fn ping(payload: i64) -> Vec<u8> {
    let mut buffer = PacketWriter::new();
    buffer.write_varint(0x01);
    buffer.write_i64(payload);
    buffer.data()
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let (queue, main_thread) = mpsc::channel();
    let mut conn = Connection::new(1, queue);
    let mut async_handler = AsyncPacketHandler::default();
    let mut sync_handler = SyncPacketHandler::default();

    conn.forward_to_server(ServerBoundPacket::ClientConnected);
    for packet in [handshake(1), vec![0x00], ping(42), vec![0x7F]] {
        if let Err(err) = read_packet(&mut conn, &mut async_handler, &packet) {
            error!(connection = conn.id, "{}", err);
        }
    }

    for wrapped in main_thread.try_iter() {
        dispatch_sync_packet(wrapped, &mut sync_handler);
    }

    for packet in conn.take_outgoing() {
        info!(?packet, bytes = ?encode(&packet), "from the connection");
    }
    for (receiver, packet) in &sync_handler.responses {
        info!(receiver, ?packet, bytes = ?encode(packet), "from the main thread");
    }
}
