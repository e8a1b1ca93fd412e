//! A toy server showing a packet handler file kept in sync with
//! `assets/protocol.json` by `quarry --project-dir example --schema-dir example/assets`.

pub mod network;

pub use network::connection::{Connection, ConnectionState};
pub use network::packet_handler::{
    dispatch_sync_packet, encode, read_packet, AsyncPacketHandler, ClientBoundPacket, ServerBoundPacket,
    SyncPacketHandler, WrappedServerBoundPacket,
};
