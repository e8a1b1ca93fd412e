use std::collections::{HashMap, HashSet};

use quarry_runtime::{PacketReader, PacketWriter, ProtocolError};

use super::connection::{Connection, ConnectionState};

#[derive(Debug, Clone, PartialEq)]
pub enum ClientBoundPacket {
    //#ClientBoundPacket
    StatusResponse {
        json_response: String,
    },
    Pong {
        payload: i64,
    },
    Disconnect {
        reason: String,
    },
    LoginSuccess {
        username: String,
    },
    SetCompression {
        threshold: i32,
    },
    //#end
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerBoundPacket {
    //#ServerBoundPacket
    ClientConnected,
    ClientDisconnected,
    ServerTick,
    Handshake {
        protocol_version: i32,
        next_state: i32,
    },
    StatusRequest,
    Ping {
        payload: i64,
    },
    LoginStart {
        name: String,
    },
    EncryptionResponse {
        shared_secret: Vec<u8>,
        verify_token: Vec<u8>,
    },
    LoginPluginResponse {
        message_id: i32,
        successful: bool,
        data: Option<Vec<u8>>,
    },
    //#end
}

/// A sync packet on its way to the main thread, tagged with the connection
/// that received it.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedServerBoundPacket {
    pub sender: usize,
    pub packet: ServerBoundPacket,
}

/// Runs on a connection's I/O thread.
#[derive(Debug, Default)]
pub struct AsyncPacketHandler {
    pub pings: u64,
}

impl AsyncPacketHandler {
    //#AsyncPacketHandler
    pub fn handshake(&mut self, conn: &mut Connection, protocol_version: i32, next_state: i32) {
        conn.protocol_version = protocol_version;
        match next_state {
            1 => conn.state = ConnectionState::Status,
            2 => conn.state = ConnectionState::Login,
            other => conn.send(ClientBoundPacket::Disconnect {
                reason: format!("unknown next state {}", other),
            }),
        }
    }

    pub fn ping(&mut self, conn: &mut Connection, payload: i64) {
        self.pings += 1;
        conn.send(ClientBoundPacket::Pong { payload });
    }
    //#end
}

/// Runs on the main thread and owns the server-wide state.
#[derive(Debug, Default)]
pub struct SyncPacketHandler {
    pub connected: HashSet<usize>,
    pub players:   HashMap<usize, String>,
    pub ticks:     u64,
    pub responses: Vec<(usize, ClientBoundPacket)>,
}

impl SyncPacketHandler {
    //#SyncPacketHandler
    pub fn client_connected(&mut self, sender: usize) {
        self.connected.insert(sender);
    }

    pub fn client_disconnected(&mut self, sender: usize) {
        self.connected.remove(&sender);
        self.players.remove(&sender);
    }

    pub fn server_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn status_request(&mut self, sender: usize) {
        let json_response = self.status_json();
        self.respond(sender, ClientBoundPacket::StatusResponse { json_response });
    }

    pub fn login_start(&mut self, sender: usize, name: &str) {
        if name.is_empty() {
            self.respond(sender, ClientBoundPacket::Disconnect {
                reason: "empty player name".to_string(),
            });
            return;
        }
        self.players.insert(sender, name.to_string());
        self.respond(sender, ClientBoundPacket::LoginSuccess {
            username: name.to_string(),
        });
    }

    pub fn encryption_response(&mut self, sender: usize, shared_secret: &[u8], verify_token: &[u8]) {
        if shared_secret.is_empty() || verify_token.is_empty() {
            self.respond(sender, ClientBoundPacket::Disconnect {
                reason: "encryption failed".to_string(),
            });
        }
    }

    pub fn login_plugin_response(&mut self, _sender: usize, _message_id: i32, _successful: bool, _data: Option<&[u8]>) {
        // unimplemented
    }
    //#end
}

impl SyncPacketHandler {
    fn respond(&mut self, sender: usize, packet: ClientBoundPacket) {
        self.responses.push((sender, packet));
    }

    fn status_json(&self) -> String {
        format!(r#"{{"players":{}}}"#, self.players.len())
    }
}

pub fn dispatch_sync_packet(wrapped_packet: WrappedServerBoundPacket, handler: &mut SyncPacketHandler) {
    //#dispatch_sync_packet
    match wrapped_packet.packet {
        ServerBoundPacket::ClientConnected => handler.client_connected(wrapped_packet.sender),
        ServerBoundPacket::ClientDisconnected => handler.client_disconnected(wrapped_packet.sender),
        ServerBoundPacket::ServerTick => handler.server_tick(),
        ServerBoundPacket::StatusRequest => handler.status_request(wrapped_packet.sender),
        ServerBoundPacket::LoginStart { name } => handler.login_start(wrapped_packet.sender, &name),
        ServerBoundPacket::EncryptionResponse { shared_secret, verify_token } => handler.encryption_response(wrapped_packet.sender, &shared_secret, &verify_token),
        ServerBoundPacket::LoginPluginResponse { message_id, successful, data } => handler.login_plugin_response(wrapped_packet.sender, message_id, successful, data.as_deref()),
        // async packets never reach the queue
        _ => {}
    }
    //#end
}

pub fn serialize(packet: &ClientBoundPacket, buffer: &mut PacketWriter) {
    //#serialize
    match packet {
        ClientBoundPacket::StatusResponse { json_response } => {
            buffer.write_varint(0x00);
            buffer.write_string(json_response);
        }
        ClientBoundPacket::Pong { payload } => {
            buffer.write_varint(0x01);
            buffer.write_i64(*payload);
        }
        ClientBoundPacket::Disconnect { reason } => {
            buffer.write_varint(0x00);
            buffer.write_string(reason);
        }
        ClientBoundPacket::LoginSuccess { username } => {
            buffer.write_varint(0x02);
            buffer.write_string(username);
        }
        ClientBoundPacket::SetCompression { threshold } => {
            buffer.write_varint(0x03);
            buffer.write_varint(*threshold);
        }
    }
    //#end
}

pub fn handle_packet(
    conn: &mut Connection,
    async_handler: &mut AsyncPacketHandler,
    buffer: &mut PacketReader<'_>,
    id: i32,
) -> Result<(), ProtocolError> {
    //#handle_packet
    match conn.state {
        ConnectionState::Handshake => match id {
            0x00 => {
                let protocol_version = buffer.read_varint()?;
                buffer.read_string()?; // server_address
                buffer.read_u16()?; // server_port
                let next_state = buffer.read_varint()?;
                async_handler.handshake(conn, protocol_version, next_state);
                Ok(())
            }
            _ => Err(ProtocolError::InvalidId { id, consumed: buffer.cursor() }),
        },
        ConnectionState::Status => match id {
            0x00 => {
                conn.forward_to_server(ServerBoundPacket::StatusRequest);
                Ok(())
            }
            0x01 => {
                let payload = buffer.read_i64()?;
                async_handler.ping(conn, payload);
                Ok(())
            }
            _ => Err(ProtocolError::InvalidId { id, consumed: buffer.cursor() }),
        },
        ConnectionState::Login => match id {
            0x00 => {
                let name = buffer.read_string()?;
                conn.forward_to_server(ServerBoundPacket::LoginStart { name });
                Ok(())
            }
            0x01 => {
                let shared_secret_length = buffer.read_varint()?;
                let shared_secret = buffer.read_byte_array(shared_secret_length as usize)?;
                let verify_token_length = buffer.read_varint()?;
                let verify_token = buffer.read_byte_array(verify_token_length as usize)?;
                conn.forward_to_server(ServerBoundPacket::EncryptionResponse { shared_secret, verify_token });
                Ok(())
            }
            0x02 => {
                let message_id = buffer.read_varint()?;
                let successful = buffer.read_bool()?;
                let data = if successful { Some(buffer.read_byte_array(buffer.remaining())?) } else { None };
                conn.forward_to_server(ServerBoundPacket::LoginPluginResponse { message_id, successful, data });
                Ok(())
            }
            _ => Err(ProtocolError::InvalidId { id, consumed: buffer.cursor() }),
        },
        _ => Err(ProtocolError::InvalidId { id, consumed: buffer.cursor() }),
    }
    //#end
}

/// Reads the packet id off a framed packet and handles the rest.
pub fn read_packet(
    conn: &mut Connection,
    async_handler: &mut AsyncPacketHandler,
    data: &[u8],
) -> Result<(), ProtocolError> {
    let mut buffer = PacketReader::new(data);
    let id = buffer.read_varint()?;
    handle_packet(conn, async_handler, &mut buffer, id)
}

pub fn encode(packet: &ClientBoundPacket) -> Vec<u8> {
    let mut buffer = PacketWriter::new();
    serialize(packet, &mut buffer);
    buffer.data()
}
