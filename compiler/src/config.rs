use serde::{Deserialize, Serialize};

/// Names the generated code uses to talk to its host file.
///
/// The generator never inspects the host file's Rust; it only splices text
/// into marker regions. These settings must therefore agree with whatever the
/// hand-maintained code around the markers declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Target file, relative to the project directory.
    pub target:               String,
    pub client_enum:          String,
    pub server_enum:          String,
    pub state_enum:           String,
    /// Expression evaluating to the connection's current state.
    pub state_expr:           String,
    /// State excluded from deserializer generation.
    pub internal_state:       String,
    pub buffer_ident:         String,
    pub id_ident:             String,
    /// Logical type whose write op serializes packet ids.
    pub id_type:              String,
    /// Appended to every generated read call.
    pub read_suffix:          String,
    pub async_handler_ident:  String,
    /// Extra first parameter of async handlers, e.g. `conn: &mut Connection`.
    pub async_context:        Option<Param>,
    /// Call receiving synchronous packets, e.g. `conn.forward_to_server`.
    pub forward_call:         String,
    pub invalid_id_error:     String,
    /// Expression giving the number of bytes consumed so far.
    pub consumed_expr:        String,
    pub sender:               Param,
    pub envelope_ident:       String,
    pub handler_ident:        String,
    pub packet_ident:         String,
    /// Prefix of generated handler declarations, e.g. `pub `.
    pub handler_visibility:   String,
    pub self_param:           String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty:   String,
}

impl Param {
    pub fn new(name: &str, ty: &str) -> Self {
        Param {
            name: name.to_string(),
            ty:   ty.to_string(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            target:              "src/network/packet_handler.rs".to_string(),
            client_enum:         "ClientBoundPacket".to_string(),
            server_enum:         "ServerBoundPacket".to_string(),
            state_enum:          "ConnectionState".to_string(),
            state_expr:          "conn.state".to_string(),
            internal_state:      "__internal__".to_string(),
            buffer_ident:        "buffer".to_string(),
            id_ident:            "id".to_string(),
            id_type:             "varint".to_string(),
            read_suffix:         "?".to_string(),
            async_handler_ident: "async_handler".to_string(),
            async_context:       Some(Param::new("conn", "&mut Connection")),
            forward_call:        "conn.forward_to_server".to_string(),
            invalid_id_error:    "ProtocolError::InvalidId".to_string(),
            consumed_expr:       "buffer.cursor()".to_string(),
            sender:              Param::new("sender", "usize"),
            envelope_ident:      "wrapped_packet".to_string(),
            handler_ident:       "handler".to_string(),
            packet_ident:        "packet".to_string(),
            handler_visibility:  "pub ".to_string(),
            self_param:          "&mut self".to_string(),
        }
    }
}
