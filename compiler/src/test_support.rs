use crate::{
    config::GeneratorConfig,
    ir::ProtocolIr,
    loader::{load_mappings, load_protocol},
    verifier::verify_schema,
};

pub const MAPPINGS: &str = r#"{
    "types": [
        { "name": "string", "target_type": "String" },
        { "name": "byte_array", "target_type": "Vec<u8>" },
        { "name": "varint", "target_type": "i32" },
        { "name": "varlong", "target_type": "i64" }
    ],
    "primitives": [ "bool", "u8", "u16", "i32", "i64", "varint", "varlong" ]
}"#;

pub const HANDSHAKE: &str = r#"[
    { "name": "__internal__",
      "server_bound": [ { "name": "client_connected", "id": 0, "sender_independent": true } ] },
    { "name": "Handshake",
      "server_bound": [
        { "name": "Handshake", "id": 0,
          "fields": [
            { "name": "protocol_version", "type": "varint" },
            { "name": "server_address", "type": "string" },
            { "name": "server_port", "type": "u16" },
            { "name": "next_state", "type": "varint" } ] } ] },
    { "name": "Status",
      "server_bound": [
        { "name": "status_request", "id": 0, "async": true },
        { "name": "ping", "id": 1, "async": true,
          "fields": [ { "name": "payload", "type": "i64" } ] } ],
      "client_bound": [
        { "name": "status_response", "id": 0,
          "fields": [ { "name": "json_response", "type": "string" } ] },
        { "name": "pong", "id": 1,
          "fields": [ { "name": "payload", "type": "i64" } ] } ] },
    { "name": "Login",
      "server_bound": [
        { "name": "login_start", "id": 0,
          "fields": [
            { "name": "name", "type": "string" },
            { "name": "len", "type": "varint", "unused": true, "referenced": true },
            { "name": "token", "type": "byte_array(len as usize)" },
            { "name": "reserved", "type": "u8", "unused": true } ] },
        { "name": "plugin_response", "id": 2, "unimplemented": true,
          "fields": [
            { "name": "message_id", "type": "varint" },
            { "name": "has_data", "type": "bool", "referenced": true },
            { "name": "data", "type": "string", "condition": "has_data" } ] } ],
      "client_bound": [
        { "name": "disconnect", "id": 0 },
        { "name": "set_compression", "id": "0x03",
          "fields": [ { "name": "threshold", "type": "varint" } ] } ] }
]"#;

/// Counted and optional element lists in both directions.
pub const ARRAYS: &str = r#"[
    { "name": "Play",
      "server_bound": [
        { "name": "set_slots", "id": 1, "async": true,
          "fields": [
            { "name": "count", "type": "varint", "unused": true, "referenced": true },
            { "name": "slots", "type": "varint(count as usize)", "array": true },
            { "name": "has_tags", "type": "bool", "referenced": true },
            { "name": "tags", "type": "string(2)", "array": true, "condition": "has_tags" } ] } ],
      "client_bound": [
        { "name": "window_items", "id": 2,
          "fields": [
            { "name": "count", "type": "varint" },
            { "name": "items", "type": "varint(count as usize)", "array": true },
            { "name": "has_tags", "type": "bool" },
            { "name": "tags", "type": "string(2)", "array": true, "condition": "has_tags" } ] } ] }
]"#;

/// Lowers `protocol` with the shared mapping table and default settings.
pub fn lower(protocol: &str) -> ProtocolIr {
    verify_schema(
        &load_protocol(protocol).unwrap(),
        &load_mappings(MAPPINGS).unwrap(),
        &GeneratorConfig::default(),
    )
    .unwrap()
}
