use serde::{Deserialize, Deserializer, Serialize};

/// A protocol schema: connection states in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Protocol {
    pub states: Vec<ConnectionState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub name:         String,
    #[serde(default)]
    pub server_bound: Option<Vec<Packet>>,
    #[serde(default)]
    pub client_bound: Option<Vec<Packet>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub name:               String,
    #[serde(deserialize_with = "deserialize_packet_id")]
    pub id:                 i32,
    #[serde(rename = "async", default)]
    pub asynchronous:       bool,
    #[serde(default)]
    pub sender_independent: bool,
    #[serde(default)]
    pub unimplemented:      bool,
    #[serde(default)]
    pub fields:             Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name:       String,
    #[serde(rename = "type")]
    pub type_:      String,
    #[serde(default)]
    pub unused:     bool,
    #[serde(default)]
    pub referenced: bool,
    #[serde(default)]
    pub pass_raw:   bool,
    #[serde(default)]
    pub condition:  Option<String>,
    /// Repeat the base type; the descriptor parameter is the element count.
    #[serde(default)]
    pub array:      bool,
}

/// The type-mapping table: logical type names to emitted Rust types, plus the
/// names that are passed by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMappings {
    #[serde(default)]
    pub types:      Vec<TypeMapping>,
    #[serde(default)]
    pub primitives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMapping {
    pub name:        String,
    pub target_type: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPacketId {
    Number(i64),
    Text(String),
}

/// Packet ids may be written as JSON numbers or as `"0x1A"` strings.
fn deserialize_packet_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = RawPacketId::deserialize(deserializer)?;
    let parsed = match &raw {
        RawPacketId::Number(n) => i32::try_from(*n).ok(),
        RawPacketId::Text(text) => parse_packet_id(text),
    };
    parsed.ok_or_else(|| {
        let shown = match raw {
            RawPacketId::Number(n) => n.to_string(),
            RawPacketId::Text(text) => text,
        };
        D::Error::custom(format!("invalid packet id {}", shown))
    })
}

/// Parses `"0x1A"`, `"0X1a"` or a plain decimal string.
pub fn parse_packet_id(text: &str) -> Option<i32> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
