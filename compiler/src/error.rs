use thiserror::Error;

/// Everything that can stop a generator run.
///
/// Every variant is raised before the target file is written, so a failed run
/// never leaves a half-merged file behind.
#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {what}: {source}")]
    Json {
        what:   String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Packet id {id:#04X} is used twice in {state} ({direction}) by {first} and {second}")]
    DuplicatePacketId {
        state:     String,
        direction: String,
        id:        i32,
        first:     String,
        second:    String,
    },

    #[error("Packet name {name} is used twice in the {direction} direction")]
    DuplicatePacketName {
        direction: String,
        name:      String,
    },

    #[error("Packets {first} and {second} both map to the {kind} handler {handler}")]
    DuplicateHandler {
        kind:    String,
        handler: String,
        first:   String,
        second:  String,
    },

    #[error("Invalid packet id {0}")]
    InvalidPacketId(String),

    #[error("{what} {name} is not a valid identifier")]
    InvalidIdentifier {
        what: String,
        name: String,
    },

    #[error("Field {field} is declared twice in packet {packet}")]
    DuplicateField {
        packet: String,
        field:  String,
    },

    #[error("Field {field} of packet {packet} has a malformed type {descriptor}: {reason}")]
    MalformedType {
        packet:     String,
        field:      String,
        descriptor: String,
        reason:     String,
    },

    #[error("Field {field} of packet {packet} refers to {reference}, which is declared later")]
    ForwardReference {
        packet:    String,
        field:     String,
        reference: String,
    },

    #[error("Field {field} of packet {packet} refers to {reference}, which is neither used nor referenced")]
    UnboundReference {
        packet:    String,
        field:     String,
        reference: String,
    },

    #[error("Field {field} of client-bound packet {packet} cannot be unused")]
    UnusedClientField {
        packet: String,
        field:  String,
    },

    #[error("Marker region {0} was not found in the target file")]
    MissingRegion(String),

    #[error("Marker region {0} appears more than once in the target file")]
    DuplicateRegion(String),

    #[error("Marker region {0} has no end marker")]
    UnterminatedRegion(String),

    #[error("Region {region} has {existing} handler declarations but the schema only defines {generated}")]
    HandlerOverflow {
        region:    String,
        existing:  usize,
        generated: usize,
    },
}
