use thiserror::Error;

/// Failures raised while generated code reads a packet off the wire.
///
/// These are recoverable: the caller decides whether the connection survives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unrecognized packet id {id:#04X} after {consumed} bytes")]
    InvalidId {
        id:       i32,
        consumed: usize,
    },

    #[error("Unexpected end of packet: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        needed:    usize,
        remaining: usize,
    },

    #[error("Variable-length integer is too long")]
    VarIntTooLong,

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid boolean byte {0:#04X}")]
    InvalidBool(u8),

    #[error("Invalid length prefix {0}")]
    InvalidLength(i32),
}
