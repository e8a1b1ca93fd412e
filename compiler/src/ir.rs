//! The lowered, validated form of a protocol schema.
//!
//! Emitters only ever see these types. Every name has already been checked,
//! every type has been resolved and every expression that mentions another
//! field points at that field by index.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    ServerBound,
    ClientBound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ServerBound => f.write_str("server-bound"),
            Direction::ClientBound => f.write_str("client-bound"),
        }
    }
}

/// How a field crosses a generated call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Passing {
    Value,
    Reference,
}

/// A piece of target-language source that may mention earlier fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    Source(String),
    /// Index of an earlier, bound field in the same packet.
    Binding(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Expr {
    pub segments: Vec<Segment>,
}

impl Expr {
    /// Renders the expression with every field reference replaced by that
    /// field's binding name.
    pub fn render(&self, fields: &[FieldIr]) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Source(text) => text.as_str(),
                Segment::Binding(index) => fields[*index].ident.as_str(),
            })
            .collect()
    }

    pub fn bindings(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Binding(index) => Some(*index),
            Segment::Source(_) => None,
        })
    }
}

/// `base` or `base(param)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeExpr {
    pub base:  String,
    pub param: Option<Expr>,
}

/// Splits a raw type descriptor into its base identifier and the text of its
/// parameter list, without interpreting the parameter.
pub fn split_descriptor(descriptor: &str) -> Result<(&str, Option<&str>), String> {
    let descriptor = descriptor.trim();
    let open = match descriptor.find('(') {
        Some(open) => open,
        None => {
            if descriptor.contains(')') {
                return Err("unmatched \")\"".to_string());
            }
            return Ok((descriptor, None));
        }
    };

    let base = descriptor[..open].trim_end();
    let rest = &descriptor[open + 1..];

    let mut depth = 1usize;
    let mut close = None;
    for (index, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }

    let close = close.ok_or_else(|| "unclosed \"(\"".to_string())?;
    if !rest[close + 1..].trim().is_empty() {
        return Err("unexpected text after the parameter list".to_string());
    }

    let param = rest[..close].trim();
    if param.is_empty() {
        return Err("empty parameter list".to_string());
    }
    Ok((base, Some(param)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIr {
    /// Name as written in the schema.
    pub name:        String,
    /// Rust binding name.
    pub ident:       String,
    pub ty:          TypeExpr,
    pub condition:   Option<Expr>,
    /// Mapped Rust type, without any `Option` wrapper.
    pub target_type: String,
    pub primitive:   bool,
    pub passing:     Passing,
    /// `ty.param` elements of `ty.base`, collected into `target_type`.
    pub array:       bool,
    pub used:        bool,
    /// Whether the deserializer binds the value to a name.
    pub bound:       bool,
}

impl FieldIr {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// Type of the enum payload field.
    pub fn payload_type(&self) -> String {
        if self.is_conditional() {
            format!("Option<{}>", self.target_type)
        } else {
            self.target_type.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketIr {
    pub name:               String,
    pub variant:            String,
    pub handler:            String,
    pub id:                 i32,
    pub direction:          Direction,
    pub asynchronous:       bool,
    pub sender_independent: bool,
    pub unimplemented:      bool,
    pub fields:             Vec<FieldIr>,
}

impl PacketIr {
    pub fn used_fields(&self) -> impl Iterator<Item = &FieldIr> {
        self.fields.iter().filter(|field| field.used)
    }

    pub fn used_field_count(&self) -> usize {
        self.used_fields().count()
    }

    /// A packet with no used fields becomes a unit variant.
    pub fn is_unit(&self) -> bool {
        self.used_field_count() == 0
    }

    /// `Variant` or `Variant { a, b }`, listing used fields only.
    pub fn used_pattern(&self, enum_name: &str) -> String {
        let names: Vec<&str> = self.used_fields().map(|field| field.ident.as_str()).collect();
        pattern(enum_name, &self.variant, &names)
    }
}

pub(crate) fn pattern(enum_name: &str, variant: &str, names: &[&str]) -> String {
    if names.is_empty() {
        format!("{}::{}", enum_name, variant)
    } else {
        format!("{}::{} {{ {} }}", enum_name, variant, names.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateIr {
    pub name:         String,
    /// Internal states never arrive off the wire.
    pub internal:     bool,
    pub server_bound: Vec<PacketIr>,
    pub client_bound: Vec<PacketIr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolIr {
    pub states: Vec<StateIr>,
}

impl ProtocolIr {
    /// Every server-bound packet, grouped by state in declaration order.
    pub fn server_bound(&self) -> impl Iterator<Item = (&StateIr, &PacketIr)> {
        self.states
            .iter()
            .flat_map(|state| state.server_bound.iter().map(move |packet| (state, packet)))
    }

    /// Every client-bound packet, flattened across states.
    pub fn client_bound(&self) -> impl Iterator<Item = &PacketIr> {
        self.states.iter().flat_map(|state| state.client_bound.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_descriptor() {
        assert_eq!(split_descriptor("varint"), Ok(("varint", None)));
        assert_eq!(split_descriptor(" string "), Ok(("string", None)));
    }

    #[test]
    fn test_split_parameterized_descriptor() {
        assert_eq!(
            split_descriptor("byte_array(len as usize)"),
            Ok(("byte_array", Some("len as usize")))
        );
        assert_eq!(
            split_descriptor("byte_array(buffer.remaining())"),
            Ok(("byte_array", Some("buffer.remaining()")))
        );
    }

    #[test]
    fn test_split_rejects_malformed_descriptors() {
        assert!(split_descriptor("array(len").is_err());
        assert!(split_descriptor("array()").is_err());
        assert!(split_descriptor("array(len) extra").is_err());
        assert!(split_descriptor("array)").is_err());
    }
}
