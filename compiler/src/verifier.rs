use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    config::GeneratorConfig,
    error::QuarryError,
    ir::{split_descriptor, Direction, Expr, FieldIr, PacketIr, Passing, ProtocolIr, Segment, StateIr, TypeExpr},
    resolver::TypeResolver,
    types::{Field, Packet, Protocol, TypeMappings},
    utils::{escape_rust_keyword, quote, to_pascal_case},
};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref WORD:       Regex = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

/// Checks a protocol schema and lowers it into the IR the emitters consume.
///
/// Fails on duplicate packet ids within a state and direction, duplicate
/// packet names within a direction, invalid identifiers, malformed type
/// descriptors, and expressions that refer to fields which are not yet bound.
pub fn verify_schema(
    protocol: &Protocol,
    mappings: &TypeMappings,
    config: &GeneratorConfig,
) -> Result<ProtocolIr, QuarryError> {
    let resolver = TypeResolver::new(mappings);
    let mut states = Vec::with_capacity(protocol.states.len());
    let mut names: HashSet<(Direction, String)> = HashSet::new();
    let mut handlers: HashMap<(bool, String), String> = HashMap::new();

    for state in &protocol.states {
        check_identifier("State", &state.name)?;
        let internal = state.name == config.internal_state;

        let mut lowered = StateIr {
            name: state.name.clone(),
            internal,
            server_bound: Vec::new(),
            client_bound: Vec::new(),
        };

        for (direction, packets) in [
            (Direction::ServerBound, &state.server_bound),
            (Direction::ClientBound, &state.client_bound),
        ] {
            let mut ids: HashMap<i32, &str> = HashMap::new();

            for packet in packets.iter().flatten() {
                check_identifier("Packet", &packet.name)?;
                if packet.id < 0 {
                    return Err(QuarryError::InvalidPacketId(format!(
                        "{} for packet {}",
                        packet.id,
                        quote(&packet.name)
                    )));
                }

                if let Some(first) = ids.insert(packet.id, &packet.name) {
                    return Err(QuarryError::DuplicatePacketId {
                        state:     state.name.clone(),
                        direction: direction.to_string(),
                        id:        packet.id,
                        first:     quote(first),
                        second:    quote(&packet.name),
                    });
                }

                let lowered_packet = lower_packet(packet, direction, &resolver)?;
                if !names.insert((direction, lowered_packet.variant.clone())) {
                    return Err(QuarryError::DuplicatePacketName {
                        direction: direction.to_string(),
                        name:      quote(&packet.name),
                    });
                }

                if direction == Direction::ServerBound {
                    let key = (lowered_packet.asynchronous, lowered_packet.handler.clone());
                    if let Some(first) = handlers.insert(key, packet.name.clone()) {
                        return Err(QuarryError::DuplicateHandler {
                            kind:    if lowered_packet.asynchronous { "async" } else { "sync" }.to_string(),
                            handler: lowered_packet.handler.clone(),
                            first:   quote(&first),
                            second:  quote(&packet.name),
                        });
                    }
                }

                match direction {
                    Direction::ServerBound => lowered.server_bound.push(lowered_packet),
                    Direction::ClientBound => lowered.client_bound.push(lowered_packet),
                }
            }
        }

        debug!(
            state = %state.name,
            server_bound = lowered.server_bound.len(),
            client_bound = lowered.client_bound.len(),
            "verified connection state"
        );
        states.push(lowered);
    }

    Ok(ProtocolIr { states })
}

fn check_identifier(what: &str, name: &str) -> Result<(), QuarryError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(QuarryError::InvalidIdentifier {
            what: what.to_string(),
            name: quote(name),
        })
    }
}

fn lower_packet(
    packet: &Packet,
    direction: Direction,
    resolver: &TypeResolver,
) -> Result<PacketIr, QuarryError> {
    if packet.asynchronous && direction == Direction::ClientBound {
        warn!(packet = %packet.name, "ignoring async flag on a client-bound packet");
    }

    let mut fields: Vec<FieldIr> = Vec::with_capacity(packet.fields.len());
    for (index, field) in packet.fields.iter().enumerate() {
        check_identifier("Field", &field.name)?;
        if packet.fields[..index].iter().any(|earlier| earlier.name == field.name) {
            return Err(QuarryError::DuplicateField {
                packet: quote(&packet.name),
                field:  quote(&field.name),
            });
        }
        if field.unused && direction == Direction::ClientBound {
            return Err(QuarryError::UnusedClientField {
                packet: quote(&packet.name),
                field:  quote(&field.name),
            });
        }

        fields.push(lower_field(packet, index, field, resolver)?);
    }

    Ok(PacketIr {
        name:               packet.name.clone(),
        variant:            to_pascal_case(&packet.name),
        handler:            escape_rust_keyword(&packet.name.to_lowercase()),
        id:                 packet.id,
        direction,
        asynchronous:       packet.asynchronous && direction == Direction::ServerBound,
        sender_independent: packet.sender_independent,
        unimplemented:      packet.unimplemented,
        fields,
    })
}

fn lower_field(
    packet: &Packet,
    index: usize,
    field: &Field,
    resolver: &TypeResolver,
) -> Result<FieldIr, QuarryError> {
    let malformed = |reason: String| QuarryError::MalformedType {
        packet:     quote(&packet.name),
        field:      quote(&field.name),
        descriptor: quote(&field.type_),
        reason,
    };

    let (base, param) = split_descriptor(&field.type_).map_err(malformed)?;
    if !IDENTIFIER.is_match(base) {
        return Err(malformed(format!("{} is not a type name", quote(base))));
    }

    if field.array && param.is_none() {
        return Err(malformed("array fields need a length parameter".to_string()));
    }

    let param = param.map(|text| bind_expr(packet, index, field, text)).transpose()?;
    let condition = match field.condition.as_deref().map(str::trim) {
        Some("") => return Err(malformed("empty condition".to_string())),
        Some(text) => Some(bind_expr(packet, index, field, text)?),
        None => None,
    };

    Ok(FieldIr {
        name:        field.name.clone(),
        ident:       escape_rust_keyword(&field.name),
        target_type: if field.array {
            format!("Vec<{}>", resolver.target_type(base))
        } else {
            resolver.target_type(base).to_string()
        },
        primitive:   resolver.is_primitive(base),
        passing:     if field.array && !field.pass_raw {
            Passing::Reference
        } else {
            resolver.classify(base, field.pass_raw)
        },
        array:       field.array,
        ty:          TypeExpr { base: base.to_string(), param },
        condition,
        used:        !field.unused,
        bound:       !field.unused || field.referenced,
    })
}

/// Splits raw expression text into source and references to earlier fields
/// of the same packet.
///
/// Words that follow `.` or `::` are member or path segments and never refer
/// to fields. Words naming no field at all are left as source.
fn bind_expr(packet: &Packet, index: usize, field: &Field, text: &str) -> Result<Expr, QuarryError> {
    let mut segments = Vec::new();
    let mut last_end = 0;
    let literals = string_literals(text);

    for word in WORD.find_iter(text) {
        if literals.iter().any(|literal| literal.contains(&word.start())) {
            continue;
        }
        let before = &text[..word.start()];
        let after_member = before.ends_with('.') || before.ends_with("::");
        let inside_literal = before.chars().last().map_or(false, |ch| ch.is_ascii_alphanumeric());
        if after_member || inside_literal {
            continue;
        }

        let position = match packet.fields.iter().position(|other| other.name == word.as_str()) {
            Some(position) => position,
            None => continue,
        };

        if position >= index {
            return Err(QuarryError::ForwardReference {
                packet:    quote(&packet.name),
                field:     quote(&field.name),
                reference: quote(word.as_str()),
            });
        }
        let target = &packet.fields[position];
        if target.unused && !target.referenced {
            return Err(QuarryError::UnboundReference {
                packet:    quote(&packet.name),
                field:     quote(&field.name),
                reference: quote(word.as_str()),
            });
        }

        if word.start() > last_end {
            segments.push(Segment::Source(text[last_end..word.start()].to_string()));
        }
        segments.push(Segment::Binding(position));
        last_end = word.end();
    }

    if last_end < text.len() {
        segments.push(Segment::Source(text[last_end..].to_string()));
    }
    Ok(Expr { segments })
}

/// Byte ranges of the `"..."` literals in `text`, quotes included.
fn string_literals(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices();

    while let Some((start, ch)) = chars.next() {
        if ch != '"' {
            continue;
        }
        let mut end = text.len();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '\\' => {
                    chars.next();
                }
                '"' => {
                    end = offset + 1;
                    break;
                }
                _ => {}
            }
        }
        spans.push(start..end);
    }
    spans
}
