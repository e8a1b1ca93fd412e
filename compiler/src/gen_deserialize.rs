use crate::{
    classifier::PacketSets,
    code::{hex_id, read_call, CodeWriter, Generated},
    config::GeneratorConfig,
    ir::{FieldIr, PacketIr},
    merge::Region,
    resolver::call_arg,
    traits::Emitter,
};

/// Emits the nested state/id match that reads server-bound packets.
pub struct DeserializerEmitter;

impl Emitter for DeserializerEmitter {
    fn emit(&self, packets: &PacketSets<'_>, config: &GeneratorConfig) -> Vec<(Region, Generated)> {
        let mut w = CodeWriter::new();
        let invalid = invalid_id_arm(config);

        w.open(format!("match {} {{", config.state_expr));
        for (state, state_packets) in packets.wire_states() {
            w.open(format!(
                "{}::{} => match {} {{",
                config.state_enum, state.name, config.id_ident
            ));
            for packet in state_packets {
                w.open(format!("{} => {{", hex_id(packet.id)));
                for field in &packet.fields {
                    w.line(read_statement(packet, field, config));
                }
                w.line(deliver(packet, config));
                w.line("Ok(())");
                w.close("}");
            }
            w.line(&invalid);
            w.close("},");
        }
        w.line(&invalid);
        w.close("}");

        vec![(Region::Deserializer, Generated::Block(w.finish()))]
    }
}

/// Every field is read, in order. Only used or referenced fields are bound;
/// the rest are discarded with their name left as a comment.
pub fn read_statement(packet: &PacketIr, field: &FieldIr, config: &GeneratorConfig) -> String {
    let read = read_call(&config.buffer_ident, packet, field, &config.read_suffix);
    let value = match &field.condition {
        Some(condition) => format!(
            "if {} {{ Some({}) }} else {{ None }}",
            condition.render(&packet.fields),
            read
        ),
        None => read,
    };

    if field.bound {
        format!("let {} = {};", field.ident, value)
    } else {
        format!("{}; // {}", value, field.name)
    }
}

/// Async packets go straight to their handler; sync packets are forwarded to
/// the main processing context as an enum value.
fn deliver(packet: &PacketIr, config: &GeneratorConfig) -> String {
    if packet.asynchronous {
        let mut args: Vec<String> = config
            .async_context
            .iter()
            .map(|context| context.name.clone())
            .collect();
        args.extend(packet.used_fields().map(call_arg));
        format!(
            "{}.{}({});",
            config.async_handler_ident,
            packet.handler,
            args.join(", ")
        )
    } else {
        format!(
            "{}({});",
            config.forward_call,
            packet.used_pattern(&config.server_enum)
        )
    }
}

fn invalid_id_arm(config: &GeneratorConfig) -> String {
    let id = if config.id_ident == "id" {
        "id".to_string()
    } else {
        format!("id: {}", config.id_ident)
    };
    format!(
        "_ => Err({} {{ {}, consumed: {} }}),",
        config.invalid_id_error, id, config.consumed_expr
    )
}
