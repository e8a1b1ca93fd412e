use crate::{
    classifier::PacketSets,
    code::{hex_id, CodeWriter, Generated},
    config::GeneratorConfig,
    ir::{pattern, FieldIr},
    merge::Region,
    resolver::write_arg,
    traits::Emitter,
};

/// Emits the match that writes client-bound packets.
pub struct SerializerEmitter;

impl Emitter for SerializerEmitter {
    fn emit(&self, packets: &PacketSets<'_>, config: &GeneratorConfig) -> Vec<(Region, Generated)> {
        let buffer = &config.buffer_ident;
        let mut w = CodeWriter::new();

        if packets.client_bound.is_empty() {
            w.line(format!("match *{} {{}}", config.packet_ident));
            return vec![(Region::Serializer, Generated::Block(w.finish()))];
        }

        w.open(format!("match {} {{", config.packet_ident));
        for packet in &packets.client_bound {
            let names: Vec<&str> = packet.fields.iter().map(|field| field.ident.as_str()).collect();
            w.open(format!(
                "{} => {{",
                pattern(&config.client_enum, &packet.variant, &names)
            ));
            w.line(format!(
                "{}.write_{}({});",
                buffer,
                config.id_type,
                hex_id(packet.id)
            ));
            for field in &packet.fields {
                write_field(&mut w, buffer, field);
            }
            w.close("}");
        }
        w.close("}");

        vec![(Region::Serializer, Generated::Block(w.finish()))]
    }
}

fn write_field(w: &mut CodeWriter, buffer: &str, field: &FieldIr) {
    if field.is_conditional() {
        w.open(format!("if let Some({0}) = {0} {{", field.ident));
        write_value(w, buffer, field);
        w.close("}");
    } else {
        write_value(w, buffer, field);
    }
}

fn write_value(w: &mut CodeWriter, buffer: &str, field: &FieldIr) {
    let write = |binding: &str| {
        format!("{}.write_{}({});", buffer, field.ty.base, write_arg(field, binding))
    };
    if field.array {
        w.open(format!("for item in {} {{", field.ident));
        w.line(write("item"));
        w.close("}");
    } else {
        w.line(write(&field.ident));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lower, ARRAYS, HANDSHAKE};
    use pretty_assertions::assert_eq;

    fn block(protocol: &str) -> String {
        let ir = lower(protocol);
        match SerializerEmitter
            .emit(&PacketSets::classify(&ir), &GeneratorConfig::default())
            .remove(0)
        {
            (Region::Serializer, Generated::Block(block)) => block,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_serializer_writes_id_then_fields() {
        let expected = [
            "match packet {",
            "    ClientBoundPacket::StatusResponse { json_response } => {",
            "        buffer.write_varint(0x00);",
            "        buffer.write_string(json_response);",
            "    }",
            "    ClientBoundPacket::Pong { payload } => {",
            "        buffer.write_varint(0x01);",
            "        buffer.write_i64(*payload);",
            "    }",
            "    ClientBoundPacket::Disconnect => {",
            "        buffer.write_varint(0x00);",
            "    }",
            "    ClientBoundPacket::SetCompression { threshold } => {",
            "        buffer.write_varint(0x03);",
            "        buffer.write_varint(*threshold);",
            "    }",
            "}",
            "",
        ]
        .join("\n");
        assert_eq!(block(HANDSHAKE), expected);
    }

    #[test]
    fn test_conditional_fields_are_written_when_present() {
        let text = block(
            r#"[ { "name": "Play", "client_bound": [ { "name": "title", "id": 5, "fields": [
                { "name": "has_subtitle", "type": "bool" },
                { "name": "subtitle", "type": "string", "condition": "has_subtitle" } ] } ] } ]"#,
        );
        assert!(text.contains(
            "        buffer.write_bool(*has_subtitle);\n        if let Some(subtitle) = subtitle {\n            buffer.write_string(subtitle);\n        }\n"
        ));
    }

    #[test]
    fn test_arrays_are_written_element_by_element() {
        let expected = [
            "match packet {",
            "    ClientBoundPacket::WindowItems { count, items, has_tags, tags } => {",
            "        buffer.write_varint(0x02);",
            "        buffer.write_varint(*count);",
            "        for item in items {",
            "            buffer.write_varint(*item);",
            "        }",
            "        buffer.write_bool(*has_tags);",
            "        if let Some(tags) = tags {",
            "            for item in tags {",
            "                buffer.write_string(item);",
            "            }",
            "        }",
            "    }",
            "}",
            "",
        ]
        .join("\n");
        assert_eq!(block(ARRAYS), expected);
    }

    #[test]
    fn test_empty_client_set() {
        assert_eq!(
            block(r#"[ { "name": "Handshake", "server_bound": [ { "name": "handshake", "id": 0 } ] } ]"#),
            "match *packet {}\n"
        );
    }
}
