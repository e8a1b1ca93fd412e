use crate::{
    classifier::PacketSets,
    code::{CodeWriter, Generated},
    config::GeneratorConfig,
    ir::PacketIr,
    merge::Region,
    traits::Emitter,
};

/// Emits the variants of the client-bound and server-bound packet enums.
pub struct EnumEmitter;

impl Emitter for EnumEmitter {
    fn emit(&self, packets: &PacketSets<'_>, _config: &GeneratorConfig) -> Vec<(Region, Generated)> {
        let server_bound: Vec<&PacketIr> =
            packets.server_bound.iter().map(|(_, packet)| *packet).collect();
        vec![
            (Region::ClientEnum, Generated::Block(enum_variants(&packets.client_bound))),
            (Region::ServerEnum, Generated::Block(enum_variants(&server_bound))),
        ]
    }
}

/// One variant per packet, in declaration order. Packets without used fields
/// become unit variants.
pub fn enum_variants(packets: &[&PacketIr]) -> String {
    let mut w = CodeWriter::new();
    for packet in packets {
        if packet.is_unit() {
            w.line(format!("{},", packet.variant));
            continue;
        }
        w.open(format!("{} {{", packet.variant));
        for field in packet.used_fields() {
            w.line(format!("{}: {},", field.ident, field.payload_type()));
        }
        w.close("},");
    }
    w.finish()
}
