use crate::{
    classifier::PacketSets,
    code::{CodeWriter, Generated},
    config::GeneratorConfig,
    merge::Region,
    resolver::call_arg,
    traits::Emitter,
};

/// Emits the match that hands queued sync packets to their handlers.
pub struct DispatchEmitter;

impl Emitter for DispatchEmitter {
    fn emit(&self, packets: &PacketSets<'_>, config: &GeneratorConfig) -> Vec<(Region, Generated)> {
        let envelope = &config.envelope_ident;
        let mut w = CodeWriter::new();

        w.open(format!("match {}.packet {{", envelope));
        for packet in &packets.sync {
            let mut args = Vec::new();
            if !packet.sender_independent {
                args.push(format!("{}.{}", envelope, config.sender.name));
            }
            args.extend(packet.used_fields().map(call_arg));
            w.line(format!(
                "{} => {}.{}({}),",
                packet.used_pattern(&config.server_enum),
                config.handler_ident,
                packet.handler,
                args.join(", ")
            ));
        }
        if !packets.asynchronous.is_empty() {
            // async packets never reach the queue
            w.line("_ => {}");
        }
        w.close("}");

        vec![(Region::Dispatch, Generated::Block(w.finish()))]
    }
}
