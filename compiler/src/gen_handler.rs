use crate::{
    classifier::PacketSets,
    code::{Generated, HandlerDecl},
    config::{GeneratorConfig, Param},
    ir::PacketIr,
    merge::Region,
    resolver::param_type,
    traits::Emitter,
};

/// Emits handler method headers for async and sync packets.
pub struct HandlerEmitter;

impl Emitter for HandlerEmitter {
    fn emit(&self, packets: &PacketSets<'_>, config: &GeneratorConfig) -> Vec<(Region, Generated)> {
        let async_decls = packets
            .asynchronous
            .iter()
            .map(|packet| declaration(packet, config.async_context.as_ref(), config))
            .collect();
        let sync_decls = packets
            .sync
            .iter()
            .map(|packet| {
                let sender = if packet.sender_independent { None } else { Some(&config.sender) };
                declaration(packet, sender, config)
            })
            .collect();

        vec![
            (Region::AsyncHandlers, Generated::Handlers(async_decls)),
            (Region::SyncHandlers, Generated::Handlers(sync_decls)),
        ]
    }
}

/// `pub fn name(&mut self, <leading>, <used fields>) {`
///
/// Unimplemented packets keep every parameter but prefix its name with `_`.
pub fn declaration(packet: &PacketIr, leading: Option<&Param>, config: &GeneratorConfig) -> HandlerDecl {
    let prefix = if packet.unimplemented { "_" } else { "" };

    let mut params = vec![config.self_param.clone()];
    if let Some(param) = leading {
        params.push(format!("{}{}: {}", prefix, param.name, param.ty));
    }
    params.extend(
        packet
            .used_fields()
            .map(|field| format!("{}{}: {}", prefix, field.ident, param_type(field))),
    );

    HandlerDecl {
        name:          packet.handler.clone(),
        signature:     format!(
            "{}fn {}({}) {{",
            config.handler_visibility,
            packet.handler,
            params.join(", ")
        ),
        unimplemented: packet.unimplemented,
    }
}
