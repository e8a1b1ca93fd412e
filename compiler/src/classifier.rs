use crate::ir::{PacketIr, ProtocolIr, StateIr};

/// Packets partitioned the way the emitters consume them.
#[derive(Debug, Clone)]
pub struct PacketSets<'a> {
    /// All server-bound packets, grouped by state.
    pub server_bound: Vec<(&'a StateIr, &'a PacketIr)>,
    /// All client-bound packets, flattened across states.
    pub client_bound: Vec<&'a PacketIr>,
    /// Server-bound packets queued to the main processing context.
    pub sync:         Vec<&'a PacketIr>,
    /// Server-bound packets handled inline on the connection.
    pub asynchronous: Vec<&'a PacketIr>,
}

impl<'a> PacketSets<'a> {
    pub fn classify(protocol: &'a ProtocolIr) -> Self {
        let server_bound: Vec<_> = protocol.server_bound().collect();
        let (asynchronous, sync): (Vec<&PacketIr>, Vec<&PacketIr>) = server_bound
            .iter()
            .map(|(_, packet)| *packet)
            .partition(|packet| packet.asynchronous);

        PacketSets {
            server_bound,
            client_bound: protocol.client_bound().collect(),
            sync,
            asynchronous,
        }
    }

    /// Server-bound packets with their state, skipping internal states.
    pub fn wire_states(&self) -> Vec<(&'a StateIr, Vec<&'a PacketIr>)> {
        let mut grouped: Vec<(&StateIr, Vec<&PacketIr>)> = Vec::new();
        for (state, packet) in &self.server_bound {
            if state.internal {
                continue;
            }
            let same_state = grouped
                .last()
                .map_or(false, |(last, _)| std::ptr::eq(*last, *state));
            if same_state {
                if let Some((_, packets)) = grouped.last_mut() {
                    packets.push(*packet);
                }
            } else {
                grouped.push((*state, vec![*packet]));
            }
        }
        grouped
    }
}
