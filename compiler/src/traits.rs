use crate::{classifier::PacketSets, code::Generated, config::GeneratorConfig, merge::Region};

/// A code emitter owns one or more marker regions and produces their
/// contents from the classified packets.
pub trait Emitter {
    fn emit(&self, packets: &PacketSets<'_>, config: &GeneratorConfig) -> Vec<(Region, Generated)>;
}
