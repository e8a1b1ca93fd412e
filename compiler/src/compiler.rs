use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{
    classifier::PacketSets,
    code::Generated,
    config::GeneratorConfig,
    error::QuarryError,
    gen_deserialize::DeserializerEmitter,
    gen_dispatch::DispatchEmitter,
    gen_enum::EnumEmitter,
    gen_handler::HandlerEmitter,
    gen_serialize::SerializerEmitter,
    ir::ProtocolIr,
    loader::{load_mappings, load_protocol},
    merge::{merge_regions, Region},
    traits::Emitter,
    types::{Protocol, TypeMappings},
    verifier::verify_schema,
};

/// A verified schema, ready to be merged into any number of target files.
#[derive(Debug, Clone)]
pub struct Generator {
    ir:     ProtocolIr,
    config: GeneratorConfig,
}

impl Generator {
    /// Verifies `protocol` against `mappings`. Nothing is generated until
    /// [`Generator::generate`] or [`Generator::apply`] is called.
    pub fn new(
        protocol: &Protocol,
        mappings: &TypeMappings,
        config: GeneratorConfig,
    ) -> Result<Self, QuarryError> {
        let ir = verify_schema(protocol, mappings, &config)?;
        Ok(Generator { ir, config })
    }

    pub fn from_json(
        protocol: &str,
        mappings: &str,
        config: GeneratorConfig,
    ) -> Result<Self, QuarryError> {
        Self::new(&load_protocol(protocol)?, &load_mappings(mappings)?, config)
    }

    pub fn ir(&self) -> &ProtocolIr {
        &self.ir
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs every emitter and returns the content of all seven regions.
    pub fn generate(&self) -> BTreeMap<Region, Generated> {
        let packets = PacketSets::classify(&self.ir);
        info!(
            server_bound = packets.server_bound.len(),
            client_bound = packets.client_bound.len(),
            asynchronous = packets.asynchronous.len(),
            "generating packet handling code"
        );

        let emitters: [&dyn Emitter; 5] = [
            &HandlerEmitter,
            &EnumEmitter,
            &DispatchEmitter,
            &SerializerEmitter,
            &DeserializerEmitter,
        ];

        let mut regions = BTreeMap::new();
        for emitter in emitters {
            for (region, generated) in emitter.emit(&packets, &self.config) {
                debug!(region = region.name(), "emitted region");
                regions.insert(region, generated);
            }
        }
        regions
    }

    /// Returns `target` with every marker region regenerated. The input is
    /// never modified; on error the caller still holds the original text.
    pub fn apply(&self, target: &str) -> Result<String, QuarryError> {
        merge_regions(target, &self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_region_is_generated() {
        let generator = Generator::from_json(
            r#"[ { "name": "Status", "server_bound": [ { "name": "ping", "id": 1, "async": true } ] } ]"#,
            "{}",
            GeneratorConfig::default(),
        )
        .unwrap();
        let regions: Vec<Region> = generator.generate().into_keys().collect();
        assert_eq!(regions, Region::ALL.to_vec());
    }

    #[test]
    fn test_verification_happens_up_front() {
        let err = Generator::from_json(
            r#"[ { "name": "S", "server_bound": [
                { "name": "a", "id": 0 }, { "name": "b", "id": 0 } ] } ]"#,
            "{}",
            GeneratorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuarryError::DuplicatePacketId { id: 0, .. }));
    }
}
