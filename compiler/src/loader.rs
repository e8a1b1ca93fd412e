use serde::de::DeserializeOwned;

use crate::{
    config::GeneratorConfig,
    error::QuarryError,
    types::{Protocol, TypeMappings},
};

fn parse<T: DeserializeOwned>(what: &str, text: &str) -> Result<T, QuarryError> {
    serde_json::from_str(text).map_err(|source| QuarryError::Json {
        what: what.to_string(),
        source,
    })
}

/// Parses a protocol document: a JSON array of connection states.
pub fn load_protocol(text: &str) -> Result<Protocol, QuarryError> {
    parse("protocol schema", text)
}

/// Parses a type-mapping document.
pub fn load_mappings(text: &str) -> Result<TypeMappings, QuarryError> {
    parse("type mappings", text)
}

/// Parses generator settings. Missing keys take their defaults.
pub fn load_config(text: &str) -> Result<GeneratorConfig, QuarryError> {
    parse("generator config", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_protocol() {
        let protocol = load_protocol(
            r#"[ { "name": "Handshake", "server_bound": [ { "name": "handshake", "id": "0x00" } ] } ]"#,
        )
        .unwrap();
        assert_eq!(protocol.states.len(), 1);
        assert!(protocol.states[0].client_bound.is_none());
    }

    #[test]
    fn test_parse_errors_name_the_document() {
        let err = load_mappings("{ \"types\": 3 }").unwrap_err();
        assert!(err.to_string().starts_with("JSON error in type mappings"), "{}", err);

        let err = load_protocol("[ { \"name\": \"S\", \"server_bound\": [ { \"id\": 0 } ] } ]").unwrap_err();
        assert!(matches!(err, QuarryError::Json { .. }));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(load_config("{}").unwrap(), GeneratorConfig::default());
    }
}
