//! quarry
//!
//! Entry point for projects that keep their packet handling code in a marker
//! file and regenerate it from a schema directory.
//!
//! - `regenerate` loads `protocol.json`, `mappings.json` and an optional
//!   `quarry.json` from the schema directory and rewrites the target file
//! - the runtime buffer types generated code reads from and writes to

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info};

pub use quarry_compiler::{
    error::QuarryError,
    loader::{load_config, load_mappings, load_protocol},
    Generator, GeneratorConfig, Region,
};
pub use quarry_runtime::{PacketReader, PacketWriter, ProtocolError};

pub const PROTOCOL_FILE: &str = "protocol.json";
pub const MAPPINGS_FILE: &str = "mappings.json";
pub const CONFIG_FILE: &str = "quarry.json";

/// What a call to [`regenerate`] did to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    Unchanged(PathBuf),
    /// Only returned in check mode.
    Stale(PathBuf),
}

fn read(path: &Path) -> Result<String, QuarryError> {
    debug!(path = %path.display(), "reading");
    Ok(fs::read_to_string(path)?)
}

/// Loads and verifies the schema directory.
pub fn load_schema_dir(schema_dir: &Path) -> Result<Generator, QuarryError> {
    let config_path = schema_dir.join(CONFIG_FILE);
    let config = if config_path.is_file() {
        load_config(&read(&config_path)?)?
    } else {
        GeneratorConfig::default()
    };

    let protocol = load_protocol(&read(&schema_dir.join(PROTOCOL_FILE))?)?;
    let mappings = load_mappings(&read(&schema_dir.join(MAPPINGS_FILE))?)?;
    Generator::new(&protocol, &mappings, config)
}

/// Regenerates the target file of `project_dir` from `schema_dir`.
///
/// The new content is written to a temporary file next to the target and
/// renamed over it, so the target is either fully rewritten or untouched.
/// With `check` set nothing is written and a stale target is reported as
/// [`Outcome::Stale`].
pub fn regenerate(schema_dir: &Path, project_dir: &Path, check: bool) -> Result<Outcome, QuarryError> {
    let generator = load_schema_dir(schema_dir)?;
    let target = project_dir.join(&generator.config().target);

    let current = read(&target)?;
    let merged = generator.apply(&current)?;

    if merged == current {
        info!(target = %target.display(), "packet handler is up to date");
        return Ok(Outcome::Unchanged(target));
    }
    if check {
        info!(target = %target.display(), "packet handler is out of date");
        return Ok(Outcome::Stale(target));
    }

    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(merged.as_bytes())?;
    // The temp file is created 0600; the rename must not change the mode.
    file.as_file().set_permissions(fs::metadata(&target)?.permissions())?;
    file.persist(&target).map_err(|err| QuarryError::Io(err.error))?;

    info!(target = %target.display(), bytes = merged.len(), "wrote packet handler");
    Ok(Outcome::Written(target))
}

/// The verified schema as pretty-printed JSON.
pub fn describe_schema(generator: &Generator) -> Result<String, QuarryError> {
    serde_json::to_string_pretty(generator.ir()).map_err(|source| QuarryError::Json {
        what: "schema description".to_string(),
        source,
    })
}
