//! quarry-compiler
//!
//! Generates the packet handling code of a network protocol from a JSON
//! schema and merges it into a hand-maintained Rust file:
//!  1) schema and type-mapping models (`types`) plus their loaders,
//!  2) verification and lowering into an IR (`verifier`, `ir`, `resolver`),
//!  3) emitters for handler headers, packet enums, the sync dispatcher, the
//!     client-bound serializer and the server-bound deserializer,
//!  4) the marker-region merge engine (`merge`), which keeps hand-written
//!     handler bodies intact,
//!  5) error types (`QuarryError`) and the `Emitter` trait.

pub mod error;
pub mod types;
pub mod config;
pub mod loader;
pub mod utils;
pub mod ir;
pub mod resolver;
pub mod verifier;
pub mod classifier;
pub mod code;
pub mod gen_enum;
pub mod gen_handler;
pub mod gen_dispatch;
pub mod gen_serialize;
pub mod gen_deserialize;
pub mod scan;
pub mod merge;
pub mod compiler;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use compiler::Generator;
pub use config::GeneratorConfig;
pub use error::QuarryError;
pub use merge::Region;
