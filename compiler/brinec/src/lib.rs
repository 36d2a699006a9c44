//! Brine Compiler Driver
//!
//! ```text
//! CompileOptions ──► CompilerContext
//!                       │ load: SourceLoader over mem:/std:/filesystem
//!                       ▼
//!                    SourceCollection
//!                       │ analyze: collect, check, aggregate
//!                       ▼
//!                    CompiledResult + diagnostics
//! ```
//!
//! The binary is a thin layer over [`commands`]; everything else is usable
//! as a library (tests, tooling).

pub mod commands;
pub mod config;
pub mod context;
pub mod describe;
pub mod tracing_setup;

pub use config::{Command, CompileOptions, ConfigError};
pub use context::{std_bundle, CompilerContext, STD_SCHEME};
pub use describe::{describe_position, file_listing};
pub use tracing_setup::init_tracing;
