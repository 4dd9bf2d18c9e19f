//! Shared types and logic for AutoDiagnostic components.
//!
//! Everything here is pure: no network, no filesystem. The daemon and the
//! CLI both build on these modules.

pub mod error;
pub mod interpreter;
pub mod keywords;
pub mod part_images;
pub mod rpc;
pub mod symptoms;
pub mod visual_context;
pub mod zones;

pub use error::ErrorCode;
pub use interpreter::{interpret, InterpretationResult, Strategy};
pub use visual_context::{ExtractedContext, VisualContext};
pub use zones::{zone_to_legacy_category, CarView, HighlightZone, LegacyCategory};

/// Default daemon address used by the CLI and the daemon config
pub const DEFAULT_DAEMON_ADDR: &str = "127.0.0.1:7866";

/// Maximum accepted symptom length, in characters
pub const MAX_MESSAGE_CHARS: usize = 10_000;
