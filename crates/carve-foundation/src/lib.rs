//! Shared data model for the carve component-extraction engine.
//!
//! Everything in this crate is plain data: source ranges, text edits,
//! the generation configuration, and the error taxonomy. The engine
//! crate produces these values; the host applies them. No I/O happens
//! here.

pub mod config;
pub mod error;
pub mod planning;
pub mod range;

pub use config::{DeclarationForm, GenerationConfig, TypeForm};
pub use error::{ExtractError, ExtractResult};
pub use planning::{EditType, ExtractedProperty, ExtractionPlan, TextEdit};
pub use range::SourceRange;
