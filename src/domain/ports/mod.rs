//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the trait interfaces that infrastructure adapters
//! must implement:
//! - `VariableSource`: lookup and change broadcast of the upstream variable store
//! - `LabelResolver`: localized label resolution and language-switch broadcast
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod label_resolver;
pub mod variable_source;

pub use label_resolver::{LabelResolver, LanguageChanged};
pub use variable_source::VariableSource;
