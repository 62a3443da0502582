//! Inkframe Core Types
//!
//! This crate provides the foundational types shared by every stage of the
//! Inkframe render-and-export pipeline. It includes:
//!
//! - **Sources**: Immutable editor snapshots and render freshness counters ([`source`] module)
//! - **Markup**: Normalized, embeddable vector markup ([`markup::VectorMarkup`])
//! - **Artifacts**: Export payloads handed to the clipboard or file sinks ([`artifact`] module)
//! - **Geometry**: Sizes and coordinate frames ([`geometry`] module)

pub mod artifact;
pub mod geometry;
pub mod markup;
pub mod source;
