//! AI-reply-to-mind-map conversion pipeline.
//!
//! This crate turns free-form model replies into hierarchical mind-map trees
//! that can be rendered, edited, and exported. The architecture enforces a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (segmentation, extraction,
//!   normalization, conversion). No I/O, fully testable in isolation.
//! - **[`io`]**: External collaborators (chat transport seam, conversation
//!   store, config, prompt templates). Isolated to enable mocking in tests.
//!
//! [`pipeline`] composes core logic with the transport seam to implement the
//! end-to-end "reply in, tree out" flow with a plain-text fallback.

pub mod core;
pub mod io;
pub mod logging;
pub mod node;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
