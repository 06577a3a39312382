//! Deterministic, pure logic of the reply-to-tree pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! strings and trees and return deterministic outputs suitable for tests.

pub mod export;
pub mod extract;
pub mod freemind;
pub mod invariants;
pub mod normalize;
pub mod segment;
