// src/errors/mod.rs
//! Structured error reporting for the marmot monomorphization core.
//!
//! Typing-time errors (`SemanticError`) are collected in the checker's sink
//! and abort the offending declaration only. Specialization-time errors
//! (`SpecializeError`) indicate an upstream invariant violation and are
//! fatal to the compilation unit.

pub mod sema;
pub mod specialize;

pub use sema::SemanticError;
pub use specialize::SpecializeError;
