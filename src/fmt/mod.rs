// src/fmt/mod.rs
//! Source rendering for the Marmot AST.
//!
//! The printer is the host pretty-printer's stand-in: it renders a
//! specialized file back to source deterministically, and supplies the
//! canonical single-line expression text the specializer mangles into
//! concrete names.

pub mod printer;

pub use printer::{expr_text, print_file};
