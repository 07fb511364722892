// src/errors/specialize.rs
//! Specialization errors (E31xx). Fatal to the compilation unit: a
//! malformed registry or tree at this stage is an upstream bug.

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SpecializeError {
    #[error("could not find generic declaration for '{name}'")]
    #[diagnostic(code(E3101))]
    MissingDecl {
        name: String,
        #[label("declared generic here")]
        span: SourceSpan,
    },

    #[error("instantiation of '{found}' is not supported")]
    #[diagnostic(
        code(E3102),
        help("only a bare identifier may be instantiated")
    )]
    UnsupportedInstantiationForm {
        found: String,
        #[label("unsupported operand")]
        span: SourceSpan,
    },
}
