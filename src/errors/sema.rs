// src/errors/sema.rs
//! Generics checking errors (E21xx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("cannot instantiate non-generic '{name}'")]
    #[diagnostic(code(E2101))]
    NotGeneric {
        name: String,
        #[label("not a generic type or function")]
        span: SourceSpan,
    },

    #[error("wrong number of type parameters (expected {expected} but got {actual})")]
    #[diagnostic(code(E2102))]
    ArityMismatch {
        expected: usize,
        actual: usize,
        #[label("in this instantiation")]
        span: SourceSpan,
    },

    #[error("undefined type parameter: {name}")]
    #[diagnostic(code(E2103))]
    UndefinedTypeParameter {
        name: String,
        #[label("no binding in the substitution map")]
        span: SourceSpan,
    },

    #[error("declaration not found for generic '{name}'")]
    #[diagnostic(code(E2104))]
    MissingDecl {
        name: String,
        #[label("usage registered here")]
        span: SourceSpan,
    },

    #[error("instantiation of '{found}' is not supported")]
    #[diagnostic(
        code(E2105),
        help("only a bare identifier may be instantiated")
    )]
    UnsupportedInstantiationForm {
        found: String,
        #[label("unsupported operand")]
        span: SourceSpan,
    },

    #[error("'{name}' redeclared in this unit")]
    #[diagnostic(code(E2106))]
    DuplicateGenericDecl {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
    },

    #[error("undeclared name: {name}")]
    #[diagnostic(code(E2107))]
    UndeclaredName {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },
}
