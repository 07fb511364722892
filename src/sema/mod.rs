// src/sema/mod.rs
//! Semantic layer of the monomorphization core: the interned type
//! representation, the substitution engine, the generics registry, and the
//! checker subset that feeds it.

pub mod check;
pub mod generics;
pub mod scope;
pub mod subst;
pub mod type_arena;

pub use check::{CheckedUnit, Checker, TypeError};
pub use generics::{GenericDecl, GenericUsage, Generics, GenericsError, TypeMap};
pub use subst::Substituter;
pub use type_arena::{InternedType, PrimitiveType, TypeArena, TypeId};
