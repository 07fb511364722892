// src/sema/generics.rs
//
// Per-unit registry of generic declarations and their observed concrete
// usages. Populated by the checker hooks during type checking, read-only
// during specialization. All iteration orders are deterministic: usages are
// keyed by their canonical usage key, declarations by symbol.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::frontend::{Interner, Symbol};
use crate::sema::type_arena::{TypeArena, TypeId};

/// Registry failure, converted to a spanned diagnostic by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenericsError {
    #[error("undefined type parameter: {name}")]
    UndefinedTypeParameter { name: String },

    #[error("declaration not found for generic '{name}'")]
    MissingDecl { name: String },
}

/// A substitution map from type parameter name to concrete type, ordered by
/// the generic's parameter declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeMap {
    entries: Vec<(Symbol, TypeId)>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. Parameters are inserted in declaration order; a
    /// repeated name overwrites the earlier binding.
    pub fn insert(&mut self, param: Symbol, ty: TypeId) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == param) {
            entry.1 = ty;
            return;
        }
        self.entries.push((param, ty));
    }

    pub fn get(&self, param: Symbol) -> Option<TypeId> {
        self.entries
            .iter()
            .find(|(name, _)| *name == param)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, TypeId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One distinct concrete usage of a generic: the substitution map and the
/// instantiated type it produced.
#[derive(Debug, Clone)]
pub struct GenericUsage {
    ty: TypeId,
    type_map: TypeMap,
}

impl GenericUsage {
    pub fn instantiated_type(&self) -> TypeId {
        self.ty
    }

    pub fn type_map(&self) -> &TypeMap {
        &self.type_map
    }
}

/// A registered generic declaration and its usages, keyed by usage key.
#[derive(Debug, Clone)]
pub struct GenericDecl {
    name: Symbol,
    ty: TypeId,
    type_params: Vec<Symbol>,
    usages: BTreeMap<String, GenericUsage>,
}

impl GenericDecl {
    pub fn name(&self) -> Symbol {
        self.name
    }

    /// The type at the declaration site (a named type or signature)
    pub fn declared_type(&self) -> TypeId {
        self.ty
    }

    pub fn type_params(&self) -> &[Symbol] {
        &self.type_params
    }

    /// Usages in usage-key order
    pub fn usages(&self) -> impl Iterator<Item = (&str, &GenericUsage)> {
        self.usages.iter().map(|(key, usage)| (key.as_str(), usage))
    }

    pub fn usage_count(&self) -> usize {
        self.usages.len()
    }
}

/// Per-unit generics registry.
#[derive(Debug, Clone, Default)]
pub struct Generics {
    decls: BTreeMap<Symbol, GenericDecl>,
}

impl Generics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generic declaration. Last declaration wins; duplicate names
    /// are diagnosed by the unit scope, not here.
    pub fn register_decl(&mut self, name: Symbol, ty: TypeId, type_params: Vec<Symbol>) {
        self.decls.insert(
            name,
            GenericDecl {
                name,
                ty,
                type_params,
                usages: BTreeMap::new(),
            },
        );
    }

    /// Record a concrete usage of a generic declaration.
    ///
    /// A map containing a type parameter anywhere in a value is not yet
    /// ground - it carries inherited type parameters, and the eventual
    /// ground instantiation of the enclosing generic will re-register it.
    /// Such maps are skipped. Registration is idempotent: an equal-key
    /// usage overwrites the previous entry.
    pub fn register_usage(
        &mut self,
        name: Symbol,
        instantiated: TypeId,
        type_map: TypeMap,
        types: &TypeArena,
        interner: &Interner,
    ) -> Result<(), GenericsError> {
        if type_map.iter().any(|(_, ty)| types.contains_type_param(ty)) {
            return Ok(());
        }
        let Some(decl) = self.decls.get_mut(&name) else {
            return Err(GenericsError::MissingDecl {
                name: interner.resolve(name).to_string(),
            });
        };
        let key = usage_key(&type_map, &decl.type_params, types, interner)?;
        decl.usages.insert(
            key,
            GenericUsage {
                ty: instantiated,
                type_map,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: Symbol) -> Option<&GenericDecl> {
        self.decls.get(&name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.decls.contains_key(&name)
    }

    /// Declarations in deterministic (symbol) order
    pub fn decls(&self) -> impl Iterator<Item = &GenericDecl> {
        self.decls.values()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Unique key for a usage, built from the canonical string forms of the
/// substituted types in parameter declaration order. Another usage with the
/// same type arguments produces the same key.
pub fn usage_key(
    type_map: &TypeMap,
    type_params: &[Symbol],
    types: &TypeArena,
    interner: &Interner,
) -> Result<String, GenericsError> {
    let mut parts = Vec::with_capacity(type_params.len());
    for &param in type_params {
        let Some(ty) = type_map.get(param) else {
            return Err(GenericsError::UndefinedTypeParameter {
                name: interner.resolve(param).to_string(),
            });
        };
        parts.push(types.type_string(ty, interner));
    }
    Ok(parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_key_follows_declaration_order() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let a = interner.intern("A");
        let b = interner.intern("B");

        let mut map = TypeMap::new();
        // Inserted out of order; the key still follows the parameter list.
        map.insert(b, types.int());
        map.insert(a, types.string());

        let key = usage_key(&map, &[a, b], &types, &interner).unwrap();
        assert_eq!(key, "string,int");
    }

    #[test]
    fn equal_keys_are_one_usage() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let t = interner.intern("T");
        let box_sym = interner.intern("Box");

        let underlying = types.struct_of(smallvec::SmallVec::new());
        let declared = types.named(None, box_sym, smallvec::smallvec![t], underlying);

        let mut generics = Generics::new();
        generics.register_decl(box_sym, declared, vec![t]);

        let mut map = TypeMap::new();
        map.insert(t, types.int());
        generics
            .register_usage(box_sym, declared, map.clone(), &types, &interner)
            .unwrap();
        generics
            .register_usage(box_sym, declared, map, &types, &interner)
            .unwrap();

        assert_eq!(generics.get(box_sym).unwrap().usage_count(), 1);
    }

    #[test]
    fn non_ground_usage_is_skipped() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let t = interner.intern("T");
        let u = interner.intern("U");
        let box_sym = interner.intern("Box");

        let underlying = types.struct_of(smallvec::SmallVec::new());
        let declared = types.named(None, box_sym, smallvec::smallvec![t], underlying);

        let mut generics = Generics::new();
        generics.register_decl(box_sym, declared, vec![t]);

        // Direct type parameter value
        let param = types.type_param(u);
        let mut map = TypeMap::new();
        map.insert(t, param);
        generics
            .register_usage(box_sym, declared, map, &types, &interner)
            .unwrap();

        // Type parameter nested inside a compound value
        let nested = types.slice(param);
        let mut map = TypeMap::new();
        map.insert(t, nested);
        generics
            .register_usage(box_sym, declared, map, &types, &interner)
            .unwrap();

        assert_eq!(generics.get(box_sym).unwrap().usage_count(), 0);
    }

    #[test]
    fn missing_decl_is_an_error() {
        let mut interner = Interner::new();
        let mut types = TypeArena::new();
        let t = interner.intern("T");
        let ghost = interner.intern("Ghost");

        let mut map = TypeMap::new();
        map.insert(t, types.int());

        let mut generics = Generics::new();
        let err = generics
            .register_usage(ghost, types.int(), map, &types, &interner)
            .unwrap_err();
        assert!(matches!(err, GenericsError::MissingDecl { .. }));
    }
}
