// src/sema/scope.rs

use rustc_hash::FxHashMap;

use crate::frontend::Symbol;
use crate::sema::type_arena::TypeId;

/// Flat per-unit symbol table: named types, functions, and imported
/// package-qualified names. The generics subset needs no block scoping
/// (type parameters are tracked by the checker itself).
#[derive(Debug, Default)]
pub struct Scope {
    objects: FxHashMap<Symbol, TypeId>,
    qualified: FxHashMap<(Symbol, Symbol), TypeId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`. Returns false when the name was already defined; the
    /// caller reports the redeclaration.
    pub fn define(&mut self, name: Symbol, ty: TypeId) -> bool {
        if self.objects.contains_key(&name) {
            return false;
        }
        self.objects.insert(name, ty);
        true
    }

    pub fn lookup(&self, name: Symbol) -> Option<TypeId> {
        self.objects.get(&name).copied()
    }

    /// Register an imported `pkg.Name` entity
    pub fn define_qualified(&mut self, pkg: Symbol, name: Symbol, ty: TypeId) {
        self.qualified.insert((pkg, name), ty);
    }

    pub fn lookup_qualified(&self, pkg: Symbol, name: Symbol) -> Option<TypeId> {
        self.qualified.get(&(pkg, name)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::type_arena::TypeArena;

    #[test]
    fn define_rejects_redeclaration() {
        let types = TypeArena::new();
        let mut scope = Scope::new();
        assert!(scope.define(Symbol(0), types.int()));
        assert!(!scope.define(Symbol(0), types.string()));
        assert_eq!(scope.lookup(Symbol(0)), Some(types.int()));
    }

    #[test]
    fn qualified_names_are_separate() {
        let types = TypeArena::new();
        let mut scope = Scope::new();
        scope.define_qualified(Symbol(1), Symbol(2), types.string());
        assert_eq!(scope.lookup_qualified(Symbol(1), Symbol(2)), Some(types.string()));
        assert_eq!(scope.lookup(Symbol(2)), None);
    }
}
