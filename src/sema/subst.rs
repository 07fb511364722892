// src/sema/subst.rs
//
// The substitution engine: replaces type parameters inside a type with the
// concrete types of a substitution map, returning a new type. Substitution
// never mutates; rebuilt compounds re-intern, so unaffected substructure is
// shared and an identity substitution returns the identical TypeId.

use smallvec::SmallVec;

use crate::frontend::Interner;
use crate::sema::generics::{Generics, GenericsError, TypeMap};
use crate::sema::type_arena::{
    InternedType, SignatureType, StructField, TypeArena, TypeId, TypeIdVec,
};

/// Applies substitution maps over the unit's type arena. Borrows the
/// registry because grounding a concrete instantiation registers the
/// resulting usage (this is what completes nested generics).
pub struct Substituter<'a> {
    types: &'a mut TypeArena,
    generics: &'a mut Generics,
    interner: &'a Interner,
}

impl<'a> Substituter<'a> {
    pub fn new(
        types: &'a mut TypeArena,
        generics: &'a mut Generics,
        interner: &'a Interner,
    ) -> Self {
        Self {
            types,
            generics,
            interner,
        }
    }

    /// Substitute type parameters in `ty` with the concrete types of `map`.
    ///
    /// A type parameter mapped to another type parameter is kept unchanged:
    /// it is an inherited parameter, filled in later when the enclosing
    /// generic is itself instantiated. A type parameter with no binding at
    /// all is a checker bug and is surfaced as an error.
    pub fn substitute(&mut self, ty: TypeId, map: &TypeMap) -> Result<TypeId, GenericsError> {
        match self.types.get(ty).clone() {
            InternedType::TypeParam(name) => match map.get(name) {
                Some(new) if self.types.is_type_param(new) => Ok(ty),
                Some(new) => Ok(new),
                None => Err(GenericsError::UndefinedTypeParameter {
                    name: self.interner.resolve(name).to_string(),
                }),
            },

            InternedType::Pointer(base) => {
                let new_base = self.substitute(base, map)?;
                Ok(self.types.pointer(new_base))
            }

            InternedType::Slice(elem) => {
                let new_elem = self.substitute(elem, map)?;
                Ok(self.types.slice(new_elem))
            }

            InternedType::Array { len, elem } => {
                let new_elem = self.substitute(elem, map)?;
                Ok(self.types.array(len, new_elem))
            }

            InternedType::Chan(elem) => {
                let new_elem = self.substitute(elem, map)?;
                Ok(self.types.chan_of(new_elem))
            }

            InternedType::Map { key, value } => {
                let new_key = self.substitute(key, map)?;
                let new_value = self.substitute(value, map)?;
                Ok(self.types.map_of(new_key, new_value))
            }

            InternedType::Struct { fields } => {
                let mut new_fields: SmallVec<[StructField; 4]> =
                    SmallVec::with_capacity(fields.len());
                for field in &fields {
                    new_fields.push(StructField {
                        name: field.name,
                        ty: self.substitute(field.ty, map)?,
                        tag: field.tag.clone(),
                    });
                }
                Ok(self.types.struct_of(new_fields))
            }

            InternedType::Signature(sig) => {
                let recv = match sig.recv {
                    Some(recv) => Some(self.substitute(recv, map)?),
                    None => None,
                };
                let mut params: TypeIdVec = TypeIdVec::with_capacity(sig.params.len());
                for &param in &sig.params {
                    params.push(self.substitute(param, map)?);
                }
                let mut results: TypeIdVec = TypeIdVec::with_capacity(sig.results.len());
                for &result in &sig.results {
                    results.push(self.substitute(result, map)?);
                }
                // The type parameter list survives substitution; the
                // instantiation hook clears it at a higher level.
                Ok(self.types.signature(SignatureType {
                    recv,
                    params,
                    results,
                    variadic: sig.variadic,
                    type_params: sig.type_params.clone(),
                }))
            }

            InternedType::Named(named) => {
                let underlying = self.substitute(named.underlying, map)?;
                Ok(self.types.named(
                    named.pkg,
                    named.name,
                    named.type_params.clone(),
                    underlying,
                ))
            }

            InternedType::ConcreteNamed(concrete) => {
                // Ground the inherited entries of the instantiation's own
                // map, then redo the instantiation with the refreshed map.
                let mut refreshed = TypeMap::new();
                for (param, given) in concrete.type_map.iter() {
                    let mut entry = given;
                    if let InternedType::TypeParam(inherited) = self.types.get(given) {
                        if let Some(new) = map.get(*inherited) {
                            if !self.types.is_type_param(new) {
                                entry = new;
                            }
                        }
                    }
                    refreshed.insert(param, entry);
                }
                let base = self.substitute(concrete.base, &refreshed)?;
                let new_ty =
                    self.types
                        .concrete_named(base, concrete.type_params.clone(), refreshed.clone());
                if let Some(name) = self.types.named_name(base) {
                    self.generics
                        .register_usage(name, new_ty, refreshed, &*self.types, self.interner)?;
                }
                Ok(new_ty)
            }

            // Any other variant contains no type parameters to replace.
            InternedType::Primitive(_)
            | InternedType::Invalid
            | InternedType::ConstLit(_)
            | InternedType::ConcreteSignature(_) => Ok(ty),
        }
    }
}
