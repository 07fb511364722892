// src/sema/type_arena.rs
//
// Interned type system using TypeId handles for O(1) equality and minimal
// allocations. Types are immutable values: every constructor interns, and
// equal structure always yields the same TypeId, so structural equality is
// handle equality and substitution shares unaffected substructure for free.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::frontend::{Interner, Symbol};
use crate::sema::generics::TypeMap;

/// Handle to an interned type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    /// Get the raw index (for debugging/serialization)
    pub fn index(self) -> u32 {
        self.0
    }
}

/// SmallVec for type children - inline up to 4 (covers most parameter lists)
pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// SmallVec for type parameter names - generics rarely have more than two
pub type ParamVec = SmallVec<[Symbol; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Byte,
    Rune,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::String => "string",
            PrimitiveType::Int => "int",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Uint => "uint",
            PrimitiveType::Uint8 => "uint8",
            PrimitiveType::Uint16 => "uint16",
            PrimitiveType::Uint32 => "uint32",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Rune => "rune",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(PrimitiveType::Bool),
            "string" => Some(PrimitiveType::String),
            "int" => Some(PrimitiveType::Int),
            "int8" => Some(PrimitiveType::Int8),
            "int16" => Some(PrimitiveType::Int16),
            "int32" => Some(PrimitiveType::Int32),
            "int64" => Some(PrimitiveType::Int64),
            "uint" => Some(PrimitiveType::Uint),
            "uint8" => Some(PrimitiveType::Uint8),
            "uint16" => Some(PrimitiveType::Uint16),
            "uint32" => Some(PrimitiveType::Uint32),
            "uint64" => Some(PrimitiveType::Uint64),
            "float32" => Some(PrimitiveType::Float32),
            "float64" => Some(PrimitiveType::Float64),
            "byte" => Some(PrimitiveType::Byte),
            "rune" => Some(PrimitiveType::Rune),
            _ => None,
        }
    }
}

/// One field of a structure type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    pub name: Symbol,
    pub ty: TypeId,
    pub tag: Option<String>,
}

/// Function signature: receiver, parameters, results, variadic flag, and
/// the ordered type parameters of a generic function.
///
/// For a variadic signature the final parameter holds the element type; the
/// flag is rendered back as `...T`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureType {
    pub recv: Option<TypeId>,
    pub params: TypeIdVec,
    pub results: TypeIdVec,
    pub variadic: bool,
    pub type_params: ParamVec,
}

/// Declared named type. The owning symbol is the (pkg, name) pair, resolved
/// through the unit scope; no identity is stored in the type itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    pub pkg: Option<Symbol>,
    pub name: Symbol,
    pub type_params: ParamVec,
    pub underlying: TypeId,
}

/// Concrete instantiation of a named type or signature: the substituted
/// base, the originating type parameter list, and the substitution map that
/// produced it. The map's domain always equals the parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteType {
    pub base: TypeId,
    pub type_params: ParamVec,
    pub type_map: TypeMap,
}

/// Internal representation of interned types.
///
/// Uses TypeId for children instead of recursive references, which keeps
/// variants small and lets SmallVec inline the common cases.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum InternedType {
    Primitive(PrimitiveType),

    // Error/invalid type
    Invalid,

    /// A type parameter, legal only under a generic declaration or
    /// transiently during substitution
    TypeParam(Symbol),

    /// The "type" of a constant literal used as a type argument (the `3` in
    /// `Vec[3]`); its canonical string form is the literal text
    ConstLit(Symbol),

    // Compound types
    Pointer(TypeId),
    Slice(TypeId),
    Array { len: u64, elem: TypeId },
    Chan(TypeId),
    Map { key: TypeId, value: TypeId },
    Struct { fields: SmallVec<[StructField; 4]> },
    Signature(Box<SignatureType>),

    // Nominal types
    Named(Box<NamedType>),
    ConcreteNamed(Box<ConcreteType>),
    ConcreteSignature(Box<ConcreteType>),
}

/// Pre-interned primitive and common types for O(1) access
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveTypes {
    pub bool: TypeId,
    pub string: TypeId,
    pub int: TypeId,
    pub int8: TypeId,
    pub int16: TypeId,
    pub int32: TypeId,
    pub int64: TypeId,
    pub uint: TypeId,
    pub uint8: TypeId,
    pub uint16: TypeId,
    pub uint32: TypeId,
    pub uint64: TypeId,
    pub float32: TypeId,
    pub float64: TypeId,
    pub byte: TypeId,
    pub rune: TypeId,
    pub invalid: TypeId,
}

/// Per-compilation-unit type arena with automatic interning/deduplication.
pub struct TypeArena {
    /// Interned types, indexed by TypeId
    types: Vec<InternedType>,
    /// Deduplication map - hashbrown for better perf
    intern_map: HashMap<InternedType, TypeId>,
    /// Pre-interned primitives for O(1) access
    pub primitives: PrimitiveTypes,
}

impl TypeArena {
    /// Create a new TypeArena with pre-interned primitive types
    pub fn new() -> Self {
        let placeholder = TypeId(0);
        let mut arena = Self {
            types: Vec::new(),
            intern_map: HashMap::new(),
            primitives: PrimitiveTypes {
                bool: placeholder,
                string: placeholder,
                int: placeholder,
                int8: placeholder,
                int16: placeholder,
                int32: placeholder,
                int64: placeholder,
                uint: placeholder,
                uint8: placeholder,
                uint16: placeholder,
                uint32: placeholder,
                uint64: placeholder,
                float32: placeholder,
                float64: placeholder,
                byte: placeholder,
                rune: placeholder,
                invalid: placeholder,
            },
        };

        // Invalid must be first (index 0) for is_invalid() check
        arena.primitives.invalid = arena.intern(InternedType::Invalid);
        debug_assert_eq!(arena.primitives.invalid.0, 0);

        arena.primitives.bool = arena.intern(InternedType::Primitive(PrimitiveType::Bool));
        arena.primitives.string = arena.intern(InternedType::Primitive(PrimitiveType::String));
        arena.primitives.int = arena.intern(InternedType::Primitive(PrimitiveType::Int));
        arena.primitives.int8 = arena.intern(InternedType::Primitive(PrimitiveType::Int8));
        arena.primitives.int16 = arena.intern(InternedType::Primitive(PrimitiveType::Int16));
        arena.primitives.int32 = arena.intern(InternedType::Primitive(PrimitiveType::Int32));
        arena.primitives.int64 = arena.intern(InternedType::Primitive(PrimitiveType::Int64));
        arena.primitives.uint = arena.intern(InternedType::Primitive(PrimitiveType::Uint));
        arena.primitives.uint8 = arena.intern(InternedType::Primitive(PrimitiveType::Uint8));
        arena.primitives.uint16 = arena.intern(InternedType::Primitive(PrimitiveType::Uint16));
        arena.primitives.uint32 = arena.intern(InternedType::Primitive(PrimitiveType::Uint32));
        arena.primitives.uint64 = arena.intern(InternedType::Primitive(PrimitiveType::Uint64));
        arena.primitives.float32 = arena.intern(InternedType::Primitive(PrimitiveType::Float32));
        arena.primitives.float64 = arena.intern(InternedType::Primitive(PrimitiveType::Float64));
        arena.primitives.byte = arena.intern(InternedType::Primitive(PrimitiveType::Byte));
        arena.primitives.rune = arena.intern(InternedType::Primitive(PrimitiveType::Rune));

        arena
    }

    /// Intern a type, returning the existing TypeId if already interned
    fn intern(&mut self, ty: InternedType) -> TypeId {
        let next_id = TypeId(self.types.len() as u32);
        *self.intern_map.entry(ty.clone()).or_insert_with(|| {
            self.types.push(ty);
            next_id
        })
    }

    /// Get the InternedType for a TypeId
    pub fn get(&self, id: TypeId) -> &InternedType {
        &self.types[id.0 as usize]
    }

    /// Check if a TypeId is the invalid type
    pub fn is_invalid(&self, id: TypeId) -> bool {
        id.0 == 0 // Invalid is always at index 0
    }

    // ========================================================================
    // Primitive accessors
    // ========================================================================

    pub fn bool(&self) -> TypeId {
        self.primitives.bool
    }
    pub fn string(&self) -> TypeId {
        self.primitives.string
    }
    pub fn int(&self) -> TypeId {
        self.primitives.int
    }
    pub fn invalid(&self) -> TypeId {
        self.primitives.invalid
    }

    /// Get TypeId for a PrimitiveType
    pub fn primitive(&self, p: PrimitiveType) -> TypeId {
        match p {
            PrimitiveType::Bool => self.primitives.bool,
            PrimitiveType::String => self.primitives.string,
            PrimitiveType::Int => self.primitives.int,
            PrimitiveType::Int8 => self.primitives.int8,
            PrimitiveType::Int16 => self.primitives.int16,
            PrimitiveType::Int32 => self.primitives.int32,
            PrimitiveType::Int64 => self.primitives.int64,
            PrimitiveType::Uint => self.primitives.uint,
            PrimitiveType::Uint8 => self.primitives.uint8,
            PrimitiveType::Uint16 => self.primitives.uint16,
            PrimitiveType::Uint32 => self.primitives.uint32,
            PrimitiveType::Uint64 => self.primitives.uint64,
            PrimitiveType::Float32 => self.primitives.float32,
            PrimitiveType::Float64 => self.primitives.float64,
            PrimitiveType::Byte => self.primitives.byte,
            PrimitiveType::Rune => self.primitives.rune,
        }
    }

    // ========================================================================
    // Compound type builders - intern on construction
    // ========================================================================

    /// Create a type parameter placeholder
    pub fn type_param(&mut self, name: Symbol) -> TypeId {
        self.intern(InternedType::TypeParam(name))
    }

    /// Create the type of a constant literal type argument
    pub fn const_lit(&mut self, text: Symbol) -> TypeId {
        self.intern(InternedType::ConstLit(text))
    }

    /// Create a pointer type
    pub fn pointer(&mut self, base: TypeId) -> TypeId {
        if self.is_invalid(base) {
            return self.invalid();
        }
        self.intern(InternedType::Pointer(base))
    }

    /// Create a slice type
    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        if self.is_invalid(elem) {
            return self.invalid();
        }
        self.intern(InternedType::Slice(elem))
    }

    /// Create a fixed-length array type
    pub fn array(&mut self, len: u64, elem: TypeId) -> TypeId {
        if self.is_invalid(elem) {
            return self.invalid();
        }
        self.intern(InternedType::Array { len, elem })
    }

    /// Create a channel type
    pub fn chan_of(&mut self, elem: TypeId) -> TypeId {
        if self.is_invalid(elem) {
            return self.invalid();
        }
        self.intern(InternedType::Chan(elem))
    }

    /// Create a map type
    pub fn map_of(&mut self, key: TypeId, value: TypeId) -> TypeId {
        if self.is_invalid(key) || self.is_invalid(value) {
            return self.invalid();
        }
        self.intern(InternedType::Map { key, value })
    }

    /// Create a structure type
    pub fn struct_of(&mut self, fields: SmallVec<[StructField; 4]>) -> TypeId {
        if fields.iter().any(|f| self.is_invalid(f.ty)) {
            return self.invalid();
        }
        self.intern(InternedType::Struct { fields })
    }

    /// Create a function signature type
    pub fn signature(&mut self, sig: SignatureType) -> TypeId {
        if sig.params.iter().any(|&p| self.is_invalid(p))
            || sig.results.iter().any(|&r| self.is_invalid(r))
        {
            return self.invalid();
        }
        self.intern(InternedType::Signature(Box::new(sig)))
    }

    /// Create a named type. An invalid underlying is kept (the name still
    /// exists; error recovery degrades only the body).
    pub fn named(
        &mut self,
        pkg: Option<Symbol>,
        name: Symbol,
        type_params: ParamVec,
        underlying: TypeId,
    ) -> TypeId {
        self.intern(InternedType::Named(Box::new(NamedType {
            pkg,
            name,
            type_params,
            underlying,
        })))
    }

    /// Create a concrete instantiation of a named type
    pub fn concrete_named(
        &mut self,
        base: TypeId,
        type_params: ParamVec,
        type_map: TypeMap,
    ) -> TypeId {
        self.intern(InternedType::ConcreteNamed(Box::new(ConcreteType {
            base,
            type_params,
            type_map,
        })))
    }

    /// Create a concrete instantiation of a function signature
    pub fn concrete_signature(
        &mut self,
        base: TypeId,
        type_params: ParamVec,
        type_map: TypeMap,
    ) -> TypeId {
        self.intern(InternedType::ConcreteSignature(Box::new(ConcreteType {
            base,
            type_params,
            type_map,
        })))
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Check if this is a type parameter
    pub fn is_type_param(&self, id: TypeId) -> bool {
        matches!(self.get(id), InternedType::TypeParam(_))
    }

    /// Declared name of a named type (through one concrete wrapper)
    pub fn named_name(&self, id: TypeId) -> Option<Symbol> {
        match self.get(id) {
            InternedType::Named(named) => Some(named.name),
            InternedType::ConcreteNamed(concrete) => self.named_name(concrete.base),
            _ => None,
        }
    }

    /// Check whether a type is a generic declaration's type: a named type or
    /// signature with a non-empty type parameter list
    pub fn is_generic(&self, id: TypeId) -> bool {
        match self.get(id) {
            InternedType::Named(named) => !named.type_params.is_empty(),
            InternedType::Signature(sig) => !sig.type_params.is_empty(),
            _ => false,
        }
    }

    /// Check whether any type parameter occurs anywhere inside `id`.
    ///
    /// This is the ground test for usage registration: a substitution map is
    /// ground only if none of its values contains a type parameter.
    pub fn contains_type_param(&self, id: TypeId) -> bool {
        match self.get(id) {
            InternedType::TypeParam(_) => true,
            InternedType::Primitive(_) | InternedType::Invalid | InternedType::ConstLit(_) => false,
            InternedType::Pointer(elem) | InternedType::Slice(elem) | InternedType::Chan(elem) => {
                self.contains_type_param(*elem)
            }
            InternedType::Array { elem, .. } => self.contains_type_param(*elem),
            InternedType::Map { key, value } => {
                self.contains_type_param(*key) || self.contains_type_param(*value)
            }
            InternedType::Struct { fields } => {
                fields.iter().any(|f| self.contains_type_param(f.ty))
            }
            InternedType::Signature(sig) => {
                sig.recv.is_some_and(|r| self.contains_type_param(r))
                    || sig.params.iter().any(|&p| self.contains_type_param(p))
                    || sig.results.iter().any(|&r| self.contains_type_param(r))
            }
            InternedType::Named(named) => self.contains_type_param(named.underlying),
            InternedType::ConcreteNamed(concrete) | InternedType::ConcreteSignature(concrete) => {
                self.contains_type_param(concrete.base)
                    || concrete
                        .type_map
                        .iter()
                        .any(|(_, ty)| self.contains_type_param(ty))
            }
        }
    }

    // ========================================================================
    // Canonical rendering
    // ========================================================================

    /// Canonical string form of a type.
    ///
    /// This is the form used for usage keys and mangled names; it must be
    /// stable across runs and must match the printer's rendering of the
    /// equivalent type expression.
    pub fn type_string(&self, id: TypeId, interner: &Interner) -> String {
        match self.get(id) {
            InternedType::Primitive(p) => p.name().to_string(),
            InternedType::Invalid => "<invalid>".to_string(),
            InternedType::TypeParam(name) => interner.resolve(*name).to_string(),
            InternedType::ConstLit(text) => interner.resolve(*text).to_string(),
            InternedType::Pointer(base) => format!("*{}", self.type_string(*base, interner)),
            InternedType::Slice(elem) => format!("[]{}", self.type_string(*elem, interner)),
            InternedType::Array { len, elem } => {
                format!("[{}]{}", len, self.type_string(*elem, interner))
            }
            InternedType::Chan(elem) => format!("chan {}", self.type_string(*elem, interner)),
            InternedType::Map { key, value } => format!(
                "map[{}]{}",
                self.type_string(*key, interner),
                self.type_string(*value, interner)
            ),
            InternedType::Struct { fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        format!(
                            "{} {}",
                            interner.resolve(f.name),
                            self.type_string(f.ty, interner)
                        )
                    })
                    .collect();
                format!("struct{{{}}}", parts.join("; "))
            }
            InternedType::Signature(sig) => self.signature_string(sig, interner),
            InternedType::Named(named) => self.named_path(named.pkg, named.name, interner),
            InternedType::ConcreteNamed(concrete) => {
                let args: Vec<String> = concrete
                    .type_params
                    .iter()
                    .map(|&param| match concrete.type_map.get(param) {
                        Some(arg) => self.type_string(arg, interner),
                        None => "<invalid>".to_string(),
                    })
                    .collect();
                match self.get(concrete.base) {
                    InternedType::Named(named) => format!(
                        "{}[{}]",
                        self.named_path(named.pkg, named.name, interner),
                        args.join(",")
                    ),
                    _ => format!("<invalid>[{}]", args.join(",")),
                }
            }
            InternedType::ConcreteSignature(concrete) => {
                self.type_string(concrete.base, interner)
            }
        }
    }

    fn named_path(&self, pkg: Option<Symbol>, name: Symbol, interner: &Interner) -> String {
        match pkg {
            Some(pkg) => format!("{}.{}", interner.resolve(pkg), interner.resolve(name)),
            None => interner.resolve(name).to_string(),
        }
    }

    fn signature_string(&self, sig: &SignatureType, interner: &Interner) -> String {
        let mut params: Vec<String> = sig
            .params
            .iter()
            .map(|&p| self.type_string(p, interner))
            .collect();
        if sig.variadic {
            if let Some(last) = params.last_mut() {
                *last = format!("...{}", last);
            }
        }
        let results: Vec<String> = sig
            .results
            .iter()
            .map(|&r| self.type_string(r, interner))
            .collect();
        match results.len() {
            0 => format!("func({})", params.join(", ")),
            1 => format!("func({}) {}", params.join(", "), results[0]),
            _ => format!("func({}) ({})", params.join(", "), results.join(", ")),
        }
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn interning_deduplicates() {
        let mut arena = TypeArena::new();
        let int = arena.int();
        let a = arena.slice(int);
        let b = arena.slice(int);
        assert_eq!(a, b);
        let c = arena.pointer(a);
        let d = arena.pointer(b);
        assert_eq!(c, d);
    }

    #[test]
    fn invalid_propagates_through_compounds() {
        let mut arena = TypeArena::new();
        let invalid = arena.invalid();
        let invalid_slice = arena.slice(invalid);
        assert!(arena.is_invalid(invalid_slice));
        let int = arena.int();
        let invalid_map = arena.map_of(invalid, int);
        assert!(arena.is_invalid(invalid_map));
    }

    #[test]
    fn type_strings_match_source_forms() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let int = arena.int();
        let string = arena.string();

        let slice = arena.slice(int);
        assert_eq!(arena.type_string(slice, &interner), "[]int");

        let map = arena.map_of(string, slice);
        assert_eq!(arena.type_string(map, &interner), "map[string][]int");

        let arr = arena.array(4, int);
        assert_eq!(arena.type_string(arr, &interner), "[4]int");

        let chan = arena.chan_of(int);
        assert_eq!(arena.type_string(chan, &interner), "chan int");

        let ptr = arena.pointer(string);
        assert_eq!(arena.type_string(ptr, &interner), "*string");

        let user = interner.intern("User");
        let pkg = interner.intern("pkg");
        let underlying = arena.struct_of(SmallVec::new());
        let named = arena.named(Some(pkg), user, ParamVec::new(), underlying);
        assert_eq!(arena.type_string(named, &interner), "pkg.User");
    }

    #[test]
    fn signature_string_with_variadic() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let int = arena.int();
        let string = arena.string();
        let sig = arena.signature(SignatureType {
            recv: None,
            params: smallvec![string, int],
            results: smallvec![arena.bool()],
            variadic: true,
            type_params: ParamVec::new(),
        });
        assert_eq!(
            arena.type_string(sig, &interner),
            "func(string, ...int) bool"
        );
    }

    #[test]
    fn contains_type_param_is_deep() {
        let mut interner = Interner::new();
        let mut arena = TypeArena::new();
        let t = interner.intern("T");
        let param = arena.type_param(t);
        let slice = arena.slice(param);
        assert!(arena.contains_type_param(slice));
        let int = arena.int();
        let ground = arena.slice(int);
        assert!(!arena.contains_type_param(ground));
    }
}
