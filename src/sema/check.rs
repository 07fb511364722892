// src/sema/check.rs
//
// The generics subset of the Marmot checker. It registers generic
// declarations, resolves type expressions, and records every concrete
// instantiation in the unit's registry. Full expression typing belongs to
// the host checker; only the hooks that feed the specializer live here.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::SemanticError;
use crate::fmt::printer::expr_text;
use crate::frontend::ast::*;
use crate::frontend::{Interner, Span};
use crate::sema::generics::{Generics, GenericsError, TypeMap};
use crate::sema::scope::Scope;
use crate::sema::subst::Substituter;
use crate::sema::type_arena::{
    InternedType, ParamVec, PrimitiveType, SignatureType, StructField, TypeArena, TypeId,
    TypeIdVec,
};

/// A type error wrapping a miette-enabled SemanticError
#[derive(Debug, Clone)]
pub struct TypeError {
    pub error: SemanticError,
    pub span: Span,
}

impl TypeError {
    pub fn new(error: SemanticError, span: Span) -> Self {
        Self { error, span }
    }
}

/// The outcome of checking one compilation unit: the interned types, the
/// populated registry (read-only from here on), and every typing-time error.
pub struct CheckedUnit {
    pub types: TypeArena,
    pub generics: Generics,
    pub errors: Vec<TypeError>,
}

impl CheckedUnit {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Checker<'a> {
    interner: &'a mut Interner,
    types: TypeArena,
    generics: Generics,
    scope: Scope,
    /// Type parameters of the declaration currently being resolved
    type_params: Vec<Symbol>,
    /// Type spec positions by name, for on-demand resolution of forward
    /// references: name -> (decl index, spec index)
    pending: FxHashMap<Symbol, (usize, usize)>,
    /// Guard against recursive type declarations
    resolving: Vec<Symbol>,
    errors: Vec<TypeError>,
}

impl<'a> Checker<'a> {
    pub fn new(interner: &'a mut Interner) -> Self {
        Self {
            interner,
            types: TypeArena::new(),
            generics: Generics::new(),
            scope: Scope::new(),
            type_params: Vec::new(),
            pending: FxHashMap::default(),
            resolving: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Seed an imported, package-qualified named type. Stands in for the
    /// host checker's import resolution; the underlying is opaque here.
    pub fn declare_imported(&mut self, pkg: &str, name: &str) -> TypeId {
        let pkg_sym = self.interner.intern(pkg);
        let name_sym = self.interner.intern(name);
        let underlying = self.types.struct_of(SmallVec::new());
        let ty = self
            .types
            .named(Some(pkg_sym), name_sym, ParamVec::new(), underlying);
        self.scope.define_qualified(pkg_sym, name_sym, ty);
        ty
    }

    /// Check a compilation unit and hand back the populated registry.
    pub fn check_file(mut self, file: &File) -> CheckedUnit {
        self.collect_type_specs(file);

        // Resolve type declarations in source order; forward references
        // resolve on demand.
        let names: Vec<Symbol> = file
            .decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Gen(group) => Some(group.specs.iter().filter_map(|spec| match spec {
                    Spec::Type(ts) => Some(ts.name.sym),
                    Spec::Value(_) => None,
                })),
                Decl::Func(_) => None,
            })
            .flatten()
            .collect();
        for name in names {
            self.resolve_type_decl(file, name);
        }

        self.declare_funcs(file);
        self.check_usages(file);

        CheckedUnit {
            types: self.types,
            generics: self.generics,
            errors: self.errors,
        }
    }

    fn add_error(&mut self, error: SemanticError, span: Span) {
        self.errors.push(TypeError::new(error, span));
    }

    fn add_generics_error(&mut self, error: GenericsError, span: Span) {
        let error = match error {
            GenericsError::UndefinedTypeParameter { name } => {
                SemanticError::UndefinedTypeParameter {
                    name,
                    span: span.into(),
                }
            }
            GenericsError::MissingDecl { name } => SemanticError::MissingDecl {
                name,
                span: span.into(),
            },
        };
        self.add_error(error, span);
    }

    // ========================================================================
    // Pass 1: collect type specs, detect redeclarations
    // ========================================================================

    fn collect_type_specs(&mut self, file: &File) {
        for (decl_idx, decl) in file.decls.iter().enumerate() {
            let Decl::Gen(group) = decl else { continue };
            for (spec_idx, spec) in group.specs.iter().enumerate() {
                let Spec::Type(ts) = spec else { continue };
                if self
                    .pending
                    .insert(ts.name.sym, (decl_idx, spec_idx))
                    .is_some()
                {
                    self.add_error(
                        SemanticError::DuplicateGenericDecl {
                            name: self.interner.resolve(ts.name.sym).to_string(),
                            span: ts.name.span.into(),
                        },
                        ts.name.span,
                    );
                }
            }
        }
    }

    // ========================================================================
    // Pass 2: resolve type declarations
    // ========================================================================

    fn resolve_type_decl(&mut self, file: &File, name: Symbol) -> TypeId {
        if let Some(ty) = self.scope.lookup(name) {
            return ty;
        }
        if self.resolving.contains(&name) {
            // Recursive type declarations need indirection the host checker
            // owns; this subset stops at the cycle.
            return self.types.invalid();
        }
        let Some(&(decl_idx, spec_idx)) = self.pending.get(&name) else {
            return self.types.invalid();
        };
        let Decl::Gen(group) = &file.decls[decl_idx] else {
            return self.types.invalid();
        };
        let Spec::Type(ts) = &group.specs[spec_idx] else {
            return self.types.invalid();
        };

        // Declaration-position disambiguation: a type whose body is an array
        // type with an identifier length is a generic declaration with that
        // single parameter.
        let (params, body): (Vec<Symbol>, &Expr) = match (&ts.type_params, &ts.ty.kind) {
            (Some(list), _) => (list.names.iter().map(|n| n.sym).collect(), &ts.ty),
            (None, ExprKind::ArrayType { len: Some(len), elem }) => {
                if let ExprKind::Ident(param) = len.kind {
                    (vec![param], elem.as_ref())
                } else {
                    (Vec::new(), &ts.ty)
                }
            }
            (None, _) => (Vec::new(), &ts.ty),
        };

        self.resolving.push(name);
        let saved = std::mem::replace(&mut self.type_params, params.clone());
        let underlying = self.resolve_type(file, body);
        self.type_params = saved;
        self.resolving.pop();

        let named = self.types.named(
            None,
            name,
            ParamVec::from_vec(params.clone()),
            underlying,
        );
        self.scope.define(name, named);
        if !params.is_empty() {
            self.generics.register_decl(name, named, params);
        }
        named
    }

    // ========================================================================
    // Pass 3: function signatures
    // ========================================================================

    fn declare_funcs(&mut self, file: &File) {
        for decl in &file.decls {
            let Decl::Func(func) = decl else { continue };
            let params: Vec<Symbol> = func
                .type_params
                .as_ref()
                .map(|list| list.names.iter().map(|n| n.sym).collect())
                .unwrap_or_default();

            let saved = std::mem::replace(&mut self.type_params, params.clone());
            let recv = func
                .recv
                .as_ref()
                .map(|field| self.resolve_type(file, &field.ty));
            let (sig_params, sig_results) = self.resolve_func_fields(file, &func.ty);
            self.type_params = saved;

            let sig = self.types.signature(SignatureType {
                recv,
                params: sig_params,
                results: sig_results,
                variadic: func.ty.variadic,
                type_params: ParamVec::from_vec(params.clone()),
            });

            if func.recv.is_some() {
                // Methods are not registrable generics in this core.
                continue;
            }
            if !self.scope.define(func.name.sym, sig) {
                self.add_error(
                    SemanticError::DuplicateGenericDecl {
                        name: self.interner.resolve(func.name.sym).to_string(),
                        span: func.name.span.into(),
                    },
                    func.name.span,
                );
                continue;
            }
            if !params.is_empty() {
                self.generics.register_decl(func.name.sym, sig, params);
            }
        }
    }

    fn resolve_func_fields(
        &mut self,
        file: &File,
        func_ty: &FuncTypeExpr,
    ) -> (TypeIdVec, TypeIdVec) {
        (
            self.resolve_field_list(file, &func_ty.params),
            self.resolve_field_list(file, &func_ty.results),
        )
    }

    fn resolve_field_list(&mut self, file: &File, fields: &[Field]) -> TypeIdVec {
        let mut out = TypeIdVec::new();
        for field in fields {
            let ty = self.resolve_type(file, &field.ty);
            let count = field.names.len().max(1);
            for _ in 0..count {
                out.push(ty);
            }
        }
        out
    }

    // ========================================================================
    // Type expression resolution
    // ========================================================================

    fn resolve_type(&mut self, file: &File, expr: &Expr) -> TypeId {
        match &expr.kind {
            ExprKind::Ident(sym) => {
                if self.type_params.contains(sym) {
                    return self.types.type_param(*sym);
                }
                if let Some(ty) = self.scope.lookup(*sym) {
                    return ty;
                }
                if self.pending.contains_key(sym) {
                    return self.resolve_type_decl(file, *sym);
                }
                // Unit declarations shadow the primitive universe.
                if let Some(p) = PrimitiveType::from_name(self.interner.resolve(*sym)) {
                    return self.types.primitive(p);
                }
                self.add_error(
                    SemanticError::UndeclaredName {
                        name: self.interner.resolve(*sym).to_string(),
                        span: expr.span.into(),
                    },
                    expr.span,
                );
                self.types.invalid()
            }

            ExprKind::Selector { x, sel } => {
                if let ExprKind::Ident(pkg) = x.kind {
                    if let Some(ty) = self.scope.lookup_qualified(pkg, sel.sym) {
                        return ty;
                    }
                }
                self.add_error(
                    SemanticError::UndeclaredName {
                        name: expr_text(expr, &*self.interner),
                        span: expr.span.into(),
                    },
                    expr.span,
                );
                self.types.invalid()
            }

            ExprKind::Star(inner) => {
                let base = self.resolve_type(file, inner);
                self.types.pointer(base)
            }

            ExprKind::ArrayType { len: None, elem } => {
                let elem = self.resolve_type(file, elem);
                self.types.slice(elem)
            }

            ExprKind::ArrayType {
                len: Some(len),
                elem,
            } => {
                let elem_ty = self.resolve_type(file, elem);
                match &len.kind {
                    ExprKind::BasicLit {
                        kind: LitKind::Int,
                        text,
                    } => match text.parse::<u64>() {
                        Ok(n) => self.types.array(n, elem_ty),
                        Err(_) => self.types.invalid(),
                    },
                    // Constant expressions beyond literals are evaluated by
                    // the host checker.
                    _ => self.types.invalid(),
                }
            }

            ExprKind::MapType { key, value } => {
                let key = self.resolve_type(file, key);
                let value = self.resolve_type(file, value);
                self.types.map_of(key, value)
            }

            ExprKind::ChanType { elem } => {
                let elem = self.resolve_type(file, elem);
                self.types.chan_of(elem)
            }

            ExprKind::StructType { fields } => {
                let mut out: SmallVec<[StructField; 4]> = SmallVec::new();
                for field in fields {
                    let ty = self.resolve_type(file, &field.ty);
                    for name in &field.names {
                        out.push(StructField {
                            name: name.sym,
                            ty,
                            tag: field.tag.clone(),
                        });
                    }
                }
                self.types.struct_of(out)
            }

            ExprKind::FuncType(func_ty) => {
                let (params, results) = self.resolve_func_fields(file, func_ty);
                self.types.signature(SignatureType {
                    recv: None,
                    params,
                    results,
                    variadic: func_ty.variadic,
                    type_params: ParamVec::new(),
                })
            }

            ExprKind::TypeArgs { x, args } => self.instantiate(file, x, args, expr.span),

            ExprKind::Index { x, index } => {
                // Expression-position disambiguation: an index whose operand
                // names a registered generic is a one-argument instantiation.
                if let ExprKind::Ident(sym) = x.kind {
                    if self.scope.lookup(sym).is_none() && self.pending.contains_key(&sym) {
                        self.resolve_type_decl(file, sym);
                    }
                    if self.generics.contains(sym) {
                        return self.instantiate(
                            file,
                            x,
                            std::slice::from_ref(index.as_ref()),
                            expr.span,
                        );
                    }
                }
                self.add_error(
                    SemanticError::NotGeneric {
                        name: expr_text(x, &*self.interner),
                        span: x.span.into(),
                    },
                    x.span,
                );
                self.types.invalid()
            }

            ExprKind::Paren(inner) => self.resolve_type(file, inner),

            // Not a type expression; the host checker diagnoses these.
            _ => self.types.invalid(),
        }
    }

    /// A type-argument expression: a constant literal stands for itself,
    /// anything else resolves as a type expression.
    fn resolve_type_arg(&mut self, file: &File, arg: &Expr) -> TypeId {
        match &arg.kind {
            ExprKind::BasicLit { text, .. } => {
                let text = self.interner.intern(text);
                self.types.const_lit(text)
            }
            _ => self.resolve_type(file, arg),
        }
    }

    // ========================================================================
    // Instantiation hook
    // ========================================================================

    /// Resolve `x[args...]`: build the substitution map, compute the
    /// instantiated type, wrap it in a concrete-instantiation type, and
    /// register the usage. Errors go to the sink and yield the invalid type
    /// (the enclosing declaration is abandoned, the unit continues).
    fn instantiate(&mut self, file: &File, x: &Expr, args: &[Expr], span: Span) -> TypeId {
        let ExprKind::Ident(name) = x.kind else {
            self.add_error(
                SemanticError::UnsupportedInstantiationForm {
                    found: expr_text(x, &*self.interner),
                    span: x.span.into(),
                },
                x.span,
            );
            return self.types.invalid();
        };

        let gen_ty = if let Some(ty) = self.scope.lookup(name) {
            ty
        } else if self.pending.contains_key(&name) {
            self.resolve_type_decl(file, name)
        } else {
            self.add_error(
                SemanticError::UndeclaredName {
                    name: self.interner.resolve(name).to_string(),
                    span: x.span.into(),
                },
                x.span,
            );
            return self.types.invalid();
        };

        let decl_params: ParamVec = match self.types.get(gen_ty) {
            InternedType::Named(named) if !named.type_params.is_empty() => {
                named.type_params.clone()
            }
            InternedType::Signature(sig) if !sig.type_params.is_empty() => {
                sig.type_params.clone()
            }
            _ => {
                self.add_error(
                    SemanticError::NotGeneric {
                        name: self.interner.resolve(name).to_string(),
                        span: x.span.into(),
                    },
                    x.span,
                );
                return self.types.invalid();
            }
        };

        if args.len() != decl_params.len() {
            self.add_error(
                SemanticError::ArityMismatch {
                    expected: decl_params.len(),
                    actual: args.len(),
                    span: span.into(),
                },
                span,
            );
            return self.types.invalid();
        }

        let mut map = TypeMap::new();
        for (&param, arg) in decl_params.iter().zip(args) {
            let ty = self.resolve_type_arg(file, arg);
            if self.types.is_invalid(ty) {
                // The argument did not resolve; the error is already in the
                // sink and this declaration is abandoned.
                return self.types.invalid();
            }
            map.insert(param, ty);
        }

        match self.types.get(gen_ty).clone() {
            InternedType::Named(named) => {
                let underlying = {
                    let mut subst =
                        Substituter::new(&mut self.types, &mut self.generics, &*self.interner);
                    match subst.substitute(named.underlying, &map) {
                        Ok(ty) => ty,
                        Err(err) => {
                            self.add_generics_error(err, span);
                            return self.types.invalid();
                        }
                    }
                };
                // The instantiation consumed the parameter list; the wrapper
                // carries the original one.
                let base = self.types.named(named.pkg, named.name, ParamVec::new(), underlying);
                let wrapped =
                    self.types
                        .concrete_named(base, named.type_params.clone(), map.clone());
                if let Err(err) =
                    self.generics
                        .register_usage(name, wrapped, map, &self.types, &*self.interner)
                {
                    self.add_generics_error(err, span);
                }
                wrapped
            }
            InternedType::Signature(sig) => {
                let substituted = {
                    let mut subst =
                        Substituter::new(&mut self.types, &mut self.generics, &*self.interner);
                    match subst.substitute(gen_ty, &map) {
                        Ok(ty) => ty,
                        Err(err) => {
                            self.add_generics_error(err, span);
                            return self.types.invalid();
                        }
                    }
                };
                let cleared = match self.types.get(substituted).clone() {
                    InternedType::Signature(new_sig) => {
                        let mut new_sig = *new_sig;
                        new_sig.type_params = ParamVec::new();
                        self.types.signature(new_sig)
                    }
                    _ => substituted,
                };
                let wrapped =
                    self.types
                        .concrete_signature(cleared, sig.type_params.clone(), map.clone());
                if let Err(err) =
                    self.generics
                        .register_usage(name, wrapped, map, &self.types, &*self.interner)
                {
                    self.add_generics_error(err, span);
                }
                wrapped
            }
            _ => self.types.invalid(),
        }
    }

    // ========================================================================
    // Pass 4: walk value specs and function bodies for instantiations
    // ========================================================================

    fn check_usages(&mut self, file: &File) {
        for decl in &file.decls {
            match decl {
                Decl::Gen(group) => self.usage_gen_decl(file, group),
                Decl::Func(func) => {
                    let params: Vec<Symbol> = func
                        .type_params
                        .as_ref()
                        .map(|list| list.names.iter().map(|n| n.sym).collect())
                        .unwrap_or_default();
                    let saved = std::mem::replace(&mut self.type_params, params);
                    if let Some(body) = &func.body {
                        self.usage_block(file, body);
                    }
                    self.type_params = saved;
                }
            }
        }
    }

    fn usage_gen_decl(&mut self, file: &File, group: &GenDecl) {
        for spec in &group.specs {
            match spec {
                // Type spec bodies were walked during resolution.
                Spec::Type(_) => {}
                Spec::Value(vs) => {
                    if let Some(ty) = &vs.ty {
                        self.resolve_type(file, ty);
                    }
                    for value in &vs.values {
                        self.usage_expr(file, value);
                    }
                }
            }
        }
    }

    fn usage_block(&mut self, file: &File, block: &Block) {
        for stmt in &block.stmts {
            self.usage_stmt(file, stmt);
        }
    }

    fn usage_stmt(&mut self, file: &File, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(group) => self.usage_gen_decl(file, group),
            Stmt::Expr(expr) => self.usage_expr(file, expr),
            Stmt::Assign(assign) => {
                for lhs in &assign.lhs {
                    self.usage_expr(file, lhs);
                }
                for rhs in &assign.rhs {
                    self.usage_expr(file, rhs);
                }
            }
            Stmt::Return(ret) => {
                for result in &ret.results {
                    self.usage_expr(file, result);
                }
            }
            Stmt::If(if_stmt) => {
                self.usage_expr(file, &if_stmt.cond);
                self.usage_block(file, &if_stmt.then);
                if let Some(els) = &if_stmt.els {
                    self.usage_stmt(file, els);
                }
            }
            Stmt::For(for_stmt) => {
                if let Some(cond) = &for_stmt.cond {
                    self.usage_expr(file, cond);
                }
                self.usage_block(file, &for_stmt.body);
            }
            Stmt::Block(block) => self.usage_block(file, block),
        }
    }

    fn usage_expr(&mut self, file: &File, expr: &Expr) {
        match &expr.kind {
            ExprKind::TypeArgs { x, args } => {
                self.instantiate(file, x, args, expr.span);
            }
            ExprKind::Index { x, index } => {
                if let ExprKind::Ident(sym) = x.kind {
                    if self.generics.contains(sym) {
                        self.instantiate(file, x, std::slice::from_ref(index.as_ref()), expr.span);
                        return;
                    }
                }
                self.usage_expr(file, x);
                self.usage_expr(file, index);
            }
            ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
            ExprKind::Selector { x, .. } => self.usage_expr(file, x),
            ExprKind::Call { fun, args } => {
                self.usage_expr(file, fun);
                for arg in args {
                    self.usage_expr(file, arg);
                }
            }
            ExprKind::Unary { x, .. } => self.usage_expr(file, x),
            ExprKind::Binary { x, y, .. } => {
                self.usage_expr(file, x);
                self.usage_expr(file, y);
            }
            ExprKind::Paren(inner) | ExprKind::Star(inner) => self.usage_expr(file, inner),
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.resolve_type(file, ty);
                }
                for elt in elts {
                    self.usage_expr(file, elt);
                }
            }
            ExprKind::KeyValue { key, value } => {
                self.usage_expr(file, key);
                self.usage_expr(file, value);
            }
            ExprKind::ArrayType { len, elem } => {
                if let Some(len) = len {
                    self.usage_expr(file, len);
                }
                self.usage_expr(file, elem);
            }
            ExprKind::MapType { key, value } => {
                self.usage_expr(file, key);
                self.usage_expr(file, value);
            }
            ExprKind::ChanType { elem } => self.usage_expr(file, elem),
            ExprKind::StructType { fields } => {
                for field in fields {
                    self.usage_expr(file, &field.ty);
                }
            }
            ExprKind::FuncType(func_ty) => {
                for field in func_ty.params.iter().chain(&func_ty.results) {
                    self.usage_expr(file, &field.ty);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(interner: &mut Interner, name: &str) -> Expr {
        Expr::new(ExprKind::Ident(interner.intern(name)), Span::default())
    }

    fn named_ident(interner: &mut Interner, name: &str) -> Ident {
        Ident::new(interner.intern(name), Span::default())
    }

    fn box_decl(interner: &mut Interner) -> Decl {
        // type Box[T] struct { v T }
        let t = named_ident(interner, "T");
        let v = named_ident(interner, "v");
        let field_ty = ident(interner, "T");
        Decl::Gen(GenDecl {
            keyword: DeclKeyword::Type,
            specs: vec![Spec::Type(TypeSpec {
                name: named_ident(interner, "Box"),
                type_params: Some(TypeParamList {
                    names: vec![t],
                    span: Span::default(),
                }),
                ty: Expr::new(
                    ExprKind::StructType {
                        fields: vec![Field {
                            names: vec![v],
                            ty: field_ty,
                            tag: None,
                            span: Span::default(),
                        }],
                    },
                    Span::default(),
                ),
                span: Span::default(),
            })],
            span: Span::default(),
        })
    }

    fn var_decl(interner: &mut Interner, name: &str, ty: Expr) -> Decl {
        Decl::Gen(GenDecl {
            keyword: DeclKeyword::Var,
            specs: vec![Spec::Value(ValueSpec {
                names: vec![named_ident(interner, name)],
                ty: Some(ty),
                values: vec![],
                span: Span::default(),
            })],
            span: Span::default(),
        })
    }

    fn type_args(x: Expr, args: Vec<Expr>) -> Expr {
        Expr::new(
            ExprKind::TypeArgs {
                x: Box::new(x),
                args,
            },
            Span::default(),
        )
    }

    fn check(interner: &mut Interner, decls: Vec<Decl>) -> CheckedUnit {
        let file = File {
            package: Ident::new(interner.intern("main"), Span::default()),
            decls,
        };
        Checker::new(interner).check_file(&file)
    }

    #[test]
    fn registers_decl_and_usages() {
        let mut interner = Interner::new();
        let box_d = box_decl(&mut interner);
        let box_ref = ident(&mut interner, "Box");
        let int_ref = ident(&mut interner, "int");
        let use_d = var_decl(&mut interner, "a", type_args(box_ref, vec![int_ref]));
        let unit = check(&mut interner, vec![box_d, use_d]);

        assert!(!unit.has_errors(), "{:?}", unit.errors);
        let decl = unit.generics.get(interner.intern("Box")).unwrap();
        let keys: Vec<&str> = decl.usages().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["int"]);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let mut interner = Interner::new();
        let box_d = box_decl(&mut interner);
        let box_ref = ident(&mut interner, "Box");
        let int_ref = ident(&mut interner, "int");
        let string_ref = ident(&mut interner, "string");
        let use_d = var_decl(
            &mut interner,
            "x",
            type_args(box_ref, vec![int_ref, string_ref]),
        );
        let unit = check(&mut interner, vec![box_d, use_d]);

        assert!(unit.errors.iter().any(|e| matches!(
            e.error,
            SemanticError::ArityMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        )));
        // The bad usage was not registered.
        let decl = unit.generics.get(interner.intern("Box")).unwrap();
        assert_eq!(decl.usage_count(), 0);
    }

    #[test]
    fn not_generic_is_reported() {
        let mut interner = Interner::new();
        // type Plain struct {} ; var x Plain[int]
        let plain = Decl::Gen(GenDecl {
            keyword: DeclKeyword::Type,
            specs: vec![Spec::Type(TypeSpec {
                name: named_ident(&mut interner, "Plain"),
                type_params: None,
                ty: Expr::new(ExprKind::StructType { fields: vec![] }, Span::default()),
                span: Span::default(),
            })],
            span: Span::default(),
        });
        let plain_ref = ident(&mut interner, "Plain");
        let int_ref = ident(&mut interner, "int");
        let use_d = var_decl(&mut interner, "x", type_args(plain_ref, vec![int_ref]));
        let unit = check(&mut interner, vec![plain, use_d]);

        assert!(unit
            .errors
            .iter()
            .any(|e| matches!(e.error, SemanticError::NotGeneric { .. })));
    }

    #[test]
    fn ambiguous_array_form_declares_a_generic() {
        let mut interner = Interner::new();
        // type Vec[N] int, parsed as an array type with identifier length
        let n_ref = ident(&mut interner, "N");
        let int_ref = ident(&mut interner, "int");
        let vec_d = Decl::Gen(GenDecl {
            keyword: DeclKeyword::Type,
            specs: vec![Spec::Type(TypeSpec {
                name: named_ident(&mut interner, "Vec"),
                type_params: None,
                ty: Expr::new(
                    ExprKind::ArrayType {
                        len: Some(Box::new(n_ref)),
                        elem: Box::new(int_ref),
                    },
                    Span::default(),
                ),
                span: Span::default(),
            })],
            span: Span::default(),
        });
        // var v Vec[3], parsed as an index expression
        let vec_ref = ident(&mut interner, "Vec");
        let three = Expr::new(
            ExprKind::BasicLit {
                kind: LitKind::Int,
                text: "3".to_string(),
            },
            Span::default(),
        );
        let use_d = var_decl(
            &mut interner,
            "v",
            Expr::new(
                ExprKind::Index {
                    x: Box::new(vec_ref),
                    index: Box::new(three),
                },
                Span::default(),
            ),
        );
        let unit = check(&mut interner, vec![vec_d, use_d]);

        assert!(!unit.has_errors(), "{:?}", unit.errors);
        let decl = unit.generics.get(interner.intern("Vec")).unwrap();
        assert_eq!(decl.type_params().len(), 1);
        let keys: Vec<&str> = decl.usages().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["3"]);
    }

    #[test]
    fn qualified_argument_resolves_through_imports() {
        let mut interner = Interner::new();
        let box_d = box_decl(&mut interner);
        let box_ref = ident(&mut interner, "Box");
        let pkg_user = Expr::new(
            ExprKind::Selector {
                x: Box::new(ident(&mut interner, "pkg")),
                sel: named_ident(&mut interner, "User"),
            },
            Span::default(),
        );
        let use_d = var_decl(&mut interner, "u", type_args(box_ref, vec![pkg_user]));

        let file = File {
            package: Ident::new(interner.intern("main"), Span::default()),
            decls: vec![box_d, use_d],
        };
        let mut checker = Checker::new(&mut interner);
        checker.declare_imported("pkg", "User");
        let unit = checker.check_file(&file);

        assert!(!unit.has_errors(), "{:?}", unit.errors);
        let decl = unit.generics.get(interner.intern("Box")).unwrap();
        let keys: Vec<&str> = decl.usages().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["pkg.User"]);
    }
}
