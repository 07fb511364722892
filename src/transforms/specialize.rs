// src/transforms/specialize.rs
//
// The specializer: consumes a checked file and its generics registry and
// produces a new file in which every generic declaration is replaced by one
// concrete declaration per usage and every instantiation expression by a
// plain identifier. Two passes over an immutable input tree:
//
//   1. expansion  - clone each generic declaration once per usage, mangle
//     the name, clear the parameter list, rewrite parameter identifiers
//   2. reference rewriting - fold instantiation expressions (and index
//     expressions that name a generic) into the mangled identifiers
//
// Errors here are fatal to the unit: a tree that still confuses the
// specializer after checking is an upstream invariant violation.

use crate::errors::SpecializeError;
use crate::fmt::printer::expr_text;
use crate::frontend::ast::*;
use crate::frontend::{Interner, Span};
use crate::sema::check::CheckedUnit;
use crate::sema::generics::{GenericDecl, GenericUsage, Generics};
use crate::sema::type_arena::TypeArena;

/// Rewrite `file` so that no generic declaration and no instantiation
/// expression remains. The input tree and the checked unit are read-only;
/// the result is a new tree.
pub fn specialize_file(
    file: &File,
    unit: &CheckedUnit,
    interner: &mut Interner,
) -> Result<File, SpecializeError> {
    let mut spec = Specializer {
        types: &unit.types,
        generics: &unit.generics,
        interner,
    };
    let expanded = spec.expand_file(file)?;
    spec.rewrite_file(&expanded)
}

struct Specializer<'a> {
    types: &'a TypeArena,
    generics: &'a Generics,
    interner: &'a mut Interner,
}

impl<'a> Specializer<'a> {
    // ========================================================================
    // Name mangling
    // ========================================================================

    /// Concrete name of a usage: the generic name and the canonical string
    /// forms of its substituted types, joined with `__`, periods replaced by
    /// underscores so qualified names stay one lexical identifier.
    fn concrete_name(&self, decl: &GenericDecl, usage: &GenericUsage) -> String {
        let mut parts = Vec::with_capacity(decl.type_params().len());
        for &param in decl.type_params() {
            let ty = usage
                .type_map()
                .get(param)
                .expect("usage map covers declared type parameters");
            parts.push(self.types.type_string(ty, &*self.interner).replace('.', "_"));
        }
        format!("{}__{}", self.interner.resolve(decl.name()), parts.join("__"))
    }

    /// Concrete identifier for an instantiation expression, built from the
    /// literal text of the argument expressions.
    fn concrete_expr(
        &mut self,
        x: &Expr,
        args: &[Expr],
        span: Span,
    ) -> Result<Expr, SpecializeError> {
        let ExprKind::Ident(sym) = x.kind else {
            return Err(SpecializeError::UnsupportedInstantiationForm {
                found: expr_text(x, &*self.interner),
                span: x.span.into(),
            });
        };
        let mut name = self.interner.resolve(sym).to_string();
        for arg in args {
            name.push_str("__");
            name.push_str(&expr_text(arg, &*self.interner).replace('.', "_"));
        }
        Ok(Expr::new(ExprKind::Ident(self.interner.intern(&name)), span))
    }

    // ========================================================================
    // Pass 1: expansion
    // ========================================================================

    fn expand_file(&mut self, file: &File) -> Result<File, SpecializeError> {
        let mut decls = Vec::with_capacity(file.decls.len());
        for decl in &file.decls {
            match decl {
                Decl::Gen(group) => {
                    if let Some(group) = self.expand_gen_decl(group)? {
                        decls.push(Decl::Gen(group));
                    }
                }
                Decl::Func(func) => {
                    let generic = func
                        .type_params
                        .as_ref()
                        .is_some_and(|list| !list.names.is_empty());
                    if generic {
                        decls.extend(self.expand_func_decl(func)?.into_iter().map(Decl::Func));
                    } else {
                        decls.push(Decl::Func(func.clone()));
                    }
                }
            }
        }
        Ok(File {
            package: file.package,
            decls,
        })
    }

    fn expand_gen_decl(&mut self, group: &GenDecl) -> Result<Option<GenDecl>, SpecializeError> {
        let mut specs = Vec::with_capacity(group.specs.len());
        for spec in &group.specs {
            match spec {
                Spec::Type(ts) if self.generics.contains(ts.name.sym) => {
                    specs.extend(self.expand_type_spec(ts)?);
                }
                other => specs.push(other.clone()),
            }
        }
        // A group whose specs were all generic and unused disappears.
        if specs.is_empty() {
            return Ok(None);
        }
        Ok(Some(GenDecl {
            keyword: group.keyword,
            specs,
            span: group.span,
        }))
    }

    fn expand_type_spec(&mut self, ts: &TypeSpec) -> Result<Vec<Spec>, SpecializeError> {
        let decl = self.generics.get(ts.name.sym).ok_or_else(|| {
            SpecializeError::MissingDecl {
                name: self.interner.resolve(ts.name.sym).to_string(),
                span: ts.name.span.into(),
            }
        })?;

        // The ambiguous array form reaches this pass with no parameter list:
        // re-derive the parameter from the array length identifier and take
        // the element type as the body.
        let mut base = ts.clone();
        if base.type_params.is_none() {
            if let ExprKind::ArrayType {
                len: Some(len),
                elem,
            } = &base.ty.kind
            {
                if let ExprKind::Ident(param) = len.kind {
                    base.type_params = Some(TypeParamList {
                        names: vec![Ident::new(param, len.span)],
                        span: len.span,
                    });
                    base.ty = (**elem).clone();
                }
            }
        }

        let mut clones: Vec<(String, Spec)> = Vec::with_capacity(decl.usage_count());
        for (_, usage) in decl.usages() {
            let name = self.concrete_name(decl, usage);
            let mut clone = base.clone();
            clone.name = Ident::new(self.interner.intern(&name), ts.name.span);
            clone.type_params = None;
            clone.ty = self.replace_idents_expr(&base.ty, usage);
            clones.push((name, Spec::Type(clone)));
        }
        clones.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(clones.into_iter().map(|(_, spec)| spec).collect())
    }

    fn expand_func_decl(&mut self, func: &FuncDecl) -> Result<Vec<FuncDecl>, SpecializeError> {
        let decl = self.generics.get(func.name.sym).ok_or_else(|| {
            SpecializeError::MissingDecl {
                name: self.interner.resolve(func.name.sym).to_string(),
                span: func.name.span.into(),
            }
        })?;

        let mut clones: Vec<(String, FuncDecl)> = Vec::with_capacity(decl.usage_count());
        for (_, usage) in decl.usages() {
            let name = self.concrete_name(decl, usage);
            let clone = FuncDecl {
                name: Ident::new(self.interner.intern(&name), func.name.span),
                type_params: None,
                recv: func
                    .recv
                    .as_ref()
                    .map(|field| self.replace_idents_field(field, usage)),
                ty: self.replace_idents_func_type(&func.ty, usage),
                body: func
                    .body
                    .as_ref()
                    .map(|body| self.replace_idents_block(body, usage)),
                span: func.span,
            };
            clones.push((name, clone));
        }
        clones.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(clones.into_iter().map(|(_, func)| func).collect())
    }

    // ========================================================================
    // Identifier rewriting inside cloned declarations
    //
    // Purely syntactic: any identifier whose text is a type parameter of the
    // usage is replaced by the canonical string form of the substituted
    // type. Type parameters are ordinary identifiers in the surface syntax
    // and cannot be shadowed inside a generic body, so this is equivalent to
    // semantic substitution.
    // ========================================================================

    fn replacement(&mut self, sym: Symbol, usage: &GenericUsage) -> Option<Symbol> {
        let ty = usage.type_map().get(sym)?;
        let text = self.types.type_string(ty, &*self.interner);
        Some(self.interner.intern(&text))
    }

    fn replace_idents_expr(&mut self, expr: &Expr, usage: &GenericUsage) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Ident(sym) => match self.replacement(*sym, usage) {
                Some(new) => ExprKind::Ident(new),
                None => ExprKind::Ident(*sym),
            },
            ExprKind::BasicLit { kind, text } => ExprKind::BasicLit {
                kind: *kind,
                text: text.clone(),
            },
            ExprKind::Selector { x, sel } => ExprKind::Selector {
                x: Box::new(self.replace_idents_expr(x, usage)),
                sel: self.replace_idents_ident(*sel, usage),
            },
            ExprKind::Index { x, index } => ExprKind::Index {
                x: Box::new(self.replace_idents_expr(x, usage)),
                index: Box::new(self.replace_idents_expr(index, usage)),
            },
            ExprKind::TypeArgs { x, args } => ExprKind::TypeArgs {
                x: Box::new(self.replace_idents_expr(x, usage)),
                args: args
                    .iter()
                    .map(|arg| self.replace_idents_expr(arg, usage))
                    .collect(),
            },
            ExprKind::Call { fun, args } => ExprKind::Call {
                fun: Box::new(self.replace_idents_expr(fun, usage)),
                args: args
                    .iter()
                    .map(|arg| self.replace_idents_expr(arg, usage))
                    .collect(),
            },
            ExprKind::Unary { op, x } => ExprKind::Unary {
                op: *op,
                x: Box::new(self.replace_idents_expr(x, usage)),
            },
            ExprKind::Binary { x, op, y } => ExprKind::Binary {
                x: Box::new(self.replace_idents_expr(x, usage)),
                op: *op,
                y: Box::new(self.replace_idents_expr(y, usage)),
            },
            ExprKind::Paren(inner) => {
                ExprKind::Paren(Box::new(self.replace_idents_expr(inner, usage)))
            }
            ExprKind::Star(inner) => {
                ExprKind::Star(Box::new(self.replace_idents_expr(inner, usage)))
            }
            ExprKind::CompositeLit { ty, elts } => ExprKind::CompositeLit {
                ty: ty
                    .as_ref()
                    .map(|ty| Box::new(self.replace_idents_expr(ty, usage))),
                elts: elts
                    .iter()
                    .map(|elt| self.replace_idents_expr(elt, usage))
                    .collect(),
            },
            ExprKind::KeyValue { key, value } => ExprKind::KeyValue {
                key: Box::new(self.replace_idents_expr(key, usage)),
                value: Box::new(self.replace_idents_expr(value, usage)),
            },
            ExprKind::ArrayType { len, elem } => ExprKind::ArrayType {
                len: len
                    .as_ref()
                    .map(|len| Box::new(self.replace_idents_expr(len, usage))),
                elem: Box::new(self.replace_idents_expr(elem, usage)),
            },
            ExprKind::MapType { key, value } => ExprKind::MapType {
                key: Box::new(self.replace_idents_expr(key, usage)),
                value: Box::new(self.replace_idents_expr(value, usage)),
            },
            ExprKind::ChanType { elem } => ExprKind::ChanType {
                elem: Box::new(self.replace_idents_expr(elem, usage)),
            },
            ExprKind::StructType { fields } => ExprKind::StructType {
                fields: fields
                    .iter()
                    .map(|field| self.replace_idents_field(field, usage))
                    .collect(),
            },
            ExprKind::FuncType(func_ty) => {
                ExprKind::FuncType(Box::new(self.replace_idents_func_type(func_ty, usage)))
            }
        };
        Expr::new(kind, expr.span)
    }

    fn replace_idents_ident(&mut self, ident: Ident, usage: &GenericUsage) -> Ident {
        match self.replacement(ident.sym, usage) {
            Some(new) => Ident::new(new, ident.span),
            None => ident,
        }
    }

    fn replace_idents_field(&mut self, field: &Field, usage: &GenericUsage) -> Field {
        Field {
            names: field.names.clone(),
            ty: self.replace_idents_expr(&field.ty, usage),
            tag: field.tag.clone(),
            span: field.span,
        }
    }

    fn replace_idents_func_type(
        &mut self,
        func_ty: &FuncTypeExpr,
        usage: &GenericUsage,
    ) -> FuncTypeExpr {
        FuncTypeExpr {
            params: func_ty
                .params
                .iter()
                .map(|field| self.replace_idents_field(field, usage))
                .collect(),
            results: func_ty
                .results
                .iter()
                .map(|field| self.replace_idents_field(field, usage))
                .collect(),
            variadic: func_ty.variadic,
        }
    }

    fn replace_idents_block(&mut self, block: &Block, usage: &GenericUsage) -> Block {
        Block {
            stmts: block
                .stmts
                .iter()
                .map(|stmt| self.replace_idents_stmt(stmt, usage))
                .collect(),
            span: block.span,
        }
    }

    fn replace_idents_stmt(&mut self, stmt: &Stmt, usage: &GenericUsage) -> Stmt {
        match stmt {
            Stmt::Decl(group) => Stmt::Decl(self.replace_idents_gen_decl(group, usage)),
            Stmt::Expr(expr) => Stmt::Expr(self.replace_idents_expr(expr, usage)),
            Stmt::Assign(assign) => Stmt::Assign(AssignStmt {
                lhs: assign
                    .lhs
                    .iter()
                    .map(|expr| self.replace_idents_expr(expr, usage))
                    .collect(),
                rhs: assign
                    .rhs
                    .iter()
                    .map(|expr| self.replace_idents_expr(expr, usage))
                    .collect(),
                define: assign.define,
                span: assign.span,
            }),
            Stmt::Return(ret) => Stmt::Return(ReturnStmt {
                results: ret
                    .results
                    .iter()
                    .map(|expr| self.replace_idents_expr(expr, usage))
                    .collect(),
                span: ret.span,
            }),
            Stmt::If(if_stmt) => Stmt::If(IfStmt {
                cond: self.replace_idents_expr(&if_stmt.cond, usage),
                then: self.replace_idents_block(&if_stmt.then, usage),
                els: if_stmt
                    .els
                    .as_ref()
                    .map(|els| Box::new(self.replace_idents_stmt(els, usage))),
                span: if_stmt.span,
            }),
            Stmt::For(for_stmt) => Stmt::For(ForStmt {
                cond: for_stmt
                    .cond
                    .as_ref()
                    .map(|cond| self.replace_idents_expr(cond, usage)),
                body: self.replace_idents_block(&for_stmt.body, usage),
                span: for_stmt.span,
            }),
            Stmt::Block(block) => Stmt::Block(self.replace_idents_block(block, usage)),
        }
    }

    fn replace_idents_gen_decl(&mut self, group: &GenDecl, usage: &GenericUsage) -> GenDecl {
        GenDecl {
            keyword: group.keyword,
            specs: group
                .specs
                .iter()
                .map(|spec| match spec {
                    Spec::Type(ts) => Spec::Type(TypeSpec {
                        name: ts.name,
                        type_params: ts.type_params.clone(),
                        ty: self.replace_idents_expr(&ts.ty, usage),
                        span: ts.span,
                    }),
                    Spec::Value(vs) => Spec::Value(ValueSpec {
                        names: vs.names.clone(),
                        ty: vs
                            .ty
                            .as_ref()
                            .map(|ty| self.replace_idents_expr(ty, usage)),
                        values: vs
                            .values
                            .iter()
                            .map(|value| self.replace_idents_expr(value, usage))
                            .collect(),
                        span: vs.span,
                    }),
                })
                .collect(),
            span: group.span,
        }
    }

    // ========================================================================
    // Pass 2: reference rewriting
    // ========================================================================

    fn rewrite_file(&mut self, file: &File) -> Result<File, SpecializeError> {
        let mut decls = Vec::with_capacity(file.decls.len());
        for decl in &file.decls {
            decls.push(match decl {
                Decl::Gen(group) => Decl::Gen(self.rewrite_gen_decl(group)?),
                Decl::Func(func) => Decl::Func(self.rewrite_func_decl(func)?),
            });
        }
        Ok(File {
            package: file.package,
            decls,
        })
    }

    fn rewrite_gen_decl(&mut self, group: &GenDecl) -> Result<GenDecl, SpecializeError> {
        let mut specs = Vec::with_capacity(group.specs.len());
        for spec in &group.specs {
            specs.push(match spec {
                Spec::Type(ts) => Spec::Type(TypeSpec {
                    name: ts.name,
                    type_params: ts.type_params.clone(),
                    ty: self.rewrite_expr(&ts.ty)?,
                    span: ts.span,
                }),
                Spec::Value(vs) => Spec::Value(ValueSpec {
                    names: vs.names.clone(),
                    ty: vs.ty.as_ref().map(|ty| self.rewrite_expr(ty)).transpose()?,
                    values: vs
                        .values
                        .iter()
                        .map(|value| self.rewrite_expr(value))
                        .collect::<Result<_, _>>()?,
                    span: vs.span,
                }),
            });
        }
        Ok(GenDecl {
            keyword: group.keyword,
            specs,
            span: group.span,
        })
    }

    fn rewrite_func_decl(&mut self, func: &FuncDecl) -> Result<FuncDecl, SpecializeError> {
        Ok(FuncDecl {
            name: func.name,
            type_params: func.type_params.clone(),
            recv: func
                .recv
                .as_ref()
                .map(|field| self.rewrite_field(field))
                .transpose()?,
            ty: self.rewrite_func_type(&func.ty)?,
            body: func
                .body
                .as_ref()
                .map(|body| self.rewrite_block(body))
                .transpose()?,
            span: func.span,
        })
    }

    fn rewrite_field(&mut self, field: &Field) -> Result<Field, SpecializeError> {
        Ok(Field {
            names: field.names.clone(),
            ty: self.rewrite_expr(&field.ty)?,
            tag: field.tag.clone(),
            span: field.span,
        })
    }

    fn rewrite_func_type(&mut self, func_ty: &FuncTypeExpr) -> Result<FuncTypeExpr, SpecializeError> {
        Ok(FuncTypeExpr {
            params: func_ty
                .params
                .iter()
                .map(|field| self.rewrite_field(field))
                .collect::<Result<_, _>>()?,
            results: func_ty
                .results
                .iter()
                .map(|field| self.rewrite_field(field))
                .collect::<Result<_, _>>()?,
            variadic: func_ty.variadic,
        })
    }

    fn rewrite_block(&mut self, block: &Block) -> Result<Block, SpecializeError> {
        Ok(Block {
            stmts: block
                .stmts
                .iter()
                .map(|stmt| self.rewrite_stmt(stmt))
                .collect::<Result<_, _>>()?,
            span: block.span,
        })
    }

    fn rewrite_stmt(&mut self, stmt: &Stmt) -> Result<Stmt, SpecializeError> {
        Ok(match stmt {
            Stmt::Decl(group) => Stmt::Decl(self.rewrite_gen_decl(group)?),
            Stmt::Expr(expr) => Stmt::Expr(self.rewrite_expr(expr)?),
            Stmt::Assign(assign) => Stmt::Assign(AssignStmt {
                lhs: assign
                    .lhs
                    .iter()
                    .map(|expr| self.rewrite_expr(expr))
                    .collect::<Result<_, _>>()?,
                rhs: assign
                    .rhs
                    .iter()
                    .map(|expr| self.rewrite_expr(expr))
                    .collect::<Result<_, _>>()?,
                define: assign.define,
                span: assign.span,
            }),
            Stmt::Return(ret) => Stmt::Return(ReturnStmt {
                results: ret
                    .results
                    .iter()
                    .map(|expr| self.rewrite_expr(expr))
                    .collect::<Result<_, _>>()?,
                span: ret.span,
            }),
            Stmt::If(if_stmt) => Stmt::If(IfStmt {
                cond: self.rewrite_expr(&if_stmt.cond)?,
                then: self.rewrite_block(&if_stmt.then)?,
                els: if_stmt
                    .els
                    .as_ref()
                    .map(|els| self.rewrite_stmt(els).map(Box::new))
                    .transpose()?,
                span: if_stmt.span,
            }),
            Stmt::For(for_stmt) => Stmt::For(ForStmt {
                cond: for_stmt
                    .cond
                    .as_ref()
                    .map(|cond| self.rewrite_expr(cond))
                    .transpose()?,
                body: self.rewrite_block(&for_stmt.body)?,
                span: for_stmt.span,
            }),
            Stmt::Block(block) => Stmt::Block(self.rewrite_block(block)?),
        })
    }

    fn rewrite_expr(&mut self, expr: &Expr) -> Result<Expr, SpecializeError> {
        let kind = match &expr.kind {
            // An instantiation the parser recognized: always folded.
            ExprKind::TypeArgs { x, args } => {
                return self.concrete_expr(x, args, expr.span);
            }
            // An ambiguous index expression: folded only when the operand
            // names a registered generic.
            ExprKind::Index { x, index } => {
                if let ExprKind::Ident(sym) = x.kind {
                    if self.generics.contains(sym) {
                        return self.concrete_expr(
                            x,
                            std::slice::from_ref(index.as_ref()),
                            expr.span,
                        );
                    }
                }
                ExprKind::Index {
                    x: Box::new(self.rewrite_expr(x)?),
                    index: Box::new(self.rewrite_expr(index)?),
                }
            }
            ExprKind::Ident(sym) => ExprKind::Ident(*sym),
            ExprKind::BasicLit { kind, text } => ExprKind::BasicLit {
                kind: *kind,
                text: text.clone(),
            },
            ExprKind::Selector { x, sel } => ExprKind::Selector {
                x: Box::new(self.rewrite_expr(x)?),
                sel: *sel,
            },
            ExprKind::Call { fun, args } => ExprKind::Call {
                fun: Box::new(self.rewrite_expr(fun)?),
                args: args
                    .iter()
                    .map(|arg| self.rewrite_expr(arg))
                    .collect::<Result<_, _>>()?,
            },
            ExprKind::Unary { op, x } => ExprKind::Unary {
                op: *op,
                x: Box::new(self.rewrite_expr(x)?),
            },
            ExprKind::Binary { x, op, y } => ExprKind::Binary {
                x: Box::new(self.rewrite_expr(x)?),
                op: *op,
                y: Box::new(self.rewrite_expr(y)?),
            },
            ExprKind::Paren(inner) => ExprKind::Paren(Box::new(self.rewrite_expr(inner)?)),
            ExprKind::Star(inner) => ExprKind::Star(Box::new(self.rewrite_expr(inner)?)),
            ExprKind::CompositeLit { ty, elts } => ExprKind::CompositeLit {
                ty: ty
                    .as_ref()
                    .map(|ty| self.rewrite_expr(ty).map(Box::new))
                    .transpose()?,
                elts: elts
                    .iter()
                    .map(|elt| self.rewrite_expr(elt))
                    .collect::<Result<_, _>>()?,
            },
            ExprKind::KeyValue { key, value } => ExprKind::KeyValue {
                key: Box::new(self.rewrite_expr(key)?),
                value: Box::new(self.rewrite_expr(value)?),
            },
            ExprKind::ArrayType { len, elem } => ExprKind::ArrayType {
                len: len
                    .as_ref()
                    .map(|len| self.rewrite_expr(len).map(Box::new))
                    .transpose()?,
                elem: Box::new(self.rewrite_expr(elem)?),
            },
            ExprKind::MapType { key, value } => ExprKind::MapType {
                key: Box::new(self.rewrite_expr(key)?),
                value: Box::new(self.rewrite_expr(value)?),
            },
            ExprKind::ChanType { elem } => ExprKind::ChanType {
                elem: Box::new(self.rewrite_expr(elem)?),
            },
            ExprKind::StructType { fields } => ExprKind::StructType {
                fields: fields
                    .iter()
                    .map(|field| self.rewrite_field(field))
                    .collect::<Result<_, _>>()?,
            },
            ExprKind::FuncType(func_ty) => {
                ExprKind::FuncType(Box::new(self.rewrite_func_type(func_ty)?))
            }
        };
        Ok(Expr::new(kind, expr.span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::check::Checker;
    use crate::sema::generics::TypeMap;

    fn ident(interner: &mut Interner, name: &str) -> Expr {
        Expr::new(ExprKind::Ident(interner.intern(name)), Span::default())
    }

    #[test]
    fn expr_name_replaces_periods() {
        let mut interner = Interner::new();
        let types = TypeArena::new();
        let generics = Generics::new();
        let mut spec = Specializer {
            types: &types,
            generics: &generics,
            interner: &mut interner,
        };

        let box_ref = ident(spec.interner, "Box");
        let arg = Expr::new(
            ExprKind::Selector {
                x: Box::new(ident(spec.interner, "pkg")),
                sel: Ident::new(spec.interner.intern("User"), Span::default()),
            },
            Span::default(),
        );
        let rewritten = spec
            .concrete_expr(&box_ref, std::slice::from_ref(&arg), Span::default())
            .unwrap();
        let ExprKind::Ident(sym) = rewritten.kind else {
            panic!("expected identifier");
        };
        assert_eq!(spec.interner.resolve(sym), "Box__pkg_User");
    }

    #[test]
    fn non_identifier_operand_is_rejected() {
        let mut interner = Interner::new();
        let types = TypeArena::new();
        let generics = Generics::new();
        let mut spec = Specializer {
            types: &types,
            generics: &generics,
            interner: &mut interner,
        };

        let operand = Expr::new(
            ExprKind::Selector {
                x: Box::new(ident(spec.interner, "other")),
                sel: Ident::new(spec.interner.intern("Box"), Span::default()),
            },
            Span::default(),
        );
        let arg = ident(spec.interner, "int");
        let err = spec
            .concrete_expr(&operand, std::slice::from_ref(&arg), Span::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SpecializeError::UnsupportedInstantiationForm { .. }
        ));
    }

    #[test]
    fn concrete_name_orders_by_declared_parameters() {
        let mut interner = Interner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let pair = interner.intern("Pair");

        let mut types = TypeArena::new();
        let underlying = types.struct_of(smallvec::SmallVec::new());
        let declared = types.named(None, pair, smallvec::smallvec![a, b], underlying);

        let mut generics = Generics::new();
        generics.register_decl(pair, declared, vec![a, b]);
        let mut map = TypeMap::new();
        map.insert(b, types.int());
        map.insert(a, types.string());
        generics
            .register_usage(pair, declared, map, &types, &interner)
            .unwrap();

        let spec = Specializer {
            types: &types,
            generics: &generics,
            interner: &mut interner,
        };
        let decl = spec.generics.get(pair).unwrap();
        let (_, usage) = decl.usages().next().unwrap();
        assert_eq!(spec.concrete_name(decl, usage), "Pair__string__int");
    }

    #[test]
    fn expansion_is_sorted_by_generated_name() {
        let mut interner = Interner::new();

        // type Box[T] struct { v T } used with string and int arguments;
        // clone order must follow the generated names, not insertion.
        let t = Ident::new(interner.intern("T"), Span::default());
        let box_name = Ident::new(interner.intern("Box"), Span::default());
        let field = Field {
            names: vec![Ident::new(interner.intern("v"), Span::default())],
            ty: ident(&mut interner, "T"),
            tag: None,
            span: Span::default(),
        };
        let ts = TypeSpec {
            name: box_name,
            type_params: Some(TypeParamList {
                names: vec![t],
                span: Span::default(),
            }),
            ty: Expr::new(
                ExprKind::StructType {
                    fields: vec![field],
                },
                Span::default(),
            ),
            span: Span::default(),
        };
        let file = File {
            package: Ident::new(interner.intern("main"), Span::default()),
            decls: vec![
                Decl::Gen(GenDecl {
                    keyword: DeclKeyword::Type,
                    specs: vec![Spec::Type(ts.clone())],
                    span: Span::default(),
                }),
                Decl::Gen(GenDecl {
                    keyword: DeclKeyword::Var,
                    specs: vec![Spec::Value(ValueSpec {
                        names: vec![Ident::new(interner.intern("s"), Span::default())],
                        ty: Some(Expr::new(
                            ExprKind::TypeArgs {
                                x: Box::new(ident(&mut interner, "Box")),
                                args: vec![ident(&mut interner, "string")],
                            },
                            Span::default(),
                        )),
                        values: vec![],
                        span: Span::default(),
                    })],
                    span: Span::default(),
                }),
                Decl::Gen(GenDecl {
                    keyword: DeclKeyword::Var,
                    specs: vec![Spec::Value(ValueSpec {
                        names: vec![Ident::new(interner.intern("i"), Span::default())],
                        ty: Some(Expr::new(
                            ExprKind::TypeArgs {
                                x: Box::new(ident(&mut interner, "Box")),
                                args: vec![ident(&mut interner, "int")],
                            },
                            Span::default(),
                        )),
                        values: vec![],
                        span: Span::default(),
                    })],
                    span: Span::default(),
                }),
            ],
        };

        let unit = Checker::new(&mut interner).check_file(&file);
        assert!(!unit.has_errors(), "{:?}", unit.errors);

        let mut spec = Specializer {
            types: &unit.types,
            generics: &unit.generics,
            interner: &mut interner,
        };
        let specs = spec.expand_type_spec(&ts).unwrap();
        let names: Vec<&str> = specs
            .iter()
            .map(|s| match s {
                Spec::Type(ts) => spec.interner.resolve(ts.name.sym),
                Spec::Value(_) => unreachable!(),
            })
            .collect();
        assert_eq!(names, vec!["Box__int", "Box__string"]);
    }
}
