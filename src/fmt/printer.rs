// src/fmt/printer.rs

use std::fmt::Write;

use crate::frontend::ast::*;
use crate::frontend::Interner;

/// Render a file back to source text. Output is deterministic: equal trees
/// produce byte-identical text.
pub fn print_file(file: &File, interner: &Interner) -> String {
    let mut printer = Printer::new(interner);
    printer.file(file);
    printer.out
}

/// Canonical single-line text of an expression, as used for mangled names.
/// For every type form the core supports this matches the arena's canonical
/// type string.
pub fn expr_text(expr: &Expr, interner: &Interner) -> String {
    let mut printer = Printer::new(interner);
    printer.expr(expr);
    printer.out
}

struct Printer<'a> {
    out: String,
    indent: usize,
    interner: &'a Interner,
}

impl<'a> Printer<'a> {
    fn new(interner: &'a Interner) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            interner,
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn name(&mut self, sym: Symbol) {
        let text = self.interner.resolve(sym);
        self.out.push_str(text);
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn file(&mut self, file: &File) {
        self.push("package ");
        self.name(file.package.sym);
        self.push("\n");
        for decl in &file.decls {
            self.push("\n");
            self.decl(decl);
            self.push("\n");
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Gen(group) => self.gen_decl(group),
            Decl::Func(func) => self.func_decl(func),
        }
    }

    fn keyword(&mut self, keyword: DeclKeyword) {
        self.push(match keyword {
            DeclKeyword::Type => "type",
            DeclKeyword::Var => "var",
            DeclKeyword::Const => "const",
        });
    }

    fn gen_decl(&mut self, group: &GenDecl) {
        self.keyword(group.keyword);
        if group.specs.len() == 1 {
            self.push(" ");
            self.spec(&group.specs[0]);
            return;
        }
        self.push(" (");
        self.indent += 1;
        for spec in &group.specs {
            self.newline();
            self.spec(spec);
        }
        self.indent -= 1;
        self.newline();
        self.push(")");
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Type(ts) => self.type_spec(ts),
            Spec::Value(vs) => self.value_spec(vs),
        }
    }

    fn type_spec(&mut self, ts: &TypeSpec) {
        self.name(ts.name.sym);
        if let Some(params) = &ts.type_params {
            self.type_param_list(params);
        }
        self.push(" ");
        self.expr(&ts.ty);
    }

    fn value_spec(&mut self, vs: &ValueSpec) {
        for (i, name) in vs.names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.name(name.sym);
        }
        if let Some(ty) = &vs.ty {
            self.push(" ");
            self.expr(ty);
        }
        if !vs.values.is_empty() {
            self.push(" = ");
            self.expr_list(&vs.values);
        }
    }

    fn type_param_list(&mut self, params: &TypeParamList) {
        self.push("[");
        for (i, name) in params.names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.name(name.sym);
        }
        self.push("]");
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.push("func ");
        if let Some(recv) = &func.recv {
            self.push("(");
            self.field(recv);
            self.push(") ");
        }
        self.name(func.name.sym);
        if let Some(params) = &func.type_params {
            self.type_param_list(params);
        }
        self.func_signature(&func.ty);
        match &func.body {
            Some(body) => {
                self.push(" ");
                self.block(body);
            }
            None => {}
        }
    }

    fn func_signature(&mut self, ty: &FuncTypeExpr) {
        self.push("(");
        self.field_list(&ty.params, ty.variadic);
        self.push(")");
        match ty.results.len() {
            0 => {}
            1 if ty.results[0].names.is_empty() => {
                self.push(" ");
                self.expr(&ty.results[0].ty);
            }
            _ => {
                self.push(" (");
                self.field_list(&ty.results, false);
                self.push(")");
            }
        }
    }

    fn field_list(&mut self, fields: &[Field], variadic: bool) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            let last = i + 1 == fields.len();
            self.field_with_ellipsis(field, variadic && last);
        }
    }

    fn field(&mut self, field: &Field) {
        self.field_with_ellipsis(field, false);
    }

    fn field_with_ellipsis(&mut self, field: &Field, ellipsis: bool) {
        for (i, name) in field.names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.name(name.sym);
        }
        if !field.names.is_empty() {
            self.push(" ");
        }
        if ellipsis {
            self.push("...");
        }
        self.expr(&field.ty);
        if let Some(tag) = &field.tag {
            let _ = write!(self.out, " `{}`", tag);
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self, block: &Block) {
        if block.stmts.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for stmt in &block.stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(group) => self.gen_decl(group),
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Assign(assign) => {
                self.expr_list(&assign.lhs);
                self.push(if assign.define { " := " } else { " = " });
                self.expr_list(&assign.rhs);
            }
            Stmt::Return(ret) => {
                self.push("return");
                if !ret.results.is_empty() {
                    self.push(" ");
                    self.expr_list(&ret.results);
                }
            }
            Stmt::If(if_stmt) => {
                self.push("if ");
                self.expr(&if_stmt.cond);
                self.push(" ");
                self.block(&if_stmt.then);
                if let Some(els) = &if_stmt.els {
                    self.push(" else ");
                    self.stmt(els);
                }
            }
            Stmt::For(for_stmt) => {
                self.push("for ");
                if let Some(cond) = &for_stmt.cond {
                    self.expr(cond);
                    self.push(" ");
                }
                self.block(&for_stmt.body);
            }
            Stmt::Block(block) => self.block(block),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(sym) => self.name(*sym),
            ExprKind::BasicLit { text, .. } => self.push(text),
            ExprKind::Selector { x, sel } => {
                self.expr(x);
                self.push(".");
                self.name(sel.sym);
            }
            ExprKind::Index { x, index } => {
                self.expr(x);
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            ExprKind::TypeArgs { x, args } => {
                self.expr(x);
                self.push("[");
                self.expr_list(args);
                self.push("]");
            }
            ExprKind::Call { fun, args } => {
                self.expr(fun);
                self.push("(");
                self.expr_list(args);
                self.push(")");
            }
            ExprKind::Unary { op, x } => {
                self.push(op.symbol());
                self.expr(x);
            }
            ExprKind::Binary { x, op, y } => {
                self.expr(x);
                let _ = write!(self.out, " {} ", op.symbol());
                self.expr(y);
            }
            ExprKind::Paren(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
            ExprKind::Star(inner) => {
                self.push("*");
                self.expr(inner);
            }
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.expr(ty);
                }
                self.push("{");
                self.expr_list(elts);
                self.push("}");
            }
            ExprKind::KeyValue { key, value } => {
                self.expr(key);
                self.push(": ");
                self.expr(value);
            }
            ExprKind::ArrayType { len, elem } => {
                self.push("[");
                if let Some(len) = len {
                    self.expr(len);
                }
                self.push("]");
                self.expr(elem);
            }
            ExprKind::MapType { key, value } => {
                self.push("map[");
                self.expr(key);
                self.push("]");
                self.expr(value);
            }
            ExprKind::ChanType { elem } => {
                self.push("chan ");
                self.expr(elem);
            }
            ExprKind::StructType { fields } => self.struct_type(fields),
            ExprKind::FuncType(func_ty) => {
                self.push("func");
                self.func_signature(func_ty);
            }
        }
    }

    fn struct_type(&mut self, fields: &[Field]) {
        if fields.is_empty() {
            self.push("struct{}");
            return;
        }
        self.push("struct {");
        self.indent += 1;
        for field in fields {
            self.newline();
            self.field(field);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }
}
