// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end checks of expression shape, recovery and literal decoding
//! through `parse_source`.

use c3_ast::decl::{AttrArg, DeclKind, FuncBody, OverloadOp};
use c3_ast::expr::{Arg, Expr, ExprKind};
use c3_ast::literal::{FloatSuffix, LiteralKind};
use c3_ast::stmt::{NextcaseTarget, StmtKind, VarDecl};
use c3_ast::token::CtKeyword;
use c3_ast::ty::{PrimitiveType, TypeKind};
use c3_parser::{parse_source, ParseConfig, ParseErrorKind, ParseOutput};

fn parse(src: &str) -> ParseOutput {
    parse_source(src, &ParseConfig::default())
}

/// Statements of the first function in `src`.
fn body(src: &str) -> Vec<StmtKind> {
    let out = parse(src);
    assert!(out.is_ok(), "errors in {:?}: {:?} {:?}", src, out.lex_errors, out.errors);
    let Some(DeclKind::Func(f)) = out.unit.decls.into_iter().next().map(|d| d.kind) else {
        panic!("expected a function")
    };
    let Some(FuncBody::Block(block)) = f.body else { panic!("expected a block body") };
    block.stmts.into_iter().map(|s| s.kind).collect()
}

fn expr(src: &str) -> Expr {
    let wrapped = format!("fn void f() {{ {}; }}", src);
    match body(&wrapped).into_iter().next() {
        Some(StmtKind::Expr(e)) => e,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn local(src: &str) -> VarDecl {
    let wrapped = format!("fn void f() {{ {}; }}", src);
    match body(&wrapped).into_iter().next() {
        Some(StmtKind::Var(v)) => v,
        other => panic!("expected declaration, got {:?}", other),
    }
}

/// Compact prefix rendering of operator structure.
fn shape(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Literal(lit) => lit.lexeme.clone(),
        ExprKind::Ident { name, .. } => name.clone(),
        ExprKind::Binary { op, left, right } => format!("({} {} {})", op.as_str(), shape(left), shape(right)),
        ExprKind::Assign { op, target, value } => format!("({} {} {})", op.as_str(), shape(target), shape(value)),
        ExprKind::Unary { op, operand } => format!("({} {})", op.as_str(), shape(operand)),
        ExprKind::Ternary { cond, then_expr, else_expr } => {
            format!("(? {} {} {})", shape(cond), shape(then_expr), shape(else_expr))
        }
        ExprKind::Elvis { left, right } => format!("(?: {} {})", shape(left), shape(right)),
        ExprKind::OptElse { left, right } => format!("(?? {} {})", shape(left), shape(right)),
        ExprKind::Try { expr, .. } => format!("(try {})", shape(expr)),
        ExprKind::Catch { exprs, .. } => {
            let inner: Vec<_> = exprs.iter().map(shape).collect();
            format!("(catch {})", inner.join(" "))
        }
        ExprKind::Paren(inner) => shape(inner),
        ExprKind::Call { callee, .. } => format!("(call {})", shape(callee)),
        other => format!("<{:?}>", std::mem::discriminant(other)),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(shape(&expr("1 + 2 * 3")), "(+ 1 (* 2 3))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(shape(&expr("a = b = c")), "(= a (= b c))");
    assert_eq!(shape(&expr("a += b -= c")), "(+= a (-= b c))");
}

#[test]
fn comparisons_are_left_associative() {
    assert_eq!(shape(&expr("a < b < c")), "(< (< a b) c)");
}

#[test]
fn bitwise_sits_between_additive_and_shift() {
    assert_eq!(shape(&expr("a + b & c")), "(+ a (& b c))");
    assert_eq!(shape(&expr("a & b << c")), "(& a (<< b c))");
    assert_eq!(shape(&expr("a || b && c")), "(|| a (&& b c))");
}

#[test]
fn ternary_family_is_right_associative() {
    assert_eq!(shape(&expr("a ? b : c ? d : e")), "(? a b (? c d e))");
    assert_eq!(shape(&expr("a ?: b ?: c")), "(?: a (?: b c))");
    assert_eq!(shape(&expr("a ?? b ?? c")), "(?? a (?? b c))");
}

#[test]
fn try_and_catch_bind_at_comparison_level() {
    assert_eq!(shape(&expr("x = try a && b")), "(= x (&& (try a) b))");
    assert_eq!(shape(&expr("x = try a < b")), "(= x (try (< a b)))");
    assert_eq!(shape(&expr("x = catch a ?: b")), "(= x (?: (catch a) b))");
}

#[test]
fn unary_binds_tighter_than_binary() {
    assert_eq!(shape(&expr("-a * b")), "(* (- a) b)");
    assert_eq!(shape(&expr("!a && b")), "(&& (! a) b)");
}

#[test]
fn assigning_to_an_rvalue_is_reported_but_parsed() {
    let out = parse("fn void f() { 1 + 2 = 3; }");
    assert_eq!(out.errors.len(), 1);
    assert!(matches!(out.errors[0].kind, ParseErrorKind::Structural { .. }));
}

#[test]
fn recovery_after_missing_operand() {
    let src = "fn void f() { x = ; return 1; }";
    let out = parse(src);
    assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
    let at = src.find(';').expect("semicolon");
    assert_eq!(out.errors[0].span.start, at);

    let Some(DeclKind::Func(f)) = out.unit.decls.first().map(|d| &d.kind) else { panic!("expected fn") };
    let Some(FuncBody::Block(block)) = &f.body else { panic!("expected block") };
    assert!(block.stmts.iter().any(|s| matches!(s.kind, StmtKind::Return(Some(_)))));
}

#[test]
fn malformed_case_label_keeps_the_switch() {
    let out = parse("fn void f() { switch (x) { case : a(); case 2: b(); } c(); }");
    assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
    assert_eq!(out.unit.decls.len(), 1);

    let Some(DeclKind::Func(f)) = out.unit.decls.first().map(|d| &d.kind) else { panic!("expected fn") };
    let Some(FuncBody::Block(block)) = &f.body else { panic!("expected block") };
    assert_eq!(block.stmts.len(), 2);
    let StmtKind::Switch { cases, .. } = &block.stmts[0].kind else { panic!("expected switch") };
    assert_eq!(cases.len(), 1);
    assert!(matches!(block.stmts[1].kind, StmtKind::Expr(_)));
}

#[test]
fn case_outside_a_switch_is_skipped_during_recovery() {
    let out = parse("fn void f() { x = ) case 1: y(); z(); }");
    assert_eq!(out.errors.len(), 1, "{:?}", out.errors);
    let Some(DeclKind::Func(f)) = out.unit.decls.first().map(|d| &d.kind) else { panic!("expected fn") };
    let Some(FuncBody::Block(block)) = &f.body else { panic!("expected block") };
    assert_eq!(block.stmts.len(), 1);
}

#[test]
fn many_errors_do_not_hang() {
    let src = "fn void f() { ".to_string() + &") ] , ".repeat(500) + "}";
    let out = parse(&src);
    assert!(!out.errors.is_empty());
    assert!(out.errors.len() <= 100);
}

#[test]
fn unclosed_block_at_end_of_file() {
    let out = parse("fn void f() { return;");
    assert_eq!(out.unit.decls.len(), 1);
    assert!(matches!(out.errors[0].kind, ParseErrorKind::MissingExpectedToken { .. }));
}

#[test]
fn integer_literals_decode() {
    let v = local("int x = 0x1A");
    let Some(ExprKind::Literal(lit)) = v.init.map(|e| e.kind) else { panic!("expected literal") };
    assert!(matches!(lit.kind, LiteralKind::Int(ref i) if i.value == 26));

    let v = local("int y = 1_000");
    let Some(ExprKind::Literal(lit)) = v.init.map(|e| e.kind) else { panic!("expected literal") };
    assert!(matches!(lit.kind, LiteralKind::Int(ref i) if i.value == 1000));
}

#[test]
fn float_and_char_literals_decode() {
    let v = local("float f = 1.5e2f32");
    let Some(ExprKind::Literal(lit)) = v.init.map(|e| e.kind) else { panic!("expected literal") };
    let LiteralKind::Float(f) = lit.kind else { panic!("expected float") };
    assert_eq!(f.value, 150.0);
    assert_eq!(f.suffix, Some(FloatSuffix::F32));

    let v = local("char c = '\\x41'");
    let Some(ExprKind::Literal(lit)) = v.init.map(|e| e.kind) else { panic!("expected literal") };
    assert!(matches!(lit.kind, LiteralKind::Char('A')));
}

#[test]
fn optional_type_wraps_primitive() {
    let v = local("int! result = foo()");
    let ty = v.ty.expect("typed");
    let TypeKind::Optional(inner) = ty.kind else { panic!("expected optional") };
    assert!(matches!(inner.kind, TypeKind::Primitive(PrimitiveType::Int)));
}

#[test]
fn switch_cases_never_fall_through() {
    let stmts = body("fn void f() { switch (x) { case 1: case 2: a(); b(); case 3: c(); } }");
    let Some(StmtKind::Switch { cases, .. }) = stmts.into_iter().next() else { panic!("expected switch") };
    let owned: Vec<usize> = cases.iter().map(|c| c.body.len()).collect();
    assert_eq!(owned, vec![0, 2, 1]);
}

#[test]
fn pointer_declaration_versus_multiplication() {
    assert!(matches!(body("fn void f() { Foo* p; }")[0], StmtKind::Var(_)));
    assert!(matches!(body("fn void f() { a * b; }")[0], StmtKind::Expr(_)));
}

#[test]
fn doc_comments_attach_to_declarations() {
    let out = parse("<*\n Frobs.\n @param x \"input\"\n*>\nfn void frob(int x) {}\n");
    let doc = out.unit.decls[0].doc.as_ref().expect("doc attached");
    assert_eq!(doc.body, "Frobs.");
    assert_eq!(doc.contracts[0].name, "param");
}

#[test]
fn operator_overload_attributes() {
    let out = parse(
        "fn int Vec.get(&self, usz i) @operator([]) => self.data[i];\n\
         fn void Vec.set(&self, usz i, int v) @operator([]=) { self.data[i] = v; }\n\
         fn int* Vec.at(&self, usz i) @operator(&[]) => &self.data[i];\n",
    );
    assert!(out.is_ok(), "{:?}", out.errors);
    let ops: Vec<OverloadOp> = out
        .unit
        .decls
        .iter()
        .map(|d| {
            let DeclKind::Func(f) = &d.kind else { panic!("expected fn") };
            let Some(args) = &f.signature.attrs[0].args else { panic!("expected attribute args") };
            let AttrArg::Operator(op) = args[0] else { panic!("expected operator arg") };
            op
        })
        .collect();
    assert_eq!(ops, vec![OverloadOp::Index, OverloadOp::IndexAssign, OverloadOp::IndexRef]);
}

#[test]
fn vasplat_arguments() {
    let ExprKind::Call { args, .. } = expr("foo($vasplat)").kind else { panic!("expected call") };
    assert!(matches!(args[0], Arg::VaSplat(None)));

    let ExprKind::Call { args, .. } = expr("foo(1, $vasplat(1..))").kind else { panic!("expected call") };
    assert!(matches!(args[1], Arg::VaSplat(Some(_))));
}

#[test]
fn compile_time_predicates() {
    let e = expr("$and($defined(x), $assignable(x, int))");
    let ExprKind::CtCall { func: CtKeyword::And, args: Some(args) } = e.kind else { panic!("expected $and") };
    assert_eq!(args.len(), 2);
    let Arg::Expr(inner) = &args[1] else { panic!("expected expression argument") };
    assert!(matches!(inner.kind, ExprKind::CtCall { func: CtKeyword::Assignable, .. }));
}

#[test]
fn reverse_foreach_and_nextcase_forms() {
    let stmts = body("fn void f() { foreach_r (i, x : list) {} }");
    assert!(matches!(stmts[0], StmtKind::Foreach { reverse: true, index: Some(_), .. }));

    let stmts = body(
        "fn void f() { switch SW: (x) { case 1: nextcase; case 2: nextcase SW: 3; case 3: nextcase default; default: break; } }",
    );
    let Some(StmtKind::Switch { cases, .. }) = stmts.into_iter().next() else { panic!("expected switch") };
    let targets: Vec<_> = cases
        .iter()
        .filter_map(|c| match c.body.first().map(|s| &s.kind) {
            Some(StmtKind::Nextcase { label, target }) => Some((label.clone(), target.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(targets.len(), 3);
    assert!(targets[0].1.is_none());
    assert_eq!(targets[1].0.as_deref(), Some("SW"));
    assert!(matches!(targets[1].1, Some(NextcaseTarget::Expr(_))));
    assert!(matches!(targets[2].1, Some(NextcaseTarget::Default)));
}
