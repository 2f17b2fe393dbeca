//! Whole-program semantic analysis.
//!
//! Two sequential passes over every parsed class. The skeleton pass
//! registers all classes, their variables, and their subroutine scopes, so
//! the validation pass can resolve calls regardless of declaration order.
//! The validation pass then walks every statement and expression and
//! checks each reference. The first violation aborts the whole project;
//! code generation never sees an unvalidated AST.

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::symbol_table::{ProjectSymbolTable, SubroutineEntry, VarKind, VarSymbol};
use crate::token::Span;

/// Standard library classes that are linked in as precompiled VM code, so
/// static calls to them resolve even though no source is in the project.
static BUILTIN_CLASSES: phf::Set<&'static str> = phf::phf_set! {
    "Math", "String", "Array", "Output", "Screen", "Keyboard", "Memory", "Sys",
};

/// Run both passes and return the populated symbol table.
pub fn analyze(classes: &[Class]) -> Result<ProjectSymbolTable> {
    let table = build_skeleton(classes)?;
    for class in classes {
        for sub in &class.subroutines {
            Checker {
                table: &table,
                class,
                sub,
            }
            .check_statements(&sub.body.statements)?;
        }
    }
    Ok(table)
}

/// Skeleton pass: symbol tables only, no statement or expression bodies.
fn build_skeleton(classes: &[Class]) -> Result<ProjectSymbolTable> {
    let mut table = ProjectSymbolTable::new();
    for class in classes {
        table.add_class(&class.name, &class.span)?;
    }
    for class in classes {
        let entry = table
            .class_mut(&class.name)
            .expect("class registered above");

        for dec in &class.var_decs {
            let kind = match dec.kind {
                ClassVarKind::Static => VarKind::Static,
                ClassVarKind::Field => VarKind::Field,
            };
            for name in &dec.names {
                entry.define(name, dec.var_type.clone(), kind, &dec.span)?;
            }
        }

        for sub in &class.subroutines {
            let mut scope = SubroutineEntry::new(sub.kind, sub.return_type.clone());
            if sub.kind == SubroutineKind::Method {
                scope.define(
                    "this",
                    Type::ClassName(class.name.clone()),
                    VarKind::Argument,
                    &sub.span,
                )?;
            }
            for param in &sub.parameters {
                scope.define(&param.name, param.var_type.clone(), VarKind::Argument, &sub.span)?;
            }
            for dec in &sub.body.var_decs {
                for name in &dec.names {
                    scope.define(name, dec.var_type.clone(), VarKind::Local, &dec.span)?;
                }
            }
            entry.add_subroutine(&sub.name, scope, &sub.span)?;
        }
    }
    Ok(table)
}

/// Validation context for one subroutine body.
struct Checker<'a> {
    table: &'a ProjectSymbolTable,
    class: &'a Class,
    sub: &'a SubroutineDec,
}

impl Checker<'_> {
    fn check_statements(&self, statements: &[Statement]) -> Result<()> {
        for statement in statements {
            match statement {
                Statement::Let(s) => {
                    self.check_var(&s.var_name, &s.span)?;
                    if let Some(index) = &s.index {
                        self.check_expression(index)?;
                    }
                    self.check_expression(&s.value)?;
                }
                Statement::If(s) => {
                    self.check_expression(&s.condition)?;
                    self.check_statements(&s.then_statements)?;
                    if let Some(else_statements) = &s.else_statements {
                        self.check_statements(else_statements)?;
                    }
                }
                Statement::While(s) => {
                    self.check_expression(&s.condition)?;
                    self.check_statements(&s.statements)?;
                }
                Statement::Do(s) => self.check_call(&s.call)?,
                Statement::Return(s) => {
                    if let Some(value) = &s.value {
                        self.check_expression(value)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_expression(&self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::IntegerLiteral(..) | Expression::StringLiteral(..) => Ok(()),
            Expression::KeywordLiteral(literal, span) => {
                if *literal == KeywordLiteral::This && self.sub.kind == SubroutineKind::Function {
                    return Err(CompileError::ThisInFunction { span: span.clone() });
                }
                Ok(())
            }
            Expression::Variable { name, index, span } => {
                self.check_var(name, span)?;
                if let Some(index) = index {
                    self.check_expression(index)?;
                }
                Ok(())
            }
            Expression::Unary { operand, .. } => self.check_expression(operand),
            Expression::Binary { left, right, .. } => {
                self.check_expression(left)?;
                self.check_expression(right)
            }
            Expression::Call(call) => self.check_call(call),
        }
    }

    /// Resolve a variable reference, rejecting field access from a
    /// function-kind subroutine (no instance context) and anything that is
    /// not declared in subroutine-then-class scope.
    fn check_var(&self, name: &str, span: &Span) -> Result<&VarSymbol> {
        let symbol = self
            .table
            .lookup(&self.class.name, &self.sub.name, name)
            .ok_or_else(|| CompileError::UndeclaredVariable {
                name: name.to_string(),
                span: span.clone(),
            })?;
        if symbol.kind == VarKind::Field && self.sub.kind == SubroutineKind::Function {
            return Err(CompileError::FieldInFunction {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        Ok(symbol)
    }

    /// A call target must be a declared variable (instance dispatch), a
    /// known class name (static dispatch), or absent (dispatch on `this`).
    /// Calling a method through a class name alone is rejected; calling a
    /// non-method through an instance deliberately is not.
    fn check_call(&self, call: &SubroutineCall) -> Result<()> {
        match &call.receiver {
            None => {
                // Bare call: implicit `this` receiver.
                if self.sub.kind == SubroutineKind::Function {
                    return Err(CompileError::MethodWithoutReceiver {
                        name: call.name.clone(),
                        span: call.span.clone(),
                    });
                }
            }
            Some(receiver) => {
                let var = self.table.lookup(&self.class.name, &self.sub.name, receiver);
                match var {
                    Some(symbol) => {
                        // Instance dispatch; the receiver itself is an
                        // ordinary variable reference.
                        if symbol.kind == VarKind::Field
                            && self.sub.kind == SubroutineKind::Function
                        {
                            return Err(CompileError::FieldInFunction {
                                name: receiver.clone(),
                                span: call.span.clone(),
                            });
                        }
                    }
                    None if self.table.class(receiver).is_some() => {
                        let target = self
                            .table
                            .class(receiver)
                            .and_then(|c| c.subroutine(&call.name));
                        if let Some(entry) = target
                            && entry.kind == SubroutineKind::Method
                        {
                            return Err(CompileError::MethodWithoutReceiver {
                                name: call.name.clone(),
                                span: call.span.clone(),
                            });
                        }
                    }
                    None if BUILTIN_CLASSES.contains(receiver.as_str()) => {}
                    None => {
                        return Err(CompileError::UnknownCallTarget {
                            name: receiver.clone(),
                            span: call.span.clone(),
                        });
                    }
                }
            }
        }
        for argument in &call.arguments {
            self.check_expression(argument)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn analyze_sources(sources: &[&str]) -> Result<ProjectSymbolTable> {
        let classes: Vec<Class> = sources
            .iter()
            .map(|s| Parser::new(s).parse().unwrap())
            .collect();
        analyze(&classes)
    }

    #[test]
    fn test_valid_class_builds_table() {
        let table = analyze_sources(&[
            "class Point { field int x, y; static int count; \
             method int getX() { return x; } }",
        ])
        .unwrap();
        let class = table.class("Point").unwrap();
        assert_eq!(class.field_count(), 2);
        assert_eq!(class.static_count(), 1);
        let sub = class.subroutine("getX").unwrap();
        assert_eq!(sub.get("this").unwrap().index, 0);
    }

    #[test]
    fn test_this_in_function_rejected() {
        let err = analyze_sources(&["class M { function M f() { return this; } }"]).unwrap_err();
        assert!(matches!(err, CompileError::ThisInFunction { .. }));
    }

    #[test]
    fn test_this_in_constructor_and_method_allowed() {
        analyze_sources(&[
            "class M { constructor M new() { return this; } \
             method M me() { return this; } }",
        ])
        .unwrap();
    }

    #[test]
    fn test_field_in_function_rejected() {
        let err = analyze_sources(&[
            "class M { field int x; function int f() { return x; } }",
        ])
        .unwrap_err();
        assert!(matches!(err, CompileError::FieldInFunction { .. }));
    }

    #[test]
    fn test_static_in_function_allowed() {
        analyze_sources(&["class M { static int x; function int f() { return x; } }"]).unwrap();
    }

    #[test]
    fn test_undeclared_variable_rejected() {
        let err = analyze_sources(&[
            "class M { method void f() { let missing = 1; return; } }",
        ])
        .unwrap_err();
        match err {
            CompileError::UndeclaredVariable { name, .. } => assert_eq!(name, "missing"),
            other => panic!("expected undeclared variable, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_call_target_rejected() {
        let err = analyze_sources(&[
            "class M { function void f() { do nowhere.go(); return; } }",
        ])
        .unwrap_err();
        match err {
            CompileError::UnknownCallTarget { name, .. } => assert_eq!(name, "nowhere"),
            other => panic!("expected unknown call target, got {other:?}"),
        }
    }

    #[test]
    fn test_method_through_class_name_rejected() {
        let err = analyze_sources(&[
            "class M { function void f() { do Point.getX(); return; } }",
            "class Point { field int x; method int getX() { return x; } }",
        ])
        .unwrap_err();
        assert!(matches!(err, CompileError::MethodWithoutReceiver { .. }));
    }

    #[test]
    fn test_function_through_class_name_allowed() {
        analyze_sources(&[
            "class M { function void f() { do Util.reset(); return; } }",
            "class Util { function void reset() { return; } }",
        ])
        .unwrap();
    }

    #[test]
    fn test_function_through_instance_stays_permissive() {
        // Dispatching a non-method through an instance is deliberately
        // accepted; only the reverse is an error.
        analyze_sources(&[
            "class M { method void f(Util u) { do u.reset(); return; } }",
            "class Util { function void reset() { return; } }",
        ])
        .unwrap();
    }

    #[test]
    fn test_method_through_instance_across_classes() {
        analyze_sources(&[
            "class M { method int f(Point p) { return p.getX(); } }",
            "class Point { field int x; method int getX() { return x; } }",
        ])
        .unwrap();
    }

    #[test]
    fn test_bare_call_in_function_rejected() {
        let err = analyze_sources(&[
            "class M { function void f() { do helper(); return; } \
             method void helper() { return; } }",
        ])
        .unwrap_err();
        assert!(matches!(err, CompileError::MethodWithoutReceiver { .. }));
    }

    #[test]
    fn test_builtin_classes_resolve() {
        analyze_sources(&[
            "class M { function void f() { do Output.printInt(Math.abs(1)); return; } }",
        ])
        .unwrap();
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        // M calls into Point, declared after it in the project.
        analyze_sources(&[
            "class M { function void f() { do Point.reset(); return; } }",
            "class Point { function void reset() { return; } }",
        ])
        .unwrap();
    }

    #[test]
    fn test_local_shadows_field() {
        let table = analyze_sources(&[
            "class M { field int x; method int f() { var boolean x; let x = true; return 0; } }",
        ])
        .unwrap();
        let found = table.lookup("M", "f", "x").unwrap();
        assert_eq!(found.kind, VarKind::Local);
    }

    #[test]
    fn test_duplicate_local_rejected() {
        let err = analyze_sources(&[
            "class M { method void f() { var int x; var boolean x; return; } }",
        ])
        .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_duplicate_class_across_files_rejected() {
        let err = analyze_sources(&["class M { }", "class M { }"]).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateClass { .. }));
    }
}
