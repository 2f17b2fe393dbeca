//! VM code generator.
//!
//! One emission pass per class over the validated symbol tables. The
//! generator trusts the semantic analyzer completely: every lookup it
//! performs was already checked, so a miss here is a programming-invariant
//! violation, not a user error.

use crate::ast::*;
use crate::symbol_table::{ClassEntry, ProjectSymbolTable, VarSymbol};
use crate::vm_writer::VmWriter;

pub struct CodeGenerator<'a> {
    table: &'a ProjectSymbolTable,
    class: &'a Class,
    current_sub: &'a str,
    vm: VmWriter,
    label_counter: u32,
}

/// Lower one validated class to VM code.
pub fn generate(class: &Class, table: &ProjectSymbolTable) -> String {
    let mut generator = CodeGenerator {
        table,
        class,
        current_sub: "",
        vm: VmWriter::new(),
        label_counter: 0,
    };
    for sub in &class.subroutines {
        generator.compile_subroutine(sub);
    }
    generator.vm.into_output()
}

impl<'a> CodeGenerator<'a> {
    fn class_entry(&self) -> &ClassEntry {
        self.table
            .class(&self.class.name)
            .expect("class registered during semantic analysis")
    }

    fn resolve(&self, name: &str) -> &VarSymbol {
        self.table
            .lookup(&self.class.name, self.current_sub, name)
            .expect("variable reference validated by semantic analysis")
    }

    fn resolve_optional(&self, name: &str) -> Option<&VarSymbol> {
        self.table.lookup(&self.class.name, self.current_sub, name)
    }

    /// One fresh label id per branching statement; the labels of one
    /// statement share it, distinct statements never do.
    fn next_label_id(&mut self) -> u32 {
        let id = self.label_counter;
        self.label_counter += 1;
        id
    }

    fn compile_subroutine(&mut self, sub: &'a SubroutineDec) {
        self.current_sub = &sub.name;

        let locals = self
            .class_entry()
            .subroutine(&sub.name)
            .expect("subroutine registered during semantic analysis")
            .local_count();
        self.vm.function(&sub.qualified_name, locals);

        match sub.kind {
            SubroutineKind::Constructor => {
                // Allocate the object and bind `this` to it.
                let fields = self.class_entry().field_count();
                self.vm.push("constant", fields);
                self.vm.call("Memory.alloc", 1);
                self.vm.pop("pointer", 0);
            }
            SubroutineKind::Method => {
                // `this` arrives as argument 0.
                self.vm.push("argument", 0);
                self.vm.pop("pointer", 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(&sub.body.statements);
    }

    fn compile_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Let(s) => self.compile_let(s),
                Statement::If(s) => self.compile_if(s),
                Statement::While(s) => self.compile_while(s),
                Statement::Do(s) => self.compile_do(s),
                Statement::Return(s) => self.compile_return(s),
            }
        }
    }

    fn compile_let(&mut self, stmt: &LetStatement) {
        let symbol = self.resolve(&stmt.var_name).clone();
        match &stmt.index {
            Some(index) => {
                // let x[i] = e: the value is fully evaluated before the
                // computed address is committed to the that-pointer, so e
                // may itself index x or other arrays.
                self.vm.push(symbol.segment(), symbol.index);
                self.compile_expression(index);
                self.vm.arithmetic("add");
                self.compile_expression(&stmt.value);
                self.vm.pop("temp", 0);
                self.vm.pop("pointer", 1);
                self.vm.push("temp", 0);
                self.vm.pop("that", 0);
            }
            None => {
                self.compile_expression(&stmt.value);
                self.vm.pop(symbol.segment(), symbol.index);
            }
        }
    }

    fn compile_if(&mut self, stmt: &IfStatement) {
        let id = self.next_label_id();
        self.compile_expression(&stmt.condition);
        self.vm.if_goto(&format!("IF_TRUE_{id}"));
        self.vm.goto(&format!("IF_FALSE_{id}"));
        self.vm.label(&format!("IF_TRUE_{id}"));
        self.compile_statements(&stmt.then_statements);
        match &stmt.else_statements {
            Some(else_statements) => {
                self.vm.goto(&format!("IF_END_{id}"));
                self.vm.label(&format!("IF_FALSE_{id}"));
                self.compile_statements(else_statements);
                self.vm.label(&format!("IF_END_{id}"));
            }
            None => {
                self.vm.label(&format!("IF_FALSE_{id}"));
            }
        }
    }

    fn compile_while(&mut self, stmt: &WhileStatement) {
        let id = self.next_label_id();
        self.vm.label(&format!("WHILE_EXP_{id}"));
        self.compile_expression(&stmt.condition);
        self.vm.arithmetic("not");
        self.vm.if_goto(&format!("WHILE_END_{id}"));
        self.compile_statements(&stmt.statements);
        self.vm.goto(&format!("WHILE_EXP_{id}"));
        self.vm.label(&format!("WHILE_END_{id}"));
    }

    fn compile_do(&mut self, stmt: &DoStatement) {
        self.compile_call(&stmt.call);
        // The result is discarded.
        self.vm.pop("temp", 0);
    }

    fn compile_return(&mut self, stmt: &ReturnStatement) {
        match &stmt.value {
            Some(value) => self.compile_expression(value),
            // Every subroutine leaves exactly one value for the caller.
            None => self.vm.push("constant", 0),
        }
        self.vm.ret();
    }

    fn compile_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::IntegerLiteral(value, _) => {
                self.vm.push("constant", *value);
            }
            Expression::StringLiteral(s, _) => {
                self.vm.push("constant", s.len() as u16);
                self.vm.call("String.new", 1);
                for c in s.chars() {
                    self.vm.push("constant", c as u16);
                    self.vm.call("String.appendChar", 2);
                }
            }
            Expression::KeywordLiteral(literal, _) => match literal {
                KeywordLiteral::True => {
                    self.vm.push("constant", 0);
                    self.vm.arithmetic("not");
                }
                KeywordLiteral::False | KeywordLiteral::Null => {
                    self.vm.push("constant", 0);
                }
                KeywordLiteral::This => {
                    self.vm.push("pointer", 0);
                }
            },
            Expression::Variable { name, index, .. } => {
                let symbol = self.resolve(name).clone();
                self.vm.push(symbol.segment(), symbol.index);
                if let Some(index) = index {
                    self.compile_expression(index);
                    self.vm.arithmetic("add");
                    self.vm.pop("pointer", 1);
                    self.vm.push("that", 0);
                }
            }
            Expression::Unary { op, operand, .. } => {
                self.compile_expression(operand);
                match op {
                    UnaryOp::Neg => self.vm.arithmetic("neg"),
                    UnaryOp::Not => self.vm.arithmetic("not"),
                }
            }
            Expression::Binary {
                left, op, right, ..
            } => {
                self.compile_expression(left);
                self.compile_expression(right);
                match op {
                    BinaryOp::Add => self.vm.arithmetic("add"),
                    BinaryOp::Sub => self.vm.arithmetic("sub"),
                    BinaryOp::And => self.vm.arithmetic("and"),
                    BinaryOp::Or => self.vm.arithmetic("or"),
                    BinaryOp::Lt => self.vm.arithmetic("lt"),
                    BinaryOp::Gt => self.vm.arithmetic("gt"),
                    BinaryOp::Eq => self.vm.arithmetic("eq"),
                    BinaryOp::Mul => self.vm.call("Math.multiply", 2),
                    BinaryOp::Div => self.vm.call("Math.divide", 2),
                }
            }
            Expression::Call(call) => self.compile_call(call),
        }
    }

    /// The argument count includes the implicit receiver whenever the call
    /// dispatches on an instance, including `this`.
    fn compile_call(&mut self, call: &SubroutineCall) {
        let (target_class, args) = match &call.receiver {
            None => {
                self.vm.push("pointer", 0);
                (self.class.name.clone(), call.arguments.len() as u16 + 1)
            }
            Some(receiver) => match self.resolve_optional(receiver) {
                Some(symbol) => {
                    let symbol = symbol.clone();
                    self.vm.push(symbol.segment(), symbol.index);
                    let class = match &symbol.var_type {
                        Type::ClassName(name) => name.clone(),
                        _ => receiver.clone(),
                    };
                    (class, call.arguments.len() as u16 + 1)
                }
                None => (receiver.clone(), call.arguments.len() as u16),
            },
        };

        for argument in &call.arguments {
            self.compile_expression(argument);
        }
        self.vm.call(&format!("{target_class}.{}", call.name), args);
    }
}
