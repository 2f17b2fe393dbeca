//! Recursive descent parser for the Jack language.
//!
//! One method per grammar production, predictive via one-token lookahead.
//! Jack has a single operator precedence class: `a + b * c` folds left
//! into `(a + b) * c`. Unary `-`/`~` bind to the immediately following
//! term only. The first syntax error aborts the translation unit.

use crate::ast::*;
use crate::error::{CompileError, Result};
use crate::token::{Keyword, SpannedToken, Token};
use crate::validator::TokenValidator;

/// Maximum expression nesting depth before the parser bails out, keeping
/// pathological input like `(((((...)))))` from overflowing the stack.
const MAX_DEPTH: usize = 25;

pub struct Parser<'a> {
    tokens: TokenValidator<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            tokens: TokenValidator::new(source),
            depth: 0,
        }
    }

    /// Parse one source file into its class, stamping every subroutine
    /// with its `Class.name` qualified name.
    pub fn parse(mut self) -> Result<Class> {
        let mut class = self.parse_class()?;
        if !self.tokens.at_end()? {
            let span = self.tokens.current_span()?;
            return Err(CompileError::syntax(
                "expected end of file after class body",
                span,
            ));
        }
        for sub in &mut class.subroutines {
            sub.qualified_name = format!("{}.{}", class.name, sub.name);
        }
        Ok(class)
    }

    /// class: 'class' className '{' classVarDec* subroutineDec* '}'
    fn parse_class(&mut self) -> Result<Class> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::Class)?;
        let (name, _) = self.tokens.expect_identifier()?;
        self.tokens.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while matches!(
            self.tokens.peek_keyword()?,
            Some(Keyword::Static | Keyword::Field)
        ) {
            var_decs.push(self.parse_class_var_dec()?);
        }

        let mut subroutines = Vec::new();
        while matches!(
            self.tokens.peek_keyword()?,
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            subroutines.push(self.parse_subroutine_dec()?);
        }

        self.tokens.expect_symbol('}')?;

        Ok(Class {
            name,
            var_decs,
            subroutines,
            span,
        })
    }

    /// classVarDec: ('static' | 'field') type varName (',' varName)* ';'
    fn parse_class_var_dec(&mut self) -> Result<ClassVarDec> {
        let span = self.tokens.current_span()?;
        let (keyword, _) = self
            .tokens
            .expect_keyword_of(&[Keyword::Static, Keyword::Field])?;
        let kind = match keyword {
            Keyword::Static => ClassVarKind::Static,
            _ => ClassVarKind::Field,
        };
        let var_type = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.tokens.expect_symbol(';')?;
        Ok(ClassVarDec {
            kind,
            var_type,
            names,
            span,
        })
    }

    /// type: 'int' | 'char' | 'boolean' | className
    fn parse_type(&mut self) -> Result<Type> {
        match self.tokens.peek_token()? {
            Some(Token::Keyword(Keyword::Int)) => {
                self.tokens.advance()?;
                Ok(Type::Int)
            }
            Some(Token::Keyword(Keyword::Char)) => {
                self.tokens.advance()?;
                Ok(Type::Char)
            }
            Some(Token::Keyword(Keyword::Boolean)) => {
                self.tokens.advance()?;
                Ok(Type::Boolean)
            }
            Some(Token::Identifier(_)) => {
                let (name, _) = self.tokens.expect_identifier()?;
                Ok(Type::ClassName(name))
            }
            _ => {
                let span = self.tokens.current_span()?;
                Err(CompileError::syntax(
                    "expected type (int, char, boolean, or class name)",
                    span,
                ))
            }
        }
    }

    /// One identifier, then any number of `, identifier`.
    fn parse_name_list(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let (first, _) = self.tokens.expect_identifier()?;
        names.push(first);
        while self.tokens.peek_symbol()? == Some(',') {
            self.tokens.advance()?;
            let (name, _) = self.tokens.expect_identifier()?;
            names.push(name);
        }
        Ok(names)
    }

    /// subroutineDec: ('constructor'|'function'|'method') ('void'|type)
    ///                subroutineName '(' parameterList ')' subroutineBody
    fn parse_subroutine_dec(&mut self) -> Result<SubroutineDec> {
        let span = self.tokens.current_span()?;
        let (keyword, _) = self.tokens.expect_keyword_of(&[
            Keyword::Constructor,
            Keyword::Function,
            Keyword::Method,
        ])?;
        let kind = match keyword {
            Keyword::Constructor => SubroutineKind::Constructor,
            Keyword::Function => SubroutineKind::Function,
            _ => SubroutineKind::Method,
        };

        let return_type = if self.tokens.peek_keyword()? == Some(Keyword::Void) {
            self.tokens.advance()?;
            ReturnType::Void
        } else {
            ReturnType::Type(self.parse_type()?)
        };

        let (name, _) = self.tokens.expect_identifier()?;
        self.tokens.expect_symbol('(')?;
        let parameters = self.parse_parameter_list()?;
        self.tokens.expect_symbol(')')?;
        let body = self.parse_subroutine_body()?;

        Ok(SubroutineDec {
            kind,
            return_type,
            name,
            qualified_name: String::new(),
            parameters,
            body,
            span,
        })
    }

    /// parameterList: ((type varName) (',' type varName)*)?
    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>> {
        let mut params = Vec::new();
        if self.tokens.peek_symbol()? == Some(')') {
            return Ok(params);
        }
        loop {
            let var_type = self.parse_type()?;
            let (name, _) = self.tokens.expect_identifier()?;
            params.push(Parameter { var_type, name });
            if self.tokens.peek_symbol()? != Some(',') {
                break;
            }
            self.tokens.advance()?;
        }
        Ok(params)
    }

    /// subroutineBody: '{' varDec* statements '}'
    fn parse_subroutine_body(&mut self) -> Result<SubroutineBody> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_symbol('{')?;

        let mut var_decs = Vec::new();
        while self.tokens.peek_keyword()? == Some(Keyword::Var) {
            var_decs.push(self.parse_var_dec()?);
        }

        let statements = self.parse_statements()?;
        self.tokens.expect_symbol('}')?;

        Ok(SubroutineBody {
            var_decs,
            statements,
            span,
        })
    }

    /// varDec: 'var' type varName (',' varName)* ';'
    fn parse_var_dec(&mut self) -> Result<VarDec> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::Var)?;
        let var_type = self.parse_type()?;
        let names = self.parse_name_list()?;
        self.tokens.expect_symbol(';')?;
        Ok(VarDec {
            var_type,
            names,
            span,
        })
    }

    /// statements: statement*
    fn parse_statements(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            let statement = match self.tokens.peek_keyword()? {
                Some(Keyword::Let) => Statement::Let(self.parse_let_statement()?),
                Some(Keyword::If) => Statement::If(self.parse_if_statement()?),
                Some(Keyword::While) => Statement::While(self.parse_while_statement()?),
                Some(Keyword::Do) => Statement::Do(self.parse_do_statement()?),
                Some(Keyword::Return) => Statement::Return(self.parse_return_statement()?),
                _ => break,
            };
            statements.push(statement);
        }
        Ok(statements)
    }

    /// letStatement: 'let' varName ('[' expression ']')? '=' expression ';'
    fn parse_let_statement(&mut self) -> Result<LetStatement> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::Let)?;
        let (var_name, _) = self.tokens.expect_identifier()?;

        let index = if self.tokens.peek_symbol()? == Some('[') {
            self.tokens.advance()?;
            let expr = self.parse_expression()?;
            self.tokens.expect_symbol(']')?;
            Some(expr)
        } else {
            None
        };

        self.tokens.expect_symbol('=')?;
        let value = self.parse_expression()?;
        self.tokens.expect_symbol(';')?;

        Ok(LetStatement {
            var_name,
            index,
            value,
            span,
        })
    }

    /// ifStatement: 'if' '(' expression ')' '{' statements '}'
    ///              ('else' '{' statements '}')?
    fn parse_if_statement(&mut self) -> Result<IfStatement> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::If)?;
        self.tokens.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.tokens.expect_symbol(')')?;
        self.tokens.expect_symbol('{')?;
        let then_statements = self.parse_statements()?;
        self.tokens.expect_symbol('}')?;

        let else_statements = if self.tokens.peek_keyword()? == Some(Keyword::Else) {
            self.tokens.advance()?;
            self.tokens.expect_symbol('{')?;
            let statements = self.parse_statements()?;
            self.tokens.expect_symbol('}')?;
            Some(statements)
        } else {
            None
        };

        Ok(IfStatement {
            condition,
            then_statements,
            else_statements,
            span,
        })
    }

    /// whileStatement: 'while' '(' expression ')' '{' statements '}'
    fn parse_while_statement(&mut self) -> Result<WhileStatement> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::While)?;
        self.tokens.expect_symbol('(')?;
        let condition = self.parse_expression()?;
        self.tokens.expect_symbol(')')?;
        self.tokens.expect_symbol('{')?;
        let statements = self.parse_statements()?;
        self.tokens.expect_symbol('}')?;

        Ok(WhileStatement {
            condition,
            statements,
            span,
        })
    }

    /// doStatement: 'do' subroutineCall ';'
    fn parse_do_statement(&mut self) -> Result<DoStatement> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::Do)?;
        let call = self.parse_subroutine_call()?;
        self.tokens.expect_symbol(';')?;
        Ok(DoStatement { call, span })
    }

    /// returnStatement: 'return' expression? ';'
    fn parse_return_statement(&mut self) -> Result<ReturnStatement> {
        let span = self.tokens.current_span()?;
        self.tokens.expect_keyword(Keyword::Return)?;
        let value = if self.tokens.peek_symbol()? == Some(';') {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.tokens.expect_symbol(';')?;
        Ok(ReturnStatement { value, span })
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let span = self.tokens.current_span()?;
            self.depth -= 1;
            return Err(CompileError::syntax("expression nesting too deep", span));
        }
        Ok(())
    }

    /// expression: term (op term)*, folded left-associatively.
    fn parse_expression(&mut self) -> Result<Expression> {
        self.enter()?;
        let result = self.parse_expression_inner();
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self) -> Result<Expression> {
        let mut expr = self.parse_term()?;
        while let Some(c) = self.tokens.peek_symbol()? {
            let Some(op) = BinaryOp::from_char(c) else {
                break;
            };
            self.tokens.advance()?;
            let right = self.parse_term()?;
            let span = expr.span().clone();
            expr = Expression::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    /// term: integerConstant | stringConstant | keywordConstant | varName |
    ///       varName '[' expression ']' | subroutineCall |
    ///       '(' expression ')' | unaryOp term
    fn parse_term(&mut self) -> Result<Expression> {
        self.enter()?;
        let result = self.parse_term_inner();
        self.depth -= 1;
        result
    }

    fn parse_term_inner(&mut self) -> Result<Expression> {
        let span = self.tokens.current_span()?;
        match self.tokens.peek_token()? {
            Some(Token::IntegerConstant(_)) => {
                let Some(SpannedToken {
                    token: Token::IntegerConstant(n),
                    span,
                }) = self.tokens.advance()?
                else {
                    unreachable!("peeked token changed between peek and advance");
                };
                Ok(Expression::IntegerLiteral(n, span))
            }
            Some(Token::StringConstant(_)) => {
                let Some(SpannedToken {
                    token: Token::StringConstant(s),
                    span,
                }) = self.tokens.advance()?
                else {
                    unreachable!("peeked token changed between peek and advance");
                };
                Ok(Expression::StringLiteral(s, span))
            }
            Some(Token::Keyword(k)) => match KeywordLiteral::from_keyword(*k) {
                Some(literal) => {
                    self.tokens.advance()?;
                    Ok(Expression::KeywordLiteral(literal, span))
                }
                None => Err(CompileError::syntax(
                    format!("unexpected keyword '{}' in expression", k.as_str()),
                    span,
                )),
            },
            Some(Token::Symbol('(')) => {
                self.tokens.advance()?;
                let expr = self.parse_expression()?;
                self.tokens.expect_symbol(')')?;
                Ok(expr)
            }
            Some(Token::Symbol(c)) if *c == '-' || *c == '~' => {
                let op = UnaryOp::from_char(*c).unwrap();
                self.tokens.advance()?;
                let operand = self.parse_term()?;
                Ok(Expression::Unary {
                    op,
                    operand: Box::new(operand),
                    span,
                })
            }
            Some(Token::Identifier(_)) => {
                let (name, span) = self.tokens.expect_identifier()?;
                match self.tokens.peek_symbol()? {
                    Some('[') => {
                        self.tokens.advance()?;
                        let index = self.parse_expression()?;
                        self.tokens.expect_symbol(']')?;
                        Ok(Expression::Variable {
                            name,
                            index: Some(Box::new(index)),
                            span,
                        })
                    }
                    Some('(') => {
                        self.tokens.advance()?;
                        let arguments = self.parse_expression_list()?;
                        self.tokens.expect_symbol(')')?;
                        Ok(Expression::Call(SubroutineCall {
                            receiver: None,
                            name,
                            arguments,
                            span,
                        }))
                    }
                    Some('.') => {
                        self.tokens.advance()?;
                        let (method_name, _) = self.tokens.expect_identifier()?;
                        self.tokens.expect_symbol('(')?;
                        let arguments = self.parse_expression_list()?;
                        self.tokens.expect_symbol(')')?;
                        Ok(Expression::Call(SubroutineCall {
                            receiver: Some(name),
                            name: method_name,
                            arguments,
                            span,
                        }))
                    }
                    _ => Ok(Expression::Variable {
                        name,
                        index: None,
                        span,
                    }),
                }
            }
            Some(other) => Err(CompileError::syntax(
                format!("expected expression, got {other}"),
                span,
            )),
            None => Err(CompileError::syntax(
                "expected expression, got end of file",
                span,
            )),
        }
    }

    /// subroutineCall: name '(' expressionList ')' |
    ///                 receiver '.' name '(' expressionList ')'
    fn parse_subroutine_call(&mut self) -> Result<SubroutineCall> {
        let (first, span) = self.tokens.expect_identifier()?;
        let (receiver, name) = if self.tokens.peek_symbol()? == Some('.') {
            self.tokens.advance()?;
            let (name, _) = self.tokens.expect_identifier()?;
            (Some(first), name)
        } else {
            (None, first)
        };
        self.tokens.expect_symbol('(')?;
        let arguments = self.parse_expression_list()?;
        self.tokens.expect_symbol(')')?;
        Ok(SubroutineCall {
            receiver,
            name,
            arguments,
            span,
        })
    }

    /// expressionList: (expression (',' expression)*)?
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut exprs = Vec::new();
        if self.tokens.peek_symbol()? == Some(')') {
            return Ok(exprs);
        }
        exprs.push(self.parse_expression()?);
        while self.tokens.peek_symbol()? == Some(',') {
            self.tokens.advance()?;
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Class> {
        Parser::new(source).parse()
    }

    #[test]
    fn test_empty_class() {
        let class = parse("class Main { }").unwrap();
        assert_eq!(class.name, "Main");
        assert!(class.var_decs.is_empty());
        assert!(class.subroutines.is_empty());
    }

    #[test]
    fn test_class_var_decs() {
        let class = parse("class Point { field int x, y; static boolean debug; }").unwrap();
        assert_eq!(class.var_decs.len(), 2);
        assert_eq!(class.var_decs[0].kind, ClassVarKind::Field);
        assert_eq!(class.var_decs[0].names, vec!["x", "y"]);
        assert_eq!(class.var_decs[1].kind, ClassVarKind::Static);
        assert_eq!(class.var_decs[1].var_type, Type::Boolean);
    }

    #[test]
    fn test_qualified_names_are_stamped() {
        let class = parse(
            "class Point { constructor Point new() { return this; } method int getX() { return 0; } }",
        )
        .unwrap();
        assert_eq!(class.subroutines[0].qualified_name, "Point.new");
        assert_eq!(class.subroutines[1].qualified_name, "Point.getX");
    }

    #[test]
    fn test_parameter_list() {
        let class =
            parse("class M { function void f(int a, boolean b, Point p) { return; } }").unwrap();
        let params = &class.subroutines[0].parameters;
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name, "a");
        assert_eq!(params[2].var_type, Type::ClassName("Point".to_string()));
    }

    #[test]
    fn test_left_associative_fold() {
        // 1 + 2 * 3 parses as (1 + 2) * 3: single precedence class.
        let class = parse("class M { function int f() { return 1 + 2 * 3; } }").unwrap();
        let Statement::Return(ret) = &class.subroutines[0].body.statements[0] else {
            panic!("expected return");
        };
        let Expression::Binary { left, op, right, .. } = ret.value.as_ref().unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Mul);
        assert!(matches!(**right, Expression::IntegerLiteral(3, _)));
        let Expression::Binary { op: inner_op, .. } = &**left else {
            panic!("expected nested binary");
        };
        assert_eq!(*inner_op, BinaryOp::Add);
    }

    #[test]
    fn test_parentheses_regroup() {
        // 1 + (2 * 3) keeps the multiplication as the right operand.
        let class = parse("class M { function int f() { return 1 + (2 * 3); } }").unwrap();
        let Statement::Return(ret) = &class.subroutines[0].body.statements[0] else {
            panic!("expected return");
        };
        let Expression::Binary { op, right, .. } = ret.value.as_ref().unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**right, Expression::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_unary_binds_to_following_term() {
        // -x + y is (-x) + y, not -(x + y).
        let class = parse("class M { function int f(int x, int y) { return -x + y; } }").unwrap();
        let Statement::Return(ret) = &class.subroutines[0].body.statements[0] else {
            panic!("expected return");
        };
        let Expression::Binary { left, op, .. } = ret.value.as_ref().unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**left, Expression::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_statement_kinds() {
        let class = parse(
            "class M { function void f() { \
             var int x; \
             let x = 1; \
             if (x) { let x = 2; } else { let x = 3; } \
             while (x) { let x = 0; } \
             do Output.printInt(x); \
             return; } }",
        )
        .unwrap();
        let stmts = &class.subroutines[0].body.statements;
        assert!(matches!(stmts[0], Statement::Let(_)));
        assert!(matches!(stmts[1], Statement::If(_)));
        assert!(matches!(stmts[2], Statement::While(_)));
        assert!(matches!(stmts[3], Statement::Do(_)));
        assert!(matches!(stmts[4], Statement::Return(_)));
    }

    #[test]
    fn test_array_forms() {
        let class =
            parse("class M { function void f(Array a) { let a[0] = a[1] + 2; return; } }").unwrap();
        let Statement::Let(stmt) = &class.subroutines[0].body.statements[0] else {
            panic!("expected let");
        };
        assert!(stmt.index.is_some());
        let Expression::Binary { left, .. } = &stmt.value else {
            panic!("expected binary");
        };
        assert!(matches!(
            **left,
            Expression::Variable { index: Some(_), .. }
        ));
    }

    #[test]
    fn test_call_forms() {
        let class = parse(
            "class M { method void f() { do draw(); do obj.move(1, 2); do Math.abs(3); return; } }",
        )
        .unwrap();
        let stmts = &class.subroutines[0].body.statements;
        let Statement::Do(bare) = &stmts[0] else {
            panic!()
        };
        assert_eq!(bare.call.receiver, None);
        let Statement::Do(dotted) = &stmts[1] else {
            panic!()
        };
        assert_eq!(dotted.call.receiver.as_deref(), Some("obj"));
        assert_eq!(dotted.call.arguments.len(), 2);
    }

    #[test]
    fn test_missing_semicolon_is_fatal() {
        let err = parse("class M { function void f() { return } }").unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
        assert!(err.to_string().contains("';'"));
    }

    #[test]
    fn test_first_error_aborts() {
        // Both statements are malformed; only the first is reported.
        let err = parse("class M { function void f() { let = 1; let = 2; } }").unwrap_err();
        assert_eq!(err.span().unwrap().line, 1);
        assert!(err.to_string().contains("expected identifier"));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err = parse("class M { } class N { }").unwrap_err();
        assert!(err.to_string().contains("end of file after class body"));
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let opens = "(".repeat(100);
        let closes = ")".repeat(100);
        let source = format!("class M {{ function int f() {{ return {opens}1{closes}; }} }}");
        let err = parse(&source).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));
    }
}
