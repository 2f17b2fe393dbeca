use jack_compiler::compile_source;
use jack_compiler::token::{Keyword, Token};
use jack_compiler::tokenizer::Tokenizer;
use proptest::prelude::*;

fn drain(source: &str) -> Result<Vec<Token>, jack_compiler::CompileError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut out = Vec::new();
    while let Some(t) = tokenizer.advance()? {
        out.push(t.token);
    }
    Ok(out)
}

proptest! {
    /// The tokenizer may reject garbage, but never panics.
    #[test]
    fn test_tokenizer_no_panic(input in "\\PC{0,200}") {
        let _ = drain(&input);
    }

    /// Tokenization is a pure function of its input.
    #[test]
    fn test_tokenizer_deterministic(input in "[ -~\n]{0,200}") {
        match (drain(&input), drain(&input)) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "non-deterministic outcome"),
        }
    }

    /// Any identifier-shaped word lexes to a single token.
    #[test]
    fn test_identifiers_lex_whole(word in "[a-zA-Z_][a-zA-Z0-9_]{0,20}") {
        let tokens = drain(&word).unwrap();
        prop_assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            Token::Identifier(name) => prop_assert_eq!(name, &word),
            Token::Keyword(k) => prop_assert_eq!(k.as_str(), word),
            other => prop_assert!(false, "unexpected token {:?}", other),
        }
    }

    /// In-range integers lex; anything past 32767 is a lexical error.
    #[test]
    fn test_integer_range_boundary(n in 0u32..=100_000) {
        let result = drain(&n.to_string());
        if n <= 32767 {
            prop_assert_eq!(result.unwrap(), vec![Token::IntegerConstant(n as u16)]);
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// The whole pipeline may reject garbage, but never panics.
    #[test]
    fn test_compiler_no_panic(input in "[ -~\n]{0,300}") {
        let _ = compile_source(&input, "Fuzz.jack");
    }

    /// A generated straight-line class always compiles, with one pop per
    /// assignment.
    #[test]
    fn test_straight_line_assignments(values in prop::collection::vec(0u16..=32767, 1..20)) {
        let mut body = String::from("var int x; ");
        for v in &values {
            body.push_str(&format!("let x = {v}; "));
        }
        body.push_str("return;");
        let source = format!("class M {{ function void f() {{ {body} }} }}");
        let vm = compile_source(&source, "M.jack").unwrap().vm_code;
        prop_assert_eq!(vm.matches("pop local 0").count(), values.len());
    }

    /// Chained binary operators fold without panicking and evaluate
    /// strictly left to right.
    #[test]
    fn test_operator_chains(ops in prop::collection::vec(prop_oneof![
        Just('+'), Just('-'), Just('&'), Just('|'), Just('<'), Just('>'), Just('=')
    ], 1..15)) {
        let mut expr = String::from("1");
        for op in &ops {
            expr.push(*op);
            expr.push('1');
        }
        let source = format!("class M {{ function int f() {{ return {expr}; }} }}");
        let vm = compile_source(&source, "M.jack").unwrap().vm_code;
        // One push per literal operand.
        prop_assert_eq!(vm.matches("push constant 1").count(), ops.len() + 1);
    }
}

#[test]
fn keyword_set_round_trips_through_tokenizer() {
    for kw in [
        "class",
        "constructor",
        "function",
        "method",
        "field",
        "static",
        "var",
        "int",
        "char",
        "boolean",
        "void",
        "true",
        "false",
        "null",
        "this",
        "let",
        "do",
        "if",
        "else",
        "while",
        "return",
    ] {
        let tokens = drain(kw).unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Token::Keyword(_)));
        assert_eq!(Keyword::parse(kw).unwrap().as_str(), kw);
    }
}
