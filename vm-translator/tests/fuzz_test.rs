use proptest::prelude::*;
use vm_translator::translate;

fn arb_vm_line() -> impl Strategy<Value = String> {
    let segments = prop_oneof![
        Just("constant"),
        Just("local"),
        Just("argument"),
        Just("this"),
        Just("that"),
        Just("pointer"),
        Just("temp"),
        Just("static"),
    ];
    prop_oneof![
        prop_oneof![
            Just("add"), Just("sub"), Just("neg"),
            Just("eq"), Just("lt"), Just("gt"),
            Just("and"), Just("or"), Just("not"),
            Just("return"),
        ]
        .prop_map(String::from),
        (Just("push"), segments.clone(), any::<u16>())
            .prop_map(|(c, s, i)| format!("{c} {s} {i}")),
        (Just("pop"), segments, any::<u16>()).prop_map(|(c, s, i)| format!("{c} {s} {i}")),
        ("[a-zA-Z.$_][a-zA-Z0-9.$_]*").prop_map(|l| format!("label {l}")),
        ("[a-zA-Z.$_][a-zA-Z0-9.$_]*", 0u16..10)
            .prop_map(|(n, c)| format!("function {n} {c}")),
        ("[a-zA-Z.$_][a-zA-Z0-9.$_]*", 0u16..10).prop_map(|(n, c)| format!("call {n} {c}")),
        "//[^\n]*".prop_map(String::from),
        "[ \t]*".prop_map(String::from),
        "[\\x20-\\x7E]{0,40}".prop_map(String::from),
    ]
}

fn arb_vm_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_vm_line(), 0..60).prop_map(|lines| lines.join("\n"))
}

proptest! {
    /// The translator may reject garbage, but never panics.
    #[test]
    fn test_no_panic_on_arbitrary_input(input in arb_vm_program()) {
        let _ = translate(&input, "Fuzz");
    }

    /// Translation is a pure function of its input.
    #[test]
    fn test_deterministic(input in arb_vm_program()) {
        match (translate(&input, "Fuzz"), translate(&input, "Fuzz")) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "non-deterministic outcome"),
        }
    }

    /// Every comparison gets its own label pair, declared exactly once.
    #[test]
    fn test_comparison_label_uniqueness(
        ops in prop::collection::vec(prop_oneof![Just("eq"), Just("lt"), Just("gt")], 1..20)
    ) {
        let mut source = String::new();
        for op in &ops {
            source.push_str("push constant 1\npush constant 2\n");
            source.push_str(op);
            source.push('\n');
        }
        let asm = translate(&source, "Cmp").unwrap();
        for n in 0..ops.len() {
            prop_assert_eq!(asm.matches(&format!("(CMP_TRUE_{n})")).count(), 1);
            prop_assert_eq!(asm.matches(&format!("(CMP_END_{n})")).count(), 1);
        }
    }

    /// Valid push commands always translate, for every in-range index.
    #[test]
    fn test_push_constant_always_translates(index in any::<u16>()) {
        let source = format!("push constant {index}");
        let asm = translate(&source, "Test").unwrap();
        let needle = format!("@{index}");
        prop_assert!(asm.contains(&needle));
    }
}
