#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::AnnotationFlags;
use pretty_assertions::assert_eq;

/// `("let")->kw.(" ")->ws.(("a" | "b")->letter)->ident` as a token loop.
fn let_grammar() -> Grammar {
    let mut g = Grammar::new();
    let kw = g.one_of("kw", ["let"]).unwrap();
    let ws = g.one_of("ws", [" "]).unwrap();
    let letter = g.one_of("letter", ["a", "b"]).unwrap();
    let ident = g.repeat(letter, 1, None).unwrap();
    g.retoken(ident, Some("ident")).unwrap();
    g.sequence(&[kw, ws, ident]).unwrap();
    let root = g.alternation([kw, ws, ident]).unwrap();
    g.set_root(root).unwrap();
    g
}

#[test]
fn test_grammar_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar>();
}

#[test]
fn test_tokenize_texts() {
    let g = let_grammar();
    let stream = g.tokenize("let abba ab").unwrap();

    let texts: Vec<_> = stream
        .texts()
        .map(|(id, text)| (g.tokens().name(id).unwrap_or("?"), text))
        .collect();
    assert_eq!(
        texts,
        vec![
            ("kw", "let"),
            ("ws", " "),
            ("ident", "abba"),
            ("ws", " "),
            ("ident", "ab"),
        ]
    );
    assert_eq!(stream.source(), "let abba ab");
    assert_eq!(stream.len(), 5);
}

#[test]
fn test_tokenize_needs_a_root() {
    let mut g = Grammar::new();
    g.one_of("a", ["a"]).unwrap();
    assert_eq!(
        g.tokenize("a"),
        Err(ScanError::Grammar(GrammarError::NoRoot))
    );
}

#[test]
fn test_tokenize_empty_input() {
    let g = let_grammar();
    let stream = g.tokenize("").unwrap();
    assert!(stream.is_empty());
}

#[test]
fn test_tokenize_reports_where_it_got_stuck() {
    let g = let_grammar();
    assert_eq!(
        g.tokenize("let ab!"),
        Err(ScanError::NothingMatched { at: 6 })
    );
}

#[test]
fn test_tokenize_all_keeps_input_order() {
    let g = let_grammar();
    let inputs = ["let a", "b", "let !", " ", "abab"];
    let results = g.tokenize_all(&inputs);

    let lens: Vec<_> = results
        .iter()
        .map(|r| r.as_ref().map(TokenStream::len).map_err(Clone::clone))
        .collect();
    assert_eq!(
        lens,
        vec![
            Ok(3),
            Ok(1),
            Err(ScanError::NothingMatched { at: 4 }),
            Ok(1),
            Ok(1),
        ]
    );
}

#[test]
fn test_annotate_terminal_derives_a_rule() {
    let mut g = Grammar::new();
    let a = g.one_of("a", ["a"]).unwrap();
    let StateKind::Terminal { rule } = g.states().node(a).unwrap().kind else {
        panic!("expected a terminal");
    };
    let shared = g.terminal(rule).unwrap();

    g.annotate(a, &RuleAnnotations::new().with(AnnotationFlags::VOID))
        .unwrap();

    assert_eq!(g.serialize(a).unwrap(), r#"@void ("a")->a"#);
    assert_eq!(g.serialize(shared).unwrap(), r#"("a")->a"#);
    assert_eq!(g.rules().len(), 2);
}

#[test]
fn test_annotate_merges_on_structural_states() {
    let mut g = Grammar::new();
    let a = g.one_of("a", ["a"]).unwrap();
    let rep = g.repeat(a, 1, None).unwrap();

    g.annotate(rep, &RuleAnnotations::new().with(AnnotationFlags::PINNED))
        .unwrap();
    g.annotate(rep, &RuleAnnotations::new().with_error("need an a"))
        .unwrap();

    assert_eq!(
        g.serialize(rep).unwrap(),
        r#"@pinned @error("need an a") (("a")->a)"#
    );
}

#[test]
fn test_serialize_rejects_cycles() {
    let mut g = Grammar::new();
    let a = g.one_of("a", ["a"]).unwrap();
    g.link(a, a).unwrap();
    assert_eq!(g.serialize(a), Err(GrammarError::CyclicGraph(a)));
}

#[test]
fn test_serialize_expands_shared_states() {
    let mut g = Grammar::new();
    let a = g.one_of("a", ["a"]).unwrap();
    let b = g.one_of("b", ["b"]).unwrap();
    let c = g.one_of("c", ["c"]).unwrap();
    g.link(a, c).unwrap();
    g.link(b, c).unwrap();
    let root = g.alternation([a, b]).unwrap();

    assert_eq!(
        g.serialize(root).unwrap(),
        "().{\n\t(\"a\")->a.(\"c\")->c,\n\t(\"b\")->b.(\"c\")->c\n}"
    );
}

#[test]
fn test_clone_serializes_identically_and_independently() {
    let mut g = let_grammar();
    let root = g.root().unwrap();
    let before = g.serialize(root).unwrap();

    let copy = g.instantiate(root).unwrap();
    assert_eq!(g.serialize(copy).unwrap(), before);

    let extra = g.one_of("extra", ["?"]).unwrap();
    g.link(copy, extra).unwrap();
    assert_eq!(g.serialize(root).unwrap(), before);
    assert_ne!(g.serialize(copy).unwrap(), before);
}

#[test]
fn test_parse_and_tokenize() {
    let g = Grammar::parse("().{\n\t(\"x\")->x,\n\t((\"y\")->y,2)->ys\n}").unwrap();
    let stream = g.tokenize("xyyx").unwrap();

    let names: Vec<_> = stream
        .iter()
        .map(|t| g.tokens().name(t.id).unwrap_or("?"))
        .collect();
    assert_eq!(names, vec!["x", "ys", "x"]);
}

#[test]
fn test_read_grammar_matches_built_grammar() {
    let built = let_grammar();
    let text = built.serialize(built.root().unwrap()).unwrap();
    let read = Grammar::parse(&text).unwrap();

    for input in ["let a", "let abba ab", "ba let"] {
        let expected = built.tokenize(input).map(TokenStream::into_tokens);
        let actual = read.tokenize(input).map(TokenStream::into_tokens);
        assert_eq!(actual, expected, "input {input:?}");
    }
}

#[test]
fn test_optional_prefix_may_be_absent() {
    let g = Grammar::parse("((\"a\")->a,0)->as.(\"dog\")->dog").unwrap();

    for (input, expected) in [
        ("aadog", vec![("as", "aa"), ("dog", "dog")]),
        ("dog", vec![("dog", "dog")]),
    ] {
        let stream = g.tokenize(input).unwrap();
        let texts: Vec<_> = stream
            .texts()
            .map(|(id, text)| (g.tokens().name(id).unwrap_or("?"), text))
            .collect();
        assert_eq!(texts, expected, "input {input:?}");
    }
}

#[test]
fn test_long_chains_round_trip() {
    let mut g = Grammar::new();
    let first = g.one_of("a", ["a"]).unwrap();
    let StateKind::Terminal { rule } = g.states().node(first).unwrap().kind else {
        panic!("expected a terminal");
    };
    let mut last = first;
    for _ in 1..200_000 {
        let next = g.terminal(rule).unwrap();
        g.link(last, next).unwrap();
        last = next;
    }

    let text = g.serialize(first).unwrap();
    assert_eq!(text.matches("(\"a\")->a").count(), 200_000);
    let read = Grammar::parse(&text).unwrap();
    assert_eq!(read.serialize(read.root().unwrap()).unwrap(), text);
}

#[test]
fn test_deep_nesting_reads_and_writes() {
    const DEPTH: usize = 200_000;
    let text = format!("{}(\"a\")->a{}", "(".repeat(DEPTH), ")".repeat(DEPTH));

    let g = Grammar::parse(&text).unwrap();
    let root = g.root().unwrap();
    assert!(matches!(
        g.states().node(root).unwrap().kind,
        StateKind::Repeat { min: 1, max: None, .. }
    ));
    assert_eq!(g.serialize(root).unwrap(), text);

    // Unclosed nesting is an ordinary read error.
    assert_eq!(
        Grammar::parse(&"(".repeat(DEPTH)).map(|_| ()),
        Err(ReadError::Expected {
            expected: "`(`",
            at: DEPTH
        })
    );
}

#[test]
fn test_terminal_without_literals_is_rejected() {
    let mut g = Grammar::new();
    assert_eq!(
        g.one_of("nothing", Vec::<&str>::new()),
        Err(GrammarError::EmptyTerminal)
    );
    assert!(g.states().is_empty());
}
