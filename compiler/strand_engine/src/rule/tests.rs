#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::{AnnotationFlags, NoCache, ResultCache};
use pretty_assertions::assert_eq;
use strand_ir::Span;

fn animal() -> TokenId {
    TokenId::new(0)
}

#[test]
fn test_first_candidate_that_matches_wins() {
    let rule = TerminalRule::one_of(animal(), ["cat", "car"]).unwrap();
    let mut scanner = Scanner::new("car");
    let mut cache = ResultCache::new();

    let result = rule.evaluate(RuleId::new(0), &mut scanner, &mut cache);
    assert_eq!(
        result,
        Ok(MatchResult::Success(MatchContext::new(Span::new(0, 3))))
    );
    assert_eq!(scanner.position(), 3);
    // "cat" was tried and missed before "car" matched.
    assert_eq!(scanner.scan_count(), 2);
    assert_eq!(scanner.mark_depth(), 0);
}

#[test]
fn test_later_candidates_are_not_tried() {
    let rule = TerminalRule::one_of(animal(), ["ca", "car"]).unwrap();
    let mut scanner = Scanner::new("car");

    let result = rule.evaluate(RuleId::new(0), &mut scanner, &mut NoCache);
    assert_eq!(result.ok().and_then(|r| r.span()), Some(Span::new(0, 2)));
    assert_eq!(scanner.scan_count(), 1);
}

#[test]
fn test_nothing_matched_restores_position() {
    let rule = TerminalRule::one_of(animal(), ["dog", "cow"]).unwrap();
    let mut scanner = Scanner::new("carcat");
    scanner.set_position(3);

    let result = rule.evaluate(RuleId::new(0), &mut scanner, &mut NoCache);
    assert_eq!(result, Ok(MatchResult::Failure { at: 3 }));
    assert_eq!(scanner.position(), 3);
    assert_eq!(scanner.mark_depth(), 0);
}

#[test]
fn test_end_of_input_is_a_hard_stop() {
    let rule = TerminalRule::one_of(animal(), ["cat"]).unwrap();
    let mut scanner = Scanner::new("cat");
    scanner.set_position(3);
    let mut cache = ResultCache::new();

    let result = rule.evaluate(RuleId::new(0), &mut scanner, &mut cache);
    assert_eq!(result, Err(ScanError::UnexpectedEndOfFile { at: 3 }));
    // End of input is never cached.
    assert!(cache.is_empty());
}

#[test]
fn test_cached_success_fast_forwards_without_scanning() {
    let rule = TerminalRule::one_of(animal(), ["cat", "car"]).unwrap();
    let id = RuleId::new(0);
    let mut scanner = Scanner::new("car");
    let mut cache = ResultCache::new();

    let first = rule.evaluate(id, &mut scanner, &mut cache);
    let scans = scanner.scan_count();
    scanner.set_position(0);

    let second = rule.evaluate(id, &mut scanner, &mut cache);
    assert_eq!(first, second);
    assert_eq!(scanner.scan_count(), scans);
    assert_eq!(scanner.position(), 3);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_cached_failure_fails_without_scanning() {
    let rule = TerminalRule::one_of(animal(), ["dog"]).unwrap();
    let id = RuleId::new(0);
    let mut scanner = Scanner::new("car");
    let mut cache = ResultCache::new();

    let _ = rule.evaluate(id, &mut scanner, &mut cache);
    let second = rule.evaluate(id, &mut scanner, &mut cache);
    assert_eq!(second, Ok(MatchResult::Failure { at: 0 }));
    assert_eq!(scanner.scan_count(), 1);
    assert_eq!(scanner.position(), 0);
}

#[test]
fn test_description_quotes_choices() {
    let rule = TerminalRule::one_of(animal(), ["cat", "c\"r"]).unwrap();
    assert_eq!(rule.describe(), r#"("cat" | "c\"r")"#);

    let annotated =
        rule.with_annotations(RuleAnnotations::new().with(AnnotationFlags::VOID));
    assert_eq!(annotated.to_string(), r#"@void ("cat" | "c\"r")"#);
}

#[test]
fn test_instance_overrides_only_what_is_given() {
    let rule = TerminalRule::one_of(animal(), ["cat"])
        .unwrap()
        .with_annotations(RuleAnnotations::new().with(AnnotationFlags::PINNED));

    let retokened = rule.instance(Some(TokenId::new(9)), None);
    assert_eq!(retokened.produces(), TokenId::new(9));
    assert_eq!(retokened.annotations(), rule.annotations());
    assert_eq!(retokened.describe(), rule.describe());

    let reannotated = rule.instance(None, Some(RuleAnnotations::new()));
    assert_eq!(reannotated.produces(), animal());
    assert_eq!(reannotated.describe(), r#"("cat")"#);
}

#[test]
fn test_rule_table_addresses_by_id() {
    let mut table = RuleTable::new();
    let a = table.push(Box::new(TerminalRule::one_of(animal(), ["a"]).unwrap()));
    let b = table.push(Box::new(TerminalRule::one_of(animal(), ["b"]).unwrap()));
    assert_ne!(a, b);
    assert_eq!(table.get(b).map(|r| r.describe()), Some(r#"("b")"#.to_string()));
    assert!(table.get(RuleId::new(5)).is_none());

    let copy = table.clone();
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.get(a).map(|r| r.describe()), Some(r#"("a")"#.to_string()));
}

#[test]
fn test_terminal_needs_a_literal() {
    assert_eq!(
        TerminalRule::one_of(animal(), Vec::<&str>::new()),
        Err(GrammarError::EmptyTerminal)
    );
}
