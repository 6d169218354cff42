use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_scan_consumes_literal() {
    let mut scanner = Scanner::new("carcat");
    assert_eq!(scanner.scan("car"), Ok(()));
    assert_eq!(scanner.position(), 3);
    assert_eq!(scanner.remaining(), "cat");
}

#[test]
fn test_scan_miss_leaves_position() {
    let mut scanner = Scanner::new("car");
    assert_eq!(scanner.scan("cat"), Err(NoMatch { at: 0 }));
    assert_eq!(scanner.position(), 0);
    assert_eq!(scanner.scan_count(), 1);
}

#[test]
fn test_scan_past_end_is_a_miss() {
    let mut scanner = Scanner::new("ca");
    assert_eq!(scanner.scan("car"), Err(NoMatch { at: 0 }));
}

#[test]
fn test_empty_terminal_is_zero_width() {
    let mut scanner = Scanner::new("x");
    assert_eq!(scanner.scan(""), Ok(()));
    assert_eq!(scanner.position(), 0);
}

#[test]
fn test_end_of_input() {
    let mut scanner = Scanner::new("ab");
    assert!(!scanner.is_at_end());
    assert_eq!(scanner.scan("ab"), Ok(()));
    assert!(scanner.is_at_end());
    assert!(Scanner::new("").is_at_end());
}

#[test]
fn test_mark_proceed_returns_span() {
    let mut scanner = Scanner::new("carcat");
    assert_eq!(scanner.scan("car"), Ok(()));
    scanner.mark();
    assert_eq!(scanner.scan("cat"), Ok(()));
    assert_eq!(scanner.proceed(), Span::new(3, 6));
    assert_eq!(scanner.mark_depth(), 0);
}

#[test]
fn test_nested_marks_rewind_independently() {
    let mut scanner = Scanner::new("abcd");
    scanner.mark();
    assert_eq!(scanner.scan("ab"), Ok(()));
    scanner.mark();
    assert_eq!(scanner.scan("cd"), Ok(()));
    assert_eq!(scanner.rewind(), 2);
    assert_eq!(scanner.mark_depth(), 1);
    assert_eq!(scanner.rewind(), 0);
    assert_eq!(scanner.mark_depth(), 0);
}

#[test]
fn test_set_position_fast_forwards() {
    let mut scanner = Scanner::new("carcat");
    scanner.set_position(3);
    assert_eq!(scanner.remaining(), "cat");
    assert_eq!(scanner.scan_count(), 0);
}

#[test]
fn test_multibyte_literals() {
    let mut scanner = Scanner::new("héllo");
    assert_eq!(scanner.scan("hé"), Ok(()));
    assert_eq!(scanner.position(), 3);
    assert_eq!(scanner.remaining(), "llo");
}

proptest! {
    #[test]
    fn rewind_restores_any_prefix_scan(source in "[a-c]{0,24}", split in 0usize..24) {
        let split = split.min(source.len());
        let prefix = &source[..split];
        let mut scanner = Scanner::new(&source);
        scanner.mark();
        prop_assert!(scanner.scan(prefix).is_ok());
        prop_assert_eq!(scanner.position() as usize, split);
        prop_assert_eq!(scanner.rewind(), 0);
        prop_assert_eq!(scanner.mark_depth(), 0);
    }

    #[test]
    fn proceed_span_covers_consumed_text(source in "[a-c]{1,24}", split in 1usize..24) {
        let split = split.min(source.len());
        let mut scanner = Scanner::new(&source);
        scanner.mark();
        prop_assert!(scanner.scan(&source[..split]).is_ok());
        let span = scanner.proceed();
        prop_assert_eq!(span.slice(&source), Some(&source[..split]));
    }
}
