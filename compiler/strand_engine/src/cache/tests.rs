use super::*;
use crate::MatchContext;
use strand_ir::Span;

fn success(start: u32, end: u32) -> MatchResult {
    MatchResult::Success(MatchContext::new(Span::new(start, end)))
}

#[test]
fn test_miss_then_hit() {
    let mut cache = ResultCache::new();
    let rule = RuleId::new(0);
    assert_eq!(cache.will_evaluate(rule, 0), None);
    cache.did_evaluate(rule, &success(0, 3));
    assert_eq!(cache.will_evaluate(rule, 0), Some(success(0, 3)));
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            entries: 1
        }
    );
}

#[test]
fn test_keyed_by_rule_and_position() {
    let mut cache = ResultCache::new();
    let a = RuleId::new(0);
    let b = RuleId::new(1);
    cache.did_evaluate(a, &success(0, 3));
    cache.did_evaluate(a, &MatchResult::Failure { at: 3 });
    assert_eq!(cache.get(a, 3), Some(&MatchResult::Failure { at: 3 }));
    assert_eq!(cache.get(b, 0), None);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_failure_is_keyed_by_its_start() {
    let mut cache = ResultCache::new();
    let rule = RuleId::new(7);
    cache.did_evaluate(rule, &MatchResult::Failure { at: 5 });
    assert_eq!(
        cache.will_evaluate(rule, 5),
        Some(MatchResult::Failure { at: 5 })
    );
}

#[test]
fn test_no_cache_always_misses() {
    let mut cache = NoCache;
    let rule = RuleId::new(0);
    cache.did_evaluate(rule, &success(0, 1));
    assert_eq!(cache.will_evaluate(rule, 0), None);
}
