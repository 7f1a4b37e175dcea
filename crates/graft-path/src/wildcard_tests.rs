use crate::wildcard::WildcardMatcher;

#[test]
fn question_mark_is_one_character() {
    let matcher = WildcardMatcher::new("b?z").unwrap();
    assert!(matcher.matches("baz"));
    assert!(!matcher.matches("buzz"));
    assert!(!matcher.matches("bz"));
}

#[test]
fn star_matches_any_run_including_empty() {
    let matcher = WildcardMatcher::new("b*z").unwrap();
    assert!(matcher.matches("bz"));
    assert!(matcher.matches("buzz"));
    assert!(!matcher.matches("buzzy"));
}

#[test]
fn bare_star_matches_everything() {
    let matcher = WildcardMatcher::new("*").unwrap();
    assert!(matcher.matches(""));
    assert!(matcher.matches("anything"));
}

#[test]
fn literal_runs_are_escaped() {
    let matcher = WildcardMatcher::new("a[b*").unwrap();
    assert!(matcher.matches("a[bc"));
    assert!(!matcher.matches("abc"));
}

#[test]
fn decisions_are_memoized() {
    let matcher = WildcardMatcher::new("chil*n").unwrap();
    assert!(matcher.matches("children"));
    // second lookup hits the memo and must agree
    assert!(matcher.matches("children"));
    assert!(!matcher.matches("child"));
}
