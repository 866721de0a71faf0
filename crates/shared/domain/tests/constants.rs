use studio_domain::constants::{
    FLAG_LOG_PREFIX, FLAG_NAMESPACE, PROVIDER_FLAG_PREFIX, SNAPSHOT_DIR, SNAPSHOT_LABEL,
};

#[test]
fn constants_match_platform_strings() {
    assert_eq!(FLAG_NAMESPACE, "studio");
    assert_eq!(FLAG_LOG_PREFIX, "Studio: ");
    assert_eq!(PROVIDER_FLAG_PREFIX, "show_review_rules_for_");
    assert_eq!(SNAPSHOT_LABEL, "memory_leaks");
    assert_eq!(SNAPSHOT_DIR, "memory_graphs");
}
