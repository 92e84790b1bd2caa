//! Record selection by domain prefix

/// Whether `record_name` starts with any of `prefixes`
///
/// This is a plain, case-sensitive string prefix test. It is **not** aware of
/// label boundaries: the prefix `"cloud"` selects `cloud.example.com` and also
/// `cloudy.example.com`. Use a trailing dot (`"cloud."`) in the configuration
/// to pin a prefix to a whole label.
pub fn matches_any_domain<S: AsRef<str>>(record_name: &str, prefixes: &[S]) -> bool {
    prefixes
        .iter()
        .any(|prefix| record_name.starts_with(prefix.as_ref()))
}
