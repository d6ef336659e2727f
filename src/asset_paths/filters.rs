use regex::Regex;

fn unsafe_name_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"^\s*$").expect("invalid blank name regex"),
                Regex::new(r"^[/\\]").expect("invalid absolute path regex"),
                Regex::new(r"^[A-Za-z]:").expect("invalid drive prefix regex"),
                Regex::new(r"(^|[/\\])\.\.([/\\]|$)").expect("invalid parent segment regex"),
            ]
        })
        .as_slice()
}

/// Determine whether an asset name would escape its category directory in the archive.
///
/// Blank names, absolute paths, drive prefixes and `..` segments are rejected; such assets
/// are skipped rather than written.
pub fn is_unsafe_asset_name(name: &str) -> bool {
    unsafe_name_patterns()
        .iter()
        .any(|pattern| pattern.is_match(name))
}
