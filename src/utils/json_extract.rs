use regex::Regex;
use std::sync::OnceLock;

fn array_of_objects() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("array-of-objects pattern"))
}

/// Locates the JSON array inside a free-text model reply.
///
/// A bracketed run of objects (`[ { ... } ]`, spanning newlines, greedy) is
/// preferred. Otherwise everything from the first `[` through the last `]`
/// is returned.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    if let Some(m) = array_of_objects().find(raw) {
        return Some(m.as_str());
    }

    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
