//! Input cleanup applied before text reaches the record store.
//!
//! The store's range checks run on the cleaned values.

/// Strip all control characters, then trim.
pub fn clean_title(raw: &str) -> String {
    strip(raw, |_| false)
}

/// Strip control characters except newline and tab, then trim.
pub fn clean_sensitive_text(raw: &str) -> String {
    strip(raw, |c| c == '\n' || c == '\t')
}

fn strip(raw: &str, keep_control: impl Fn(char) -> bool) -> String {
    let kept: String = raw
        .chars()
        .filter(|&c| !c.is_control() || keep_control(c))
        .collect();
    kept.trim().to_owned()
}
