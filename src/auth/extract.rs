//! Pattern-based extraction of hidden form fields from login pages.
//!
//! A pattern that does not match and a match with an empty value are the same
//! outcome: `None`.

use std::sync::LazyLock;

use regex::Regex;

use super::form::FormField;

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static GXF_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"<input\s+type="hidden"\s+name="gxf"\s+value="([^"\s]*)"#)
});
static PROFILE_INFORMATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"<input\s+id="profile-information"\s+name="ProfileInformation"\s+type="hidden"\s+value="([^"\s]*)"#,
    )
});
static SESSION_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"<input\s+id="session-state"\s+name="SessionState"\s+type="hidden"\s+value="([^"\s]*)"#,
    )
});

/// Extracts the value of the hidden `<input>` carrying `field`.
///
/// Returns `None` when the tag is absent or its value is empty.
#[must_use]
pub fn hidden_field(html: &str, field: FormField) -> Option<&str> {
    let regex: &Regex = match field {
        FormField::Gxf => &GXF_RE,
        FormField::ProfileInformation => &PROFILE_INFORMATION_RE,
        FormField::SessionState => &SESSION_STATE_RE,
    };
    regex
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|value| !value.is_empty())
}
