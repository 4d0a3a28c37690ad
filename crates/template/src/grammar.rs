//! Directive comment grammar.
//!
//! A directive is a comment line of the exact shape
//!
//! ```text
//! # TEMPLATE_<KIND>_<id> <value>
//! ```
//!
//! where `<KIND>` is `COLOR` or `TEXT` (any case), `<id>` is one or more
//! ASCII letters or underscores, and `<value>` is the non-empty rest of the
//! line. Surrounding whitespace of the whole line is ignored. Both parsing
//! and formatting live here so the two directions cannot drift apart.

use crate::FieldKind;

/// Literal prefix every directive line starts with (after trimming)
pub const MARKER: &str = "# TEMPLATE_";

/// Ids containing this fragment describe internal geometry, never fields
const RESERVED_ID_FRAGMENT: &str = "walls";

/// A strictly parsed directive line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub kind: FieldKind,
    /// Id exactly as written in the source (not yet lowercased)
    pub id: &'a str,
    pub value: &'a str,
}

/// A directive-like line as seen by the exporter.
///
/// Matches original lines (`TEMPLATE_COLOR_x`, `TEMPLATE_TEXT_x`) as well as
/// lines previously rewritten by [`format`] (`TEMPLATE_X_x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LooseDirective<'a> {
    /// `None` for previously exported lines, which no longer carry a kind
    pub kind: Option<FieldKind>,
    pub id: &'a str,
    pub value: &'a str,
}

/// Parse a single line. Returns `None` for anything that is not exactly a
/// directive, including directives whose id is reserved.
pub fn parse(line: &str) -> Option<Directive<'_>> {
    let rest = line.trim().strip_prefix(MARKER)?;
    let (token, value) = split_token(rest);
    if value.is_empty() {
        return None;
    }
    let (kind, id) = split_kind(token)?;
    if !is_valid_id(id) || is_reserved_id(id) {
        return None;
    }
    Some(Directive { kind, id, value })
}

/// Render a field back into directive form: `# TEMPLATE_<ID_UPPER>_<id> <value>`
pub fn format(id: &str, value: &str) -> String {
    format!("{MARKER}{}_{id} {value}", id.to_ascii_uppercase())
}

/// Recognize the directive family the exporter rewrites. The value may be
/// empty here; the reserved-id filter does not apply.
pub fn parse_loose(line: &str) -> Option<LooseDirective<'_>> {
    let rest = line.trim().strip_prefix(MARKER)?;
    let (token, value) = split_token(rest);

    // Previously exported: `<ID_UPPER>_<id>`, both halves the same length.
    // Takes precedence over `COLOR_<id>` for ids such as `color_id`.
    if let Some(id) = exported_id(token) {
        return Some(LooseDirective {
            kind: None,
            id,
            value,
        });
    }

    let (kind, id) = split_kind(token)?;
    if is_valid_id(id) {
        return Some(LooseDirective {
            kind: Some(kind),
            id,
            value,
        });
    }

    None
}

/// Ids are letters and underscores only
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_')
}

/// Ids mentioning `walls` are reserved for non-customizable geometry comments
pub fn is_reserved_id(id: &str) -> bool {
    id.to_ascii_lowercase().contains(RESERVED_ID_FRAGMENT)
}

/// Split `<token><ws><value>` into token and trimmed value
fn split_token(rest: &str) -> (&str, &str) {
    match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    }
}

/// `NAMEPLATE_LABEL_nameplate_label` -> `nameplate_label`
fn exported_id(token: &str) -> Option<&str> {
    if token.len() % 2 == 0 {
        return None;
    }
    let half = token.len() / 2;
    let upper = token.get(..half)?;
    let id = token.get(half..)?.strip_prefix('_')?;
    (is_valid_id(id) && upper == id.to_ascii_uppercase()).then_some(id)
}

/// Split `COLOR_<id>` / `TEXT_<id>` (keyword case-insensitive)
fn split_kind(token: &str) -> Option<(FieldKind, &str)> {
    [FieldKind::Color, FieldKind::Text].into_iter().find_map(|kind| {
        let keyword = kind.keyword();
        let head = token.get(..keyword.len())?;
        let id = token.get(keyword.len()..)?.strip_prefix('_')?;
        head.eq_ignore_ascii_case(keyword).then_some((kind, id))
    })
}
