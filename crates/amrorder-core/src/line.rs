//! Line fixing — reassembled fragments back to one well-formed line
//!
//! Reassembly concatenates chunks without separators and leans on this
//! module to restore the surface form: balanced parens, single spaces, no
//! alignment suffixes, and the small fixed set of seam artifacts the
//! concatenation produces (`):`, ` :)`, `: :`).

use once_cell::sync::Lazy;
use regex::Regex;

static ALIGNMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~e\.[\d,]+").unwrap());

/// Append `)` until the raw paren counts balance
pub fn balance(text: &str) -> String {
    let mut out = text.to_string();
    while out.matches('(').count() > out.matches(')').count() {
        out.push(')');
    }
    out
}

/// Remove all `~e.<idx>[,<idx>...]` alignment suffixes
pub fn strip_alignment(text: &str) -> String {
    ALIGNMENT_RE.replace_all(text, "").into_owned()
}

/// Final adjustments for an output line
pub fn finalize(text: &str) -> String {
    let mut out = text.replace("  ", " ").trim().to_string();
    while out.contains(" )") {
        out = out.replace(" )", ")");
    }
    out = balance(&out);
    out = strip_alignment(&out);
    out.replace("):", ") :").replace(" :)", ")").replace(": :", ":")
}

/// Collapse every whitespace run to one space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
