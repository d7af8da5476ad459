//! Pre-pass — variable deletion, wiki removal, single-line conversion
//!
//! The engine proper works on variable-free, single-line AMRs. This module
//! turns the raw annotated form (multi-line, indented, with variables and
//! optional `:wiki` links) into that shape. Re-entrant variables are
//! *duplicated in place*: every bare reference to a variable is replaced by
//! a bracketed copy of the concept text it names, so downstream word-order
//! surgery never has to chase references.
//!
//! ```text
//! (l / like            (like
//!     :ARG0 (p / person     :ARG0 (person :name "Bob")
//!         :name "Bob")  =>  :ARG1 (person :name "Bob"))
//!     :ARG1 p)
//! ```
//!
//! Variable deletion assumes the conventional annotation layout of one node
//! per line; a line it cannot interpret passes through unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::chunk::strip_char_outside_quotes;

static WIKI_QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#":wiki "(.*?)""#).unwrap());
static VAR_HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([A-Za-z0-9_~-]+ / ").unwrap());

/// Remove `:wiki` attributes from every line
///
/// Only the first quoted wiki link per line is removed (they do not repeat
/// in practice); bare `:wiki -` markers are removed wherever they appear.
/// Indentation is preserved, interior whitespace is collapsed.
pub fn delete_wiki(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let no_wiki = WIKI_QUOTED_RE.replace(line, "");
            let no_wiki = no_wiki.replace(":wiki -", "");
            let indent = line.len() - line.trim_start().len();
            format!(
                "{}{}",
                " ".repeat(indent),
                no_wiki.split_whitespace().collect::<Vec<_>>().join(" ")
            )
        })
        .collect()
}

/// Delete any `(v / ` variable heads from an already single-line AMR
pub fn strip_inline_variables(line: &str) -> String {
    VAR_HEAD_RE.replace_all(line, "(").into_owned()
}

/// Harvest variable definitions from one line into `vars`
///
/// A `(` starts a variable name, a `/` starts its concept text; the text
/// runs until the next `(`. Returns the line with its variable heads
/// deleted.
fn process_var_line(line: &str, vars: &mut HashMap<String, String>) -> String {
    let mut name = String::new();
    let mut value = String::new();
    let mut in_name = false;
    let mut in_value = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '/' && !in_quotes {
            in_value = true;
            in_name = false;
            value.clear();
            continue;
        }
        if ch == '(' && !in_quotes {
            in_name = true;
            in_value = false;
            record_var(&name, &value, vars);
            name.clear();
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
        }
        if in_name {
            name.push(ch);
        }
        if in_value {
            value.push(ch);
        }
    }
    record_var(&name, &value, vars);

    strip_inline_variables(line)
}

fn record_var(name: &str, value: &str, vars: &mut HashMap<String, String>) {
    let name = name.trim();
    if name.is_empty() || value.trim().is_empty() {
        return;
    }
    let mut text = strip_char_outside_quotes(value.trim(), ')');
    // A trailing `:relation` token belongs to the next node, not the concept
    if let Some(last) = text.split_whitespace().last() {
        if last.starts_with(':') {
            let words: Vec<&str> = text.split_whitespace().collect();
            text = words[..words.len() - 1].join(" ");
        }
    }
    vars.insert(name.to_string(), text.trim().to_string());
}

/// Delete variables from a multi-line AMR, duplicating re-entrancies
///
/// Two passes: first collect every `variable -> concept text` binding over
/// the whole input, then rewrite each line — definition lines lose their
/// variable heads, bare reference lines get a bracketed copy of the bound
/// text spliced in.
pub fn delete_variables(lines: &[String]) -> Vec<String> {
    let mut vars: HashMap<String, String> = HashMap::new();
    for line in lines {
        process_var_line(line, &mut vars);
    }

    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            out.push(line.clone());
            continue;
        }
        if line.contains('/') {
            out.push(process_var_line(line, &mut HashMap::new()));
            continue;
        }
        // No concept on this line: probably `:relation variable`
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            out.push(line.clone());
            continue;
        }
        let reference = tokens[1].replace(')', "");
        match vars.get(&reference) {
            Some(bound) => {
                let replacement = format!("({})", bound.trim());
                let mut rebuilt: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
                rebuilt[1] = tokens[1].replace(&reference, &replacement);
                let indent = line.len() - line.trim_start().len();
                out.push(format!("{}{}", " ".repeat(indent), rebuilt.join(" ")));
            }
            // Not a variable after all (numbers land here), keep as is
            None => out.push(line.clone()),
        }
    }
    out
}

/// Collapse multi-line AMR blocks to single lines, harvesting sentences
///
/// Blocks are separated by blank lines; `# ::snt` / `# ::tok` comment lines
/// contribute to the sentence list, other `#` lines are dropped.
pub fn single_line_convert(lines: &[String]) -> (Vec<String>, Vec<String>) {
    let mut amrs = Vec::new();
    let mut sents = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                amrs.push(current.join(" ").trim().to_string());
                current.clear();
            }
        } else if line.starts_with("# ::snt") || line.starts_with("# ::tok") {
            let sent = line
                .trim_start_matches("# ::snt")
                .trim_start_matches("# ::tok")
                .trim();
            sents.push(sent.to_string());
        } else if !line.starts_with('#') {
            current.push(line.trim().to_string());
        }
    }
    if !current.is_empty() {
        amrs.push(current.join(" ").trim().to_string());
    }

    (amrs, sents)
}

/// Full pre-pass over raw annotated AMR text
///
/// Returns the variable-free single-line AMRs and their paired sentences.
pub fn var_free_lines(text: &str, keep_wiki: bool) -> (Vec<String>, Vec<String>) {
    let lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
    let lines = if keep_wiki { lines } else { delete_wiki(&lines) };
    let deleted = delete_variables(&lines);
    single_line_convert(&deleted)
}
