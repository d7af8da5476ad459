//! Alignment extraction — maps concept tokens to sentence positions
//!
//! Concepts in an aligned AMR carry a suffix tying them to source-sentence
//! token indices, e.g. `opium~e.0` or `house~e.4,12`. This module splits
//! those suffixes off and summarizes a bracketed chunk as an ordered list of
//! (word, position) pairs, which is all the distance model ever sees.
//!
//! A malformed suffix is treated as "no alignment" for that token — the
//! token keeps its slot in the summary but is excluded from distance math.

use tracing::debug;

/// A word paired with its (possibly absent) sentence position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedToken {
    pub word: String,
    pub pos: Option<i64>,
}

impl AlignedToken {
    pub fn new(word: impl Into<String>, pos: Option<i64>) -> Self {
        AlignedToken {
            word: word.into(),
            pos,
        }
    }

    fn unaligned(word: impl Into<String>) -> Self {
        AlignedToken::new(word, None)
    }
}

/// Split a token into its word and alignment position
///
/// The index list is whatever follows the last `.` of the text after the
/// last `~`; a comma-separated list is merged by arithmetic mean, rounded to
/// the nearest whole number. The mean is only used for ordering math — it no
/// longer refers to a real token, which is an accepted approximation.
pub fn split_alignment(token: &str) -> AlignedToken {
    match token.find('~') {
        Some(tilde) => {
            let word = &token[..tilde];
            let tail = token.rsplit('~').next().unwrap_or("");
            let index_list = tail.rsplit('.').next().unwrap_or("");
            let pos = parse_positions(index_list);
            if pos.is_none() {
                debug!(token, "unparseable alignment suffix, treating as unaligned");
            }
            AlignedToken::new(word, pos)
        }
        None => AlignedToken::unaligned(token),
    }
}

/// Parse `4` or `4,12` into a single ordering position
fn parse_positions(list: &str) -> Option<i64> {
    if list.is_empty() {
        return None;
    }
    let mut sum: i64 = 0;
    let mut count: i64 = 0;
    for part in list.split(',') {
        sum += part.parse::<i64>().ok()?;
        count += 1;
    }
    if count == 1 {
        Some(sum)
    } else {
        // Round half away from zero; indices are non-negative in practice
        Some((sum as f64 / count as f64).round() as i64)
    }
}

/// Strip a trailing sense suffix such as `-01`
///
/// Only fires when the word has exactly one hyphen and one or two digits in
/// total: `use-01` becomes `use`, but date-like tokens (`28-10`,
/// `08-09-2016`) are left alone.
pub fn strip_sense_suffix(word: &str) -> &str {
    let digits = word.chars().filter(|c| c.is_ascii_digit()).count();
    if word.matches('-').count() == 1 && (1..=2).contains(&digits) {
        word.split('-').next().unwrap_or(word)
    } else {
        word
    }
}

/// Summarize one `:relation (...)` chunk as aligned tokens
///
/// Returns `None` when the chunk has bracket structure but no extractable
/// concepts at all — the caller treats that as a structural ambiguity and
/// leaves the whole sibling level untouched.
pub fn chunk_tokens(chunk: &str) -> Option<Vec<AlignedToken>> {
    if !chunk.contains('(') {
        // Flat chunk: `:op1 "value"~e.3` or a bare attribute
        if chunk.contains('~') {
            if let Some(second) = chunk.split_whitespace().nth(1) {
                return Some(vec![split_alignment(second)]);
            }
        }
        return Some(vec![AlignedToken::new("none-found", Some(0))]);
    }

    let mut out = Vec::new();
    for piece in chunk.split('(').skip(1) {
        if piece.is_empty() {
            continue;
        }
        let first = match piece.trim().split_whitespace().next() {
            Some(t) => t.replace(')', ""),
            None => continue,
        };
        if first == "name" {
            // Name nodes interleave with sentence order token by token
            let cut = piece.split(')').next().unwrap_or(piece);
            out.extend(name_parts(cut));
        } else {
            let token = split_alignment(&first);
            let word = strip_sense_suffix(&token.word).to_string();
            out.push(AlignedToken::new(word, token.pos));
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Extract the quoted sub-parts of a `:name` node as independent pairs
///
/// `name :op1 "New"~e.1 "York"~e.2` yields two tokens. An alignment binds to
/// a part only when it directly follows the closing quote, so an aligned
/// relation like `:op1~e.4 "Algeria"~e.2` does not confuse the scan.
pub fn name_parts(text: &str) -> Vec<AlignedToken> {
    if text.contains('"') {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut word = String::new();
        let mut in_quotes = false;
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if ch == '"' {
                in_quotes = !in_quotes;
                if !in_quotes {
                    // Quote just closed: an immediate `~e.<list>` belongs to it
                    let (pos, consumed) = alignment_after(&chars[i + 1..]);
                    out.push(AlignedToken::new(std::mem::take(&mut word), pos));
                    i += consumed;
                }
            } else if in_quotes {
                word.push(ch);
            }
            i += 1;
        }
        out
    } else if !text.contains(":op") {
        vec![AlignedToken::unaligned("")]
    } else {
        // Unquoted op value: `name :op1 Algeria~e.2`
        match text.split_whitespace().nth(2) {
            Some(value) => vec![split_alignment(value)],
            None => {
                debug!(text, "strange name construction, ignoring");
                vec![AlignedToken::unaligned("")]
            }
        }
    }
}

/// Parse a `~e.<idx>[,<idx>...]` run at the start of `rest`
///
/// Returns the merged position and how many characters the run occupied.
fn alignment_after(rest: &[char]) -> (Option<i64>, usize) {
    if rest.first() != Some(&'~') {
        return (None, 0);
    }
    let mut end = 1;
    while end < rest.len() {
        let c = rest[end];
        if c.is_ascii_digit() || c == '.' || c == ',' || c.is_ascii_alphabetic() {
            end += 1;
        } else {
            break;
        }
    }
    let run: String = rest[1..end].iter().collect();
    let index_list = run.rsplit('.').next().unwrap_or("");
    (parse_positions(index_list), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── split_alignment ────────────────────────────────

    #[test]
    fn test_split_single_index() {
        assert_eq!(
            split_alignment("opium~e.0"),
            AlignedToken::new("opium", Some(0))
        );
        assert_eq!(
            split_alignment("house~e.16"),
            AlignedToken::new("house", Some(16))
        );
    }

    #[test]
    fn test_split_multi_index_takes_mean() {
        // 4 and 12 average to 8
        assert_eq!(
            split_alignment("house~e.4,12"),
            AlignedToken::new("house", Some(8))
        );
        // 1 and 2 average to 1.5, rounded away from zero
        assert_eq!(split_alignment("x~e.1,2"), AlignedToken::new("x", Some(2)));
    }

    #[test]
    fn test_split_no_alignment() {
        assert_eq!(split_alignment("opium"), AlignedToken::new("opium", None));
    }

    #[test]
    fn test_split_malformed_alignment_is_unaligned() {
        assert_eq!(split_alignment("x~e."), AlignedToken::new("x", None));
        assert_eq!(split_alignment("x~e.ab"), AlignedToken::new("x", None));
        assert_eq!(split_alignment("x~e.1,,2"), AlignedToken::new("x", None));
    }

    // ── strip_sense_suffix ─────────────────────────────

    #[test]
    fn test_strip_sense_suffix() {
        assert_eq!(strip_sense_suffix("use-01"), "use");
        assert_eq!(strip_sense_suffix("break-1"), "break");
    }

    #[test]
    fn test_sense_suffix_keeps_dates() {
        // Two hyphens
        assert_eq!(strip_sense_suffix("08-09-2016"), "08-09-2016");
        // Four digits
        assert_eq!(strip_sense_suffix("28-10"), "28-10");
        // No digits
        assert_eq!(strip_sense_suffix("ARG1-of"), "ARG1-of");
    }

    // ── chunk_tokens ───────────────────────────────────

    #[test]
    fn test_chunk_tokens_simple() {
        let tokens = chunk_tokens(":mod (raw~e.3)").unwrap();
        assert_eq!(tokens, vec![AlignedToken::new("raw", Some(3))]);
    }

    #[test]
    fn test_chunk_tokens_nested() {
        let tokens = chunk_tokens(
            ":ARG1-of (use-01~e.5 :ARG2 (make-01~e.7 :ARG1 (heroin~e.8) :ARG2 (opium~e.0)))",
        )
        .unwrap();
        assert_eq!(
            tokens,
            vec![
                AlignedToken::new("use", Some(5)),
                AlignedToken::new("make", Some(7)),
                AlignedToken::new("heroin", Some(8)),
                AlignedToken::new("opium", Some(0)),
            ]
        );
    }

    #[test]
    fn test_chunk_tokens_relation_alignment_ignored() {
        // The relation's own alignment does not describe a concept
        let tokens = chunk_tokens(":domain~e.1 (opium~e.0)").unwrap();
        assert_eq!(tokens, vec![AlignedToken::new("opium", Some(0))]);
    }

    #[test]
    fn test_chunk_tokens_flat_aligned() {
        let tokens = chunk_tokens(":op1 \"Algeria\"~e.2").unwrap();
        assert_eq!(tokens, vec![AlignedToken::new("\"Algeria\"", Some(2))]);
    }

    #[test]
    fn test_chunk_tokens_flat_unaligned_sentinel() {
        let tokens = chunk_tokens(":polarity -").unwrap();
        assert_eq!(tokens, vec![AlignedToken::new("none-found", Some(0))]);
    }

    #[test]
    fn test_chunk_tokens_name_node() {
        let tokens = chunk_tokens(":name (name :op1 \"New\"~e.1 \"York\"~e.2)").unwrap();
        assert_eq!(
            tokens,
            vec![
                AlignedToken::new("New", Some(1)),
                AlignedToken::new("York", Some(2)),
            ]
        );
    }

    // ── name_parts ─────────────────────────────────────

    #[test]
    fn test_name_parts_aligned_relation_skipped() {
        // The ~e.4 on the relation must not bind to "Algeria"
        let parts = name_parts("name :op1~e.4 \"Algeria\"~e.2");
        assert_eq!(parts, vec![AlignedToken::new("Algeria", Some(2))]);
    }

    #[test]
    fn test_name_parts_unaligned_quote() {
        let parts = name_parts("name :op1 \"Bob\"");
        assert_eq!(parts, vec![AlignedToken::new("Bob", None)]);
    }

    #[test]
    fn test_name_parts_unquoted_op() {
        let parts = name_parts("name :op1 Algeria~e.2");
        assert_eq!(parts, vec![AlignedToken::new("Algeria", Some(2))]);
    }

    #[test]
    fn test_name_parts_no_ops() {
        let parts = name_parts("name");
        assert_eq!(parts, vec![AlignedToken::new("", None)]);
    }

    #[test]
    fn test_name_parts_multi_index() {
        let parts = name_parts("name :op1 \"Amsterdam\"~e.4,12");
        assert_eq!(parts, vec![AlignedToken::new("Amsterdam", Some(8))]);
    }
}
