//! Bracket tokenizer — splits a node body into top-level `:relation` chunks
//!
//! The scan is character based with two pieces of state: quote parity
//! (inside `"..."` nothing is structural) and parenthesis depth. A `:`
//! starts a new chunk only at depth 0; a `)` that returns the depth to 0
//! emits the accumulated chunk.
//!
//! Colons that are not relation starts — clock times (`08:30`), URLs
//! (`http://...`) — are neutralized up front by [`filter_colons`], which
//! re-merges any split piece that does not begin with a letter into the
//! piece before it.

/// Split on `:` and re-merge pieces that cannot start a relation
///
/// Joining the result back with `:` reproduces the input exactly; the value
/// of the operation is that piece boundaries are now guaranteed to sit on
/// genuine relation colons.
pub fn filter_colons(text: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for (idx, piece) in text.split(':').enumerate() {
        let starts_relation = piece.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false);
        if idx == 0 {
            parts.push(piece.to_string());
        } else if starts_relation {
            parts.push(piece.to_string());
        } else if let Some(last) = parts.last_mut() {
            // Not a relation start: restore the colon onto the previous piece
            last.push(':');
            last.push_str(piece);
        }
    }
    parts
}

/// Split the filtered pieces into the kept head and the searchable rest
///
/// At level 1 the head is the bare concept (`material~e.4 `); below that it
/// keeps its leading `:` (`:ARG1-of (use-01~e.5 `).
pub fn head_and_rest(parts: &[String], level: u32) -> (String, String) {
    let first = parts.first().map(String::as_str).unwrap_or("");
    let head = if level > 1 {
        format!(":{}", first)
    } else {
        first.to_string()
    };
    let rest = format!(":{}", parts[1..].join(":"));
    (head, rest)
}

/// Split a node body into its top-level `:relation ...` chunks
pub fn split_chunks(search: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut depth: i32 = 0;
    let mut adding = false;
    let mut in_quotes = false;

    for ch in search.chars() {
        if ch == '(' && !in_quotes {
            if adding {
                buf.push(ch);
            }
            depth += 1;
        } else if ch == ':' && !in_quotes {
            adding = true;
            buf.push(ch);
        } else if ch == ')' && !in_quotes {
            depth -= 1;
            if adding {
                buf.push(ch);
            }
            if depth == 0 {
                chunks.push(buf.trim().to_string());
                buf.clear();
            }
        } else if adding {
            buf.push(ch);
        }
        if ch == '"' {
            in_quotes = !in_quotes;
        }
    }

    // Unbalanced leftovers still holding a relation are kept, minus their
    // stray closing parens; then every chunk is topped back up to balance
    if !buf.is_empty() && buf.contains(':') {
        chunks.push(strip_char_outside_quotes(&buf, ')').trim().to_string());
        for chunk in chunks.iter_mut() {
            while chunk.matches(')').count() < chunk.matches('(').count() {
                chunk.push(')');
            }
        }
    }

    // Entirely flat attribute runs (`:op1 "a" :op2 "b" :op3 "c"`) are not
    // separable by parens; re-split one relation at a time
    for chunk in &chunks {
        if !has_bracket_outside_quotes(chunk) && chunk.matches(':').count() > 2 {
            return chunk
                .split(':')
                .skip(1)
                .map(|piece| format!(":{}", piece.trim()))
                .collect();
        }
    }

    chunks
}

/// True when the string has a paren that is not inside quotes
pub fn has_bracket_outside_quotes(text: &str) -> bool {
    let mut in_quotes = false;
    for ch in text.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if (ch == '(' || ch == ')') && !in_quotes {
            return true;
        }
    }
    false
}

/// Remove every occurrence of `target` that sits outside quotes
pub fn strip_char_outside_quotes(text: &str, target: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    for ch in text.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            out.push(ch);
        } else if ch == target && !in_quotes {
            continue;
        } else {
            out.push(ch);
        }
    }
    out
}
