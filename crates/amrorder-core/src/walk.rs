//! Recursive walk — reorders or prunes each sibling level of an AMR
//!
//! One `Walker` processes one AMR line at a time. At every node it splits
//! the body into top-level chunks, buckets overflow past the cutoff,
//! summarizes each chunk's alignments, applies the mode's level pass
//! (adjacent-swap reordering or duplicate pruning), then recurses into each
//! chunk. Reassembly is string-exact: the kept head plus the processed
//! children, re-balanced at every boundary.
//!
//! # Guarantees
//!
//! - Every input line produces exactly one output line
//! - Output parens are balanced even for malformed input
//! - With a fixed seed, output is fully deterministic
//! - The duplicate registry never outlives a single AMR's walk

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::warn;

use crate::align::{self, AlignedToken};
use crate::distance;
use crate::{chunk, line, prepass};
use crate::{Config, Mode, Result};

/// Aggregate diagnostic counters for one or more processed lines
///
/// Nothing here is fatal; the counters exist so an operator can see how
/// often the engine had to fall back or repair on a large corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WalkStats {
    /// Nodes whose chunk and summary counts diverged (level passed through)
    pub structural_ambiguity: u64,
    /// Sibling levels whose tail was collapsed into one bucket
    pub bucketed: u64,
    /// Chunks discarded as duplicates (prune mode)
    pub dropped_duplicates: u64,
}

/// The permutation-and-pruning engine
pub struct Walker {
    mode: Mode,
    cutoff: usize,
    rng: StdRng,
    /// Occurrence count per exact chunk text, spanning the whole walk
    seen: HashMap<String, u32>,
    stats: WalkStats,
}

impl Walker {
    /// Build a walker from a configuration
    ///
    /// # Errors
    /// Returns `Error::Config` for a cutoff below 2 — the bucketing step
    /// keeps `cutoff - 1` chunks, which is meaningless below that.
    pub fn new(config: &Config) -> Result<Self> {
        if config.cutoff < 2 {
            return Err(crate::Error::Config(format!(
                "cutoff must be at least 2, got {}",
                config.cutoff
            )));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Walker {
            mode: config.mode,
            cutoff: config.cutoff,
            rng,
            seen: HashMap::new(),
            stats: WalkStats::default(),
        })
    }

    /// Diagnostic counters accumulated so far
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Canonicalize one AMR line
    ///
    /// The line must be variable free and on a single line; `Prune` mode
    /// defensively deletes any leftover variable heads itself. Lines with at
    /// most one relation have nothing to optimize and pass through with
    /// their alignments stripped.
    pub fn process(&mut self, input: &str) -> String {
        // The registry is exclusive to one AMR's walk
        self.seen.clear();

        let input = match self.mode {
            Mode::Order => input.trim().to_string(),
            Mode::Prune => prepass::strip_inline_variables(input.trim()),
        };

        if input.matches(':').count() <= 1 {
            return line::normalize_whitespace(&line::strip_alignment(&input));
        }

        let walked = self.walk(&input, 1);
        let fixed = line::finalize(&walked);
        match self.mode {
            Mode::Order => fixed,
            Mode::Prune => line::normalize_whitespace(&fixed),
        }
    }

    /// Process one node and everything below it
    ///
    /// `part` starts with the node's structural character: `(` at level 1,
    /// `:` at every level below.
    fn walk(&mut self, part: &str, level: u32) -> String {
        let inner: &str = part.get(1..).unwrap_or("");

        if !change_possible(inner) {
            return part.to_string();
        }

        let pieces = chunk::filter_colons(inner);
        let (head, rest) = chunk::head_and_rest(&pieces, level);
        let mut chunks = chunk::split_chunks(&rest);

        if chunks.len() > self.cutoff {
            chunks = self.bucket_overflow(chunks);
        }

        let summaries: Vec<Option<Vec<AlignedToken>>> =
            chunks.iter().map(|c| align::chunk_tokens(c)).collect();

        if summaries.iter().any(|s| s.is_none()) {
            // Chunk and summary counts diverge: leave this level untouched
            warn!(level, head = head.as_str(), "ambiguous node structure, level passed through");
            self.stats.structural_ambiguity += 1;
        } else {
            let mut summaries: Vec<Vec<AlignedToken>> =
                summaries.into_iter().map(|s| s.unwrap()).collect();
            match self.mode {
                Mode::Order => reorder_level(&mut chunks, &mut summaries),
                Mode::Prune => chunks = self.prune_level(chunks),
            }
        }

        let mut out = String::new();
        if level == 1 {
            out.push('(');
        }
        out.push_str(&head);
        for child in &chunks {
            out.push_str(&line::balance(&self.walk(child, level + 1)));
        }
        out
    }

    /// Shuffle and collapse the tail past the cutoff into one chunk
    ///
    /// Bounds the quadratic swap pass at the cost of losing fine-grained
    /// order inside the bucket.
    fn bucket_overflow(&mut self, mut chunks: Vec<String>) -> Vec<String> {
        self.stats.bucketed += 1;
        chunks.shuffle(&mut self.rng);
        let tail = chunks.split_off(self.cutoff - 1);
        chunks.push(tail.join(" "));
        chunks
    }

    /// Drop duplicate chunks at one sibling level
    ///
    /// A chunk equal to one already kept under this parent is dropped
    /// without touching the registry. Otherwise the chunk survives only if
    /// the registry has seen it fewer than twice anywhere in this AMR; the
    /// registry count is bumped either way.
    fn prune_level(&mut self, chunks: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::new();
        for chunk_text in chunks {
            if kept.contains(&chunk_text) {
                self.stats.dropped_duplicates += 1;
                continue;
            }
            let count = self.seen.get(&chunk_text).copied().unwrap_or(0);
            if count < 2 {
                kept.push(chunk_text.clone());
            } else {
                self.stats.dropped_duplicates += 1;
            }
            *self.seen.entry(chunk_text).or_insert(0) += 1;
        }
        kept
    }
}

/// Repeated adjacent-swap passes until a full pass changes nothing
///
/// One pass per chunk, bubble style. This is a bounded local heuristic, not
/// an optimal ordering: downstream consumers are tuned against exactly this
/// pass structure.
fn reorder_level(chunks: &mut [String], summaries: &mut [Vec<AlignedToken>]) {
    let n = chunks.len();
    for _ in 0..n {
        for idx in 0..n.saturating_sub(1) {
            if distance::should_swap(&summaries[idx], &summaries[idx + 1]) {
                chunks.swap(idx, idx + 1);
                summaries.swap(idx, idx + 1);
            }
        }
    }
}

/// Is there anything at this node to reorder or prune?
///
/// No relation marker means a leaf; a single colon belonging to a URL
/// scheme is not a relation either.
fn change_possible(text: &str) -> bool {
    let colons = text.matches(':').count();
    if colons == 0 {
        return false;
    }
    if colons == 1 && (text.contains("http:") || text.contains("https:")) {
        return false;
    }
    true
}
