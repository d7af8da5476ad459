//! amrorder-core — canonical word ordering for variable-free AMRs
//!
//! Rewrites an aligned, variable-free AMR expression into a single-line
//! canonical form whose sibling order best matches the source sentence's
//! word order, and prunes duplicated substructure left behind by imperfect
//! upstream generation.
//!
//! # Architecture
//!
//! ```text
//! Raw AMR → Pre-pass → single-line, variable-free, aligned AMR
//!                           ↓
//!                        Walker → per-level chunking, alignment summary,
//!                           ↓      adjacent-swap reorder OR duplicate prune
//!                        Line fixer → balanced, alignment-free canonical line
//! ```
//!
//! # Guarantees
//!
//! - **Total**: every input line produces exactly one output line — malformed
//!   structure is repaired or passed through, never fatal
//! - **Balanced**: output parenthesis counts always match
//! - **Deterministic**: with a fixed seed, same input always produces
//!   identical output
//! - **Bounded**: sibling levels wider than the cutoff are bucketed before
//!   the quadratic swap pass

pub mod align;
pub mod chunk;
pub mod distance;
pub mod error;
pub mod line;
pub mod prepass;
pub mod walk;

pub use error::{Error, Result};
pub use walk::{WalkStats, Walker};

/// Which surgery the walker performs at each sibling level
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Reorder siblings toward sentence word order
    Order,
    /// Drop duplicated sibling and global substructure
    Prune,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub mode: Mode,
    /// Maximum siblings processed individually before bucketing the rest
    pub cutoff: usize,
    /// Fixed RNG seed for reproducible bucketing
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Order,
            cutoff: 15,
            seed: None,
        }
    }
}

/// Canonicalize one AMR line
///
/// Convenience wrapper that builds a fresh [`Walker`] per call; batch
/// callers should construct one walker per corpus and reuse it (one walker
/// must never process two AMRs concurrently — its duplicate registry is
/// exclusive to a single walk).
///
/// # Errors
/// Only configuration problems are errors; per-line trouble is repaired.
pub fn canonicalize(input: &str, config: &Config) -> Result<String> {
    Ok(Walker::new(config)?.process(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIGNED_RAW: &str = "# ::tok Opium is the raw material used to make heroin .\n\
        (m / material~e.4\n\
        \t:mod (r / raw~e.3)\n\
        \t:domain~e.1 (o / opium~e.0)\n\
        \t:ARG1-of (u / use-01~e.5\n\
        \t\t:ARG2 (m2 / make-01~e.7\n\
        \t\t\t:ARG1 (h / heroin~e.8)\n\
        \t\t\t:ARG2 o)))";

    fn order_config() -> Config {
        Config {
            seed: Some(0),
            ..Config::default()
        }
    }

    // ── Full pipeline: pre-pass + reorder ──────────────

    #[test]
    fn test_reorder_matches_sentence_order() {
        let (amrs, sents) = prepass::var_free_lines(ALIGNED_RAW, false);
        assert_eq!(sents, vec!["Opium is the raw material used to make heroin ."]);
        assert_eq!(amrs.len(), 1);

        let out = canonicalize(&amrs[0], &order_config()).unwrap();
        assert_eq!(
            out,
            "(material :domain (opium) :mod (raw) :ARG1-of (use-01 :ARG2 (make-01 :ARG2 (opium) :ARG1 (heroin))))"
        );
    }

    #[test]
    fn test_prune_removes_duplicated_siblings() {
        let input = "(e / establish-01 :ARG1 (m / model :mod (i / innovate-01 :ARG1 (i2 / industry) :ARG1 (i3 / industry) :ARG1 (i4 / industry))))";
        let config = Config {
            mode: Mode::Prune,
            ..Config::default()
        };
        let out = canonicalize(input, &config).unwrap();
        assert_eq!(
            out,
            "(establish-01 :ARG1 (model :mod (innovate-01 :ARG1 (industry))))"
        );
    }

    #[test]
    fn test_missing_closer_still_balanced() {
        let truncated = "(material~e.4 :mod (raw~e.3) :domain~e.1 (opium~e.0";
        let out = canonicalize(truncated, &order_config()).unwrap();
        assert_eq!(out.matches('(').count(), out.matches(')').count());
        assert!(out.starts_with("(material"));
    }

    #[test]
    fn test_output_balanced_for_assorted_inputs() {
        let inputs = [
            "(a~e.0)",
            "(a~e.1 :mod (b~e.0))",
            "(a :op1 \"x :)\" :mod (b~e.2) :domain (c~e.0))",
            "(x :time \"08:30\" :mod (y~e.1) :ARG0 (z~e.0))",
            "(broken~e.0 :ARG1 (one~e.2 :ARG2 (two~e.1",
        ];
        for input in inputs {
            let out = canonicalize(input, &order_config()).unwrap();
            assert_eq!(
                out.matches('(').count(),
                out.matches(')').count(),
                "unbalanced output for {:?}: {:?}",
                input,
                out
            );
        }
    }

    // ── Determinism ────────────────────────────────────

    #[test]
    fn test_determinism_100_iterations() {
        let (amrs, _) = prepass::var_free_lines(ALIGNED_RAW, false);
        let first = canonicalize(&amrs[0], &order_config()).unwrap();
        for i in 0..100 {
            let result = canonicalize(&amrs[0], &order_config()).unwrap();
            assert_eq!(first, result, "Non-determinism at iteration {}", i);
        }
    }

    // ── Config ─────────────────────────────────────────

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Order);
        assert_eq!(config.cutoff, 15);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config {
            mode: Mode::Prune,
            cutoff: 10,
            seed: Some(3),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"prune\""));
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_bad_cutoff_is_config_error() {
        let config = Config {
            cutoff: 0,
            ..Config::default()
        };
        assert!(canonicalize("(a :b (c) :d (e))", &config).is_err());
    }
}
