//! Deterministic parameter key generation.
//!
//! A key is `{sanitized-node-type}_{occurrence-index}_{sanitized-port}`.
//! The occurrence index counts nodes per sanitized node type within one
//! parse pass, starting at 1 in node-iteration order, so re-parsing
//! byte-identical content always yields identical keys, and each
//! (node, port) pair visited once keeps keys pairwise unique.

use std::collections::HashMap;

/// Trim, lowercase, collapse non-alphanumeric runs to one underscore, and
/// strip leading/trailing underscores.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

/// Per-type occurrence counter scoped to a single parse pass.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    occurrences: HashMap<String, u32>,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one node of `node_type`, returning its sanitized type slug
    /// and 1-based occurrence index.
    pub fn next_occurrence(&mut self, node_type: &str) -> (String, u32) {
        let slug = sanitize(node_type);
        let counter = self.occurrences.entry(slug.clone()).or_insert(0);
        *counter += 1;
        (slug, *counter)
    }
}

/// Assemble the final key from a type slug, occurrence index, and raw port.
pub fn param_key(type_slug: &str, occurrence: u32, port: &str) -> String {
    format!("{}_{}_{}", type_slug, occurrence, sanitize(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize("LoadImage"), "loadimage");
        assert_eq!(sanitize("KSampler"), "ksampler");
        assert_eq!(sanitize("image"), "image");
    }

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize("CLIP Text Encode"), "clip_text_encode");
        assert_eq!(sanitize("a--b__c"), "a_b_c");
        assert_eq!(sanitize("a ~!@# b"), "a_b");
    }

    #[test]
    fn test_sanitize_strips_edges() {
        assert_eq!(sanitize("  LoadImage  "), "loadimage");
        assert_eq!(sanitize("__image__"), "image");
        assert_eq!(sanitize("(mask)"), "mask");
    }

    #[test]
    fn test_sanitize_degenerate() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("!!!"), "");
    }

    #[test]
    fn test_occurrence_counts_per_type() {
        let mut alloc = KeyAllocator::new();
        assert_eq!(alloc.next_occurrence("LoadImage"), ("loadimage".into(), 1));
        assert_eq!(alloc.next_occurrence("KSampler"), ("ksampler".into(), 1));
        assert_eq!(alloc.next_occurrence("LoadImage"), ("loadimage".into(), 2));
        assert_eq!(alloc.next_occurrence("LoadImage"), ("loadimage".into(), 3));
        assert_eq!(alloc.next_occurrence("KSampler"), ("ksampler".into(), 2));
    }

    #[test]
    fn test_param_key_shape() {
        assert_eq!(param_key("loadimage", 1, "image"), "loadimage_1_image");
        assert_eq!(param_key("ksampler", 2, "CFG Scale"), "ksampler_2_cfg_scale");
    }

    #[test]
    fn test_determinism_across_passes() {
        let keys = |types: &[&str]| -> Vec<String> {
            let mut alloc = KeyAllocator::new();
            types
                .iter()
                .map(|t| {
                    let (slug, occ) = alloc.next_occurrence(t);
                    param_key(&slug, occ, "seed")
                })
                .collect()
        };
        let first = keys(&["A", "B", "A"]);
        let second = keys(&["A", "B", "A"]);
        assert_eq!(first, second);
        assert_eq!(first, vec!["a_1_seed", "b_1_seed", "a_2_seed"]);
    }
}
