// Word-form generation: breadth-first closure over conditional rewrites.
//
// The queue is seeded with every stem. Dequeuing a word inserts its
// output-converted surface into the result set and applies every rule
// group its flags resolve to; each successful application enqueues a
// derived word. Cross-product groups additionally combine with an
// opposite-kind group of the same word in the same step.

use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::affix::{AffixConfig, AffixGroup, AffixKind};
use crate::dictionary::{Stem, apply_conversion};

/// Bounds on the derivation closure.
///
/// An affix file with circular continuation flags would otherwise loop;
/// the depth limit and the visited-entry guard keep the traversal finite.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Maximum number of derivation steps from a dictionary stem.
    pub max_depth: usize,
}

impl Default for GenerateOptions {
    fn default() -> GenerateOptions {
        GenerateOptions { max_depth: 16 }
    }
}

struct QueueItem {
    stem: Stem,
    depth: usize,
}

/// Compute the closure of surface forms reachable from `stems` under the
/// rule groups in `config`.
///
/// Output conversion is applied exactly once per word, as it enters the
/// result set; derivation itself operates on the raw surface text. A flag
/// that resolves to no group is inert.
pub fn generate(
    config: &AffixConfig,
    stems: Vec<Stem>,
    options: &GenerateOptions,
) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut visited: HashSet<(String, Vec<String>)> = HashSet::new();
    let mut queue: VecDeque<QueueItem> = stems
        .into_iter()
        .map(|stem| QueueItem { stem, depth: 0 })
        .collect();

    while let Some(QueueItem { stem, depth }) = queue.pop_front() {
        out.insert(apply_conversion(&stem.word, &config.oconv));
        if depth >= options.max_depth {
            continue;
        }

        for (position, flag) in stem.flags.iter().enumerate() {
            let Some(group) = config.groups.get(flag) else {
                continue;
            };
            for derived in apply_group(&stem, group, config) {
                if group.cross_product {
                    // Same-step prefix+suffix combination. Only the flags
                    // from the current position onward are scanned; the
                    // opposite-kind check keeps Prefix+Prefix and
                    // Suffix+Suffix pairs out.
                    for other_flag in &stem.flags[position..] {
                        let Some(other) = config.groups.get(other_flag) else {
                            continue;
                        };
                        if other.cross_product && other.kind != group.kind {
                            for combined in apply_group(&derived, other, config) {
                                enqueue(&mut queue, &mut visited, combined, depth + 1);
                            }
                        }
                    }
                }
                enqueue(&mut queue, &mut visited, derived, depth + 1);
            }
        }
    }

    log::debug!("generated {} distinct surface forms", out.len());
    out
}

/// Apply every rule of a group to a word, in declared order. A rule whose
/// condition does not match, or whose stripping does not literally match
/// the relevant end of the word, is skipped without error.
fn apply_group(word: &Stem, group: &AffixGroup, config: &AffixConfig) -> Vec<Stem> {
    let mut derived = Vec::new();
    for rule in &group.rules {
        if !rule.condition.is_match(&word.word) {
            continue;
        }
        let text = match group.kind {
            AffixKind::Suffix => {
                if !word.word.ends_with(&rule.stripping) {
                    continue;
                }
                let keep = word.word.len() - rule.stripping.len();
                format!("{}{}", &word.word[..keep], rule.affix)
            }
            AffixKind::Prefix => {
                if !word.word.starts_with(&rule.stripping) {
                    continue;
                }
                format!("{}{}", rule.affix, &word.word[rule.stripping.len()..])
            }
        };

        // The derived word owns its own field map, seeded from the parent,
        // then extended with the rule's key:value tags.
        let mut morph = word.morph.clone();
        for tag in &rule.morphological_fields {
            if let Some((key, value)) = tag.split_once(':') {
                morph
                    .entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }

        derived.push(Stem {
            word: text,
            flags: rule
                .continuation
                .as_deref()
                .map(|flags| config.flag_mode.split(flags))
                .unwrap_or_default(),
            morph,
        });
    }
    derived
}

// The key keeps the surface and the flags apart; joining them into one
// string would let a surface containing a literal '/' alias a different
// word+flags pair and suppress it.
fn enqueue(
    queue: &mut VecDeque<QueueItem>,
    visited: &mut HashSet<(String, Vec<String>)>,
    stem: Stem,
    depth: usize,
) {
    if visited.insert((stem.word.clone(), stem.flags.clone())) {
        queue.push_back(QueueItem { stem, depth });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::AffixConfig;
    use crate::dictionary;

    fn word_set(affix: &str, dic: &str) -> HashSet<String> {
        let config = AffixConfig::parse_bytes(affix.as_bytes()).unwrap();
        let stems = dictionary::parse_bytes(dic.as_bytes(), &config);
        generate(&config, stems, &GenerateOptions::default())
    }

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn cross_product_prefix_and_suffix() {
        let out = word_set(
            "SFX A Y 1\nSFX A 0 s .\nPFX B Y 1\nPFX B 0 un .\n",
            "do/AB\n",
        );
        assert_eq!(out, set(&["do", "dos", "undo", "undos"]));
    }

    #[test]
    fn suffix_condition_is_anchored_at_the_end() {
        let out = word_set("SFX A Y 1\nSFX A 0 s [^s]\n", "cat/A\nbus/A\n");
        assert_eq!(out, set(&["cat", "cats", "bus"]));
    }

    #[test]
    fn suffix_stripping_must_match_the_end() {
        let out = word_set("SFX A Y 1\nSFX A y ies .\n", "fly/A\ncat/A\n");
        assert_eq!(out, set(&["fly", "flies", "cat"]));
    }

    #[test]
    fn prefix_stripping_matches_the_start() {
        let out = word_set("PFX B Y 1\nPFX B re un .\n", "redo/B\nmake/B\n");
        assert_eq!(out, set(&["redo", "undo", "make"]));
    }

    #[test]
    fn noop_rule_is_content_idempotent() {
        let out = word_set("SFX Z Y 1\nSFX Z 0 0 .\n", "same/Z\n");
        assert_eq!(out, set(&["same"]));
    }

    #[test]
    fn continuation_flags_enable_a_second_step() {
        // "un" carries flag A, so the prefixed word can still take the
        // suffix; the bare suffix derivation carries no flags and stops.
        let out = word_set(
            "PFX B Y 1\nPFX B 0 un/A .\nSFX A Y 1\nSFX A 0 ed .\n",
            "lock/B\n",
        );
        assert!(out.contains("lock"));
        assert!(out.contains("unlock"));
        assert!(out.contains("unlocked"));
    }

    #[test]
    fn suffix_rules_have_no_continuation_channel() {
        // A slash in a suffix affix cell is literal text, not flags.
        let out = word_set("SFX A Y 1\nSFX A 0 x/B .\nSFX B Y 1\nSFX B 0 y .\n", "w/A\n");
        assert_eq!(out, set(&["w", "wx/B"]));
    }

    #[test]
    fn no_cross_product_between_same_kinds() {
        let out = word_set(
            "SFX A Y 1\nSFX A 0 s .\nSFX C Y 1\nSFX C 0 t .\n",
            "go/AC\n",
        );
        // Both suffixes apply separately, never stacked.
        assert_eq!(out, set(&["go", "gos", "got"]));
    }

    #[test]
    fn cross_product_requires_both_groups_enabled() {
        let out = word_set(
            "SFX A N 1\nSFX A 0 s .\nPFX B Y 1\nPFX B 0 un .\n",
            "do/AB\n",
        );
        assert_eq!(out, set(&["do", "dos", "undo"]));
    }

    #[test]
    fn cross_product_combination_initiates_from_the_earlier_flag() {
        // The scan covers flags from the current position onward only, so
        // a pair always combines exactly once, driven by whichever flag
        // comes first on the stem.
        let affix = "SFX A Y 1\nSFX A 0 s .\nPFX B Y 1\nPFX B 0 un .\n";
        let forward = word_set(affix, "do/BA\n");
        assert!(forward.contains("undos"));
        let reverse = word_set(affix, "do/AB\n");
        assert!(reverse.contains("undos"));
    }

    #[test]
    fn unknown_flags_are_inert() {
        let out = word_set("SFX A Y 1\nSFX A 0 s .\n", "word/AQ\n");
        assert_eq!(out, set(&["word", "words"]));
    }

    #[test]
    fn output_conversion_applies_once_per_form() {
        let out = word_set(
            "OCONV 1\nOCONV o 0\nSFX A Y 1\nSFX A 0 s .\n",
            "oo/A\n",
        );
        assert_eq!(out, set(&["00", "00s"]));
    }

    #[test]
    fn derivation_happens_on_raw_text_not_converted_text() {
        // OCONV rewrites the surface only on output; the suffix condition
        // sees the raw text.
        let out = word_set(
            "OCONV 1\nOCONV t x\nSFX A Y 1\nSFX A 0 s t\n",
            "cat/A\n",
        );
        assert_eq!(out, set(&["cax", "caxs"]));
    }

    #[test]
    fn circular_continuation_flags_terminate() {
        let config = AffixConfig::parse_bytes(b"PFX A Y 1\nPFX A 0 x/A .\n").unwrap();
        let stems = dictionary::parse_bytes(b"w/A\n", &config);
        let out = generate(&config, stems, &GenerateOptions { max_depth: 4 });
        // w, xw, xxw, xxxw, xxxxw -- expansion stops at the depth bound.
        assert_eq!(out.len(), 5);
        assert!(out.contains("xxxxw"));
        assert!(!out.contains("xxxxxw"));
    }

    #[test]
    fn surfaces_with_literal_slashes_do_not_alias_flagged_entries() {
        // One path derives the surface "qx" carrying flag B, another the
        // literal surface "qx/B" with no flags. They are distinct queue
        // entries; both must reach the output.
        let out = word_set(
            "PFX C Y 1\nPFX C 0 q/B .\nSFX D Y 1\nSFX D 0 /B .\nSFX B Y 1\nSFX B 0 s .\n",
            "x/C\nqx/D\n",
        );
        assert!(out.contains("qx/B"));
        assert!(out.contains("qxs"));
    }

    #[test]
    fn duplicate_derivation_paths_do_not_duplicate_entries() {
        let out = word_set("SFX A Y 2\nSFX A 0 s .\nSFX A 0 s .\n", "cat/A\ncat/A\n");
        assert_eq!(out, set(&["cat", "cats"]));
    }

    #[test]
    fn morphological_fields_are_inherited_and_extended() {
        let config =
            AffixConfig::parse_bytes(b"SFX A Y 1\nSFX A 0 s . is:plur\n").unwrap();
        let stems = dictionary::parse_bytes(b"cat/A po:noun\n", &config);
        let parent = stems[0].clone();
        let children = super::apply_group(&parent, &config.groups["A"], &config);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].morph["po"], vec!["noun"]);
        assert_eq!(children[0].morph["is"], vec!["plur"]);
        // The parent map is untouched.
        assert!(!parent.morph.contains_key("is"));
    }

    #[test]
    fn rules_inside_a_group_apply_in_declared_order() {
        let config =
            AffixConfig::parse_bytes(b"SFX A Y 2\nSFX A 0 er .\nSFX A 0 est .\n").unwrap();
        let stems = dictionary::parse_bytes(b"tall/A\n", &config);
        let children = super::apply_group(&stems[0], &config.groups["A"], &config);
        assert_eq!(children[0].word, "taller");
        assert_eq!(children[1].word, "tallest");
    }
}
