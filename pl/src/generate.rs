//! Prompt generation
//!
//! Templates carry `[SLOT]` markers. Expansion runs in passes: each pass
//! replaces the first remaining occurrence of every slot's marker with a fresh
//! random candidate. Passes repeat until one changes nothing, so repeated
//! markers get independent values and candidates may themselves contain
//! markers.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::debug;

use crate::canonical::ResolvedConfig;
use crate::dataset::SlotSet;
use crate::error::Result;

/// Upper bound on expansion passes; guards against self-referencing slots
pub const MAX_EXPANSION_PASSES: usize = 10;

/// One generated prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPrompt {
    pub category: String,
    pub prompt: String,
    /// Last value substituted for each slot
    pub slots: BTreeMap<String, String>,
}

/// Expand the `[NAME]` markers of `template` from `slots`
///
/// Returns the expanded text and the last value chosen per slot. Markers of
/// slots without candidates, or without a slot at all, are left in place.
pub fn expand_template<R: Rng + ?Sized>(
    template: &str,
    slots: &SlotSet,
    rng: &mut R,
) -> (String, BTreeMap<String, String>) {
    let mut result = template.to_string();
    let mut selected = BTreeMap::new();

    for pass in 0..MAX_EXPANSION_PASSES {
        let mut changed = false;
        for (name, candidates) in slots {
            let marker = format!("[{}]", name);
            if !result.contains(&marker) {
                continue;
            }
            let Some(value) = candidates.choose(rng) else {
                continue;
            };
            result = result.replacen(&marker, value, 1);
            selected.insert(name.clone(), value.clone());
            changed = true;
        }
        if !changed {
            debug!(%pass, "expand_template: settled");
            break;
        }
    }

    (result, selected)
}

/// Generate one prompt for a template category
pub fn generate<R: Rng + ?Sized>(config: &ResolvedConfig, category: &str, rng: &mut R) -> Result<GeneratedPrompt> {
    let template = config.template_for(category)?;
    let empty = SlotSet::new();
    let slotset = config.slots.get(category).unwrap_or(&empty);
    let (prompt, slots) = expand_template(template, slotset, rng);
    debug!(%category, slots = slots.len(), "generate: expanded template");

    Ok(GeneratedPrompt {
        category: category.to_string(),
        prompt,
        slots,
    })
}

/// Generate `count` prompts, drawing a random category per prompt unless one is given
pub fn generate_many<R: Rng + ?Sized>(
    config: &ResolvedConfig,
    category: Option<&str>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<GeneratedPrompt>> {
    debug!(?category, %count, "generate_many: called");
    if let Some(category) = category {
        return (0..count).map(|_| generate(config, category, rng)).collect();
    }

    let categories = config.categories();
    let mut prompts = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(category) = categories.choose(rng) else {
            debug!("generate_many: no templates available");
            break;
        };
        prompts.push(generate(config, category, rng)?);
    }
    Ok(prompts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CanonicalError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn slotset(entries: &[(&str, &[&str])]) -> SlotSet {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    fn config() -> ResolvedConfig {
        let mut config = ResolvedConfig::default();
        config.templates.insert("portrait".into(), "A [WHO] in [PLACE], [WHO] smiles".into());
        config.templates.insert("bare".into(), "No slots here".into());
        config.slots.insert(
            "portrait".into(),
            slotset(&[("WHO", &["dancer", "sailor"]), ("PLACE", &["Lisbon"])]),
        );
        config
    }

    #[test]
    fn test_generate_fills_every_marker() {
        let mut rng = StdRng::seed_from_u64(7);
        let prompt = generate(&config(), "portrait", &mut rng).unwrap();
        assert_eq!(prompt.category, "portrait");
        assert!(!prompt.prompt.contains('['));
        assert!(prompt.prompt.starts_with("A "));
        assert!(prompt.prompt.contains("in Lisbon, "));
        assert_eq!(prompt.slots["PLACE"], "Lisbon");
        assert!(["dancer", "sailor"].contains(&prompt.slots["WHO"].as_str()));
    }

    #[test]
    fn test_repeated_markers_draw_independently() {
        let slots = slotset(&[("W", &["a", "b", "c"])]);
        let template = "[W] [W] [W] [W] [W] [W] [W] [W]";

        let outputs: Vec<String> = (0..20)
            .map(|seed| expand_template(template, &slots, &mut StdRng::seed_from_u64(seed)).0)
            .collect();
        assert!(outputs.iter().all(|o| !o.contains('[')));
        assert!(
            outputs.iter().any(|o| o.split(' ').collect::<std::collections::HashSet<_>>().len() > 1),
            "every output used a single value: {:?}",
            outputs
        );
    }

    #[test]
    fn test_nested_markers_expand_regardless_of_slot_order() {
        // "B" sorts after "A", so the inner marker only appears after A's turn in the first pass
        let slots = slotset(&[("B", &["[A] light"]), ("A", &["soft"])]);
        let (prompt, selected) = expand_template("[B]", &slots, &mut StdRng::seed_from_u64(1));
        assert_eq!(prompt, "soft light");
        assert_eq!(selected["A"], "soft");
        assert_eq!(selected["B"], "[A] light");
    }

    #[test]
    fn test_self_referencing_slot_is_bounded() {
        let slots = slotset(&[("X", &["[X]+"])]);
        let (prompt, _) = expand_template("[X]", &slots, &mut StdRng::seed_from_u64(1));
        assert_eq!(prompt, format!("[X]{}", "+".repeat(MAX_EXPANSION_PASSES)));
    }

    #[test]
    fn test_unknown_marker_left_in_place() {
        let slots = slotset(&[("A", &["x"])]);
        let (prompt, _) = expand_template("[A]-[A]-[B]", &slots, &mut StdRng::seed_from_u64(1));
        assert_eq!(prompt, "x-x-[B]");
    }

    #[test]
    fn test_generate_without_slots() {
        let mut rng = StdRng::seed_from_u64(1);
        let prompt = generate(&config(), "bare", &mut rng).unwrap();
        assert_eq!(prompt.prompt, "No slots here");
        assert!(prompt.slots.is_empty());
    }

    #[test]
    fn test_empty_slot_leaves_marker() {
        let mut config = config();
        config.slots.get_mut("portrait").unwrap().insert("PLACE".into(), vec![]);
        let mut rng = StdRng::seed_from_u64(1);
        let prompt = generate(&config, "portrait", &mut rng).unwrap();
        assert!(prompt.prompt.contains("[PLACE]"));
        assert!(!prompt.slots.contains_key("PLACE"));
    }

    #[test]
    fn test_generate_unknown_category() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate(&config(), "nope", &mut rng).unwrap_err();
        assert!(matches!(err, CanonicalError::UnknownCategory { .. }));
    }

    #[test]
    fn test_generate_many_seeded_is_reproducible() {
        let config = config();
        let a = generate_many(&config, None, 10, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_many(&config, None, 10, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_many_fixed_category() {
        let prompts = generate_many(&config(), Some("bare"), 3, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p.category == "bare"));
    }

    #[test]
    fn test_generate_many_empty_config() {
        let prompts = generate_many(&ResolvedConfig::default(), None, 5, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(prompts.is_empty());
    }
}
