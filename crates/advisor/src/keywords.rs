//! Personality keyword alignment
//!
//! Scores free text (strategy descriptions, candidate phrases) against a
//! personality: each table row ties a set of keywords to one trait, and a
//! hit adds `weight * (trait - 0.5) * 2`, so the adjustment is signed and
//! bounded by the row's weight.

use sim_model::Personality;

/// One keyword group bound to a trait.
pub struct TraitKeywords {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
    pub trait_value: fn(&Personality) -> f32,
    pub weight: f32,
}

pub const STRATEGY_TRAITS: &[TraitKeywords] = &[
    TraitKeywords {
        label: "extraversion",
        keywords: &["aggressive", "confront", "accus", "bold", "loud"],
        trait_value: |p| p.extraversion,
        weight: 0.2,
    },
    TraitKeywords {
        label: "agreeableness",
        keywords: &["alliance", "trust", "loyal", "friend", "bond"],
        trait_value: |p| p.agreeableness,
        weight: 0.2,
    },
    TraitKeywords {
        label: "conscientiousness",
        keywords: &["methodical", "evidence", "track", "careful", "analy"],
        trait_value: |p| p.conscientiousness,
        weight: 0.15,
    },
    TraitKeywords {
        label: "openness",
        keywords: &["creative", "misdirect", "unexpected", "novel", "theory"],
        trait_value: |p| p.openness,
        weight: 0.15,
    },
    TraitKeywords {
        label: "neuroticism",
        keywords: &["paranoid", "suspicio", "defensive", "cautious"],
        trait_value: |p| p.neuroticism,
        weight: 0.1,
    },
];

pub const PHRASE_TRAITS: &[TraitKeywords] = &[
    TraitKeywords {
        label: "extraversion",
        keywords: &["!", "liar", "i know", "look me in the eye"],
        trait_value: |p| p.extraversion,
        weight: 0.3,
    },
    TraitKeywords {
        label: "agreeableness",
        keywords: &["together", "trust", "we ", "friend", "sorry"],
        trait_value: |p| p.agreeableness,
        weight: 0.3,
    },
    TraitKeywords {
        label: "conscientiousness",
        keywords: &["noticed", "evidence", "pattern", "voted"],
        trait_value: |p| p.conscientiousness,
        weight: 0.2,
    },
    TraitKeywords {
        label: "openness",
        keywords: &["what if", "maybe", "imagine", "theory"],
        trait_value: |p| p.openness,
        weight: 0.2,
    },
    TraitKeywords {
        label: "neuroticism",
        keywords: &["scared", "worried", "nervous", "can't breathe"],
        trait_value: |p| p.neuroticism,
        weight: 0.2,
    },
];

/// Summed adjustment for `text` plus the labels of the rows that matched.
/// `text` is expected lowercase.
pub fn alignment(text: &str, personality: &Personality, table: &[TraitKeywords]) -> (f32, Vec<&'static str>) {
    let mut total = 0.0;
    let mut matched = Vec::new();
    for row in table {
        if row.keywords.iter().any(|k| text.contains(k)) {
            total += row.weight * ((row.trait_value)(personality) - 0.5) * 2.0;
            matched.push(row.label);
        }
    }
    (total, matched)
}

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
