//! Random human-readable cluster names.

use rand::seq::SliceRandom;

#[cfg(test)]
use mockall::automock;

const ADJECTIVES: &[&str] = &[
    "amber", "azure", "black", "bold", "brass", "bronze", "cedar", "clear", "copper", "coral",
    "crimson", "cyan", "dark", "ebony", "emerald", "gold", "granite", "gray", "green", "hazel",
    "indigo", "iron", "ivory", "jade", "lapis", "lavender", "light", "lime", "lucky", "lunar",
    "maple", "marble", "misty", "navy", "obsidian", "pale", "pine", "quartz", "quiet", "rainbow",
    "red", "ruby", "sapphire", "scarlet", "silly", "silver", "steel", "swift", "tall", "topaz",
    "violet", "vivid", "white", "wild", "yellow",
];

const NOUNS: &[&str] = &[
    "antler", "badger", "bear", "bee", "bell", "bison", "bolt", "cloud", "condor", "crane",
    "crest", "crow", "dancer", "deer", "dolphin", "dragon", "drifter", "eagle", "elk", "falcon",
    "fang", "ferret", "finch", "fox", "frog", "gecko", "griffin", "gull", "hare", "hawk",
    "heron", "hound", "jaguar", "keeper", "lantern", "lion", "lynx", "moose", "moth", "otter",
    "owl", "panther", "parrot", "piper", "puma", "raven", "robin", "rover", "runner", "salmon",
    "sparrow", "spider", "storm", "swallow", "thunder", "tiger", "toucan", "unicorn", "walker",
    "wanderer", "whale", "wolf", "wren", "zebra",
];

/// Source of generated cluster names.
#[cfg_attr(test, automock)]
pub trait NameGenerator: Send + Sync {
    /// Produce a new lower-case name.
    fn generate(&self) -> String;
}

/// Generates names like `tallfrog` from an adjective and a noun.
#[derive(Debug, Clone, Copy, Default)]
pub struct SillyNameGenerator;

impl NameGenerator for SillyNameGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("silly");
        let noun = NOUNS.choose(&mut rng).copied().unwrap_or("frog");
        format!("{adjective}{noun}").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_shape() {
        let generator = SillyNameGenerator;
        for _ in 0..50 {
            let name = generator.generate();
            assert!(!name.is_empty());
            assert_eq!(name, name.to_lowercase());
            assert!(name.chars().all(|c| c.is_ascii_lowercase()), "{name}");
        }
    }

    #[test]
    fn test_word_lists_are_lowercase() {
        for word in ADJECTIVES.iter().chain(NOUNS) {
            assert_eq!(*word, word.to_lowercase());
        }
    }
}
