use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use super::words::{ADJECTIVES, NOUNS};
use super::IdGenerator;

/// Draws before a numeric suffix is appended.
const MAX_REDRAWS: usize = 32;

/// Produces `adjectiveNoun` names from a seeded RNG. The same seed always
/// yields the same sequence, and no name repeats. Once draws keep landing
/// on issued names, a counter is appended (`royalNeedle3`).
#[derive(Debug, Clone)]
pub struct MemorableIdGenerator {
    rng: StdRng,
    issued: FxHashSet<String>,
    suffix: u64,
}

impl MemorableIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            issued: FxHashSet::default(),
            suffix: 0,
        }
    }

    /// Restarts the sequence as if freshly built with `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    fn pick(&mut self, words: &'static [&'static str]) -> &'static str {
        words[self.rng.gen_range(0..words.len())]
    }
}

impl Default for MemorableIdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MemorableIdGenerator {
    fn draw(&mut self) -> String {
        let noun = self.pick(NOUNS);
        let adjective = self.pick(ADJECTIVES);
        let mut name = String::with_capacity(adjective.len() + noun.len());
        name.push_str(adjective);
        let mut chars = noun.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
        name
    }
}

impl IdGenerator for MemorableIdGenerator {
    fn next_id(&mut self) -> String {
        for _ in 0..MAX_REDRAWS {
            let name = self.draw();
            if self.issued.insert(name.clone()) {
                return name;
            }
        }
        loop {
            self.suffix += 1;
            let name = format!("{}{}", self.draw(), self.suffix);
            if self.issued.insert(name.clone()) {
                return name;
            }
        }
    }
}

impl Iterator for MemorableIdGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::JS_KEYWORDS;

    #[test]
    fn test_same_seed_same_sequence() {
        let a: Vec<String> = MemorableIdGenerator::new(42).take(20).collect();
        let b: Vec<String> = MemorableIdGenerator::new(42).take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reseed_restarts() {
        let mut gen = MemorableIdGenerator::new(7);
        let first = gen.next_id();
        gen.next_id();
        gen.reseed(7);
        assert_eq!(gen.next_id(), first);
    }

    #[test]
    fn test_shape_of_names() {
        for name in MemorableIdGenerator::new(1).take(50) {
            let upper = name
                .char_indices()
                .find(|(_, c)| c.is_ascii_uppercase())
                .map(|(i, _)| i)
                .unwrap();
            let (adjective, noun) = name.split_at(upper);
            assert!(ADJECTIVES.contains(&adjective), "{name}");
            assert!(NOUNS.iter().any(|n| n.eq_ignore_ascii_case(noun)), "{name}");
            assert!(!JS_KEYWORDS.contains(&name.as_str()));
        }
    }

    #[test]
    fn test_names_never_repeat() {
        let names: Vec<String> = MemorableIdGenerator::new(1).take(5000).collect();
        let unique: FxHashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_crowded_word_space_falls_back_to_suffixes() {
        let total = ADJECTIVES.len() * NOUNS.len();
        let mut gen = MemorableIdGenerator::new(3);
        let names: Vec<String> = (0..total + 100).map(|_| gen.next_id()).collect();
        let unique: FxHashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().any(|n| n.ends_with(|c: char| c.is_ascii_digit())));
    }

    #[test]
    fn test_reseed_forgets_issued_names() {
        let mut gen = MemorableIdGenerator::new(9);
        let first: Vec<String> = (0..10).map(|_| gen.next_id()).collect();
        gen.reseed(9);
        let again: Vec<String> = (0..10).map(|_| gen.next_id()).collect();
        assert_eq!(first, again);
    }
}
