use std::collections::HashSet;

use jsmorph_core::id_generator::JS_KEYWORDS;
use jsmorph_core::{IdGenerator, MemorableIdGenerator, SequentialIdGenerator};
use proptest::prelude::*;

#[test]
fn test_default_sequence_never_yields_keywords() {
    let mut generator = SequentialIdGenerator::default();
    let names: Vec<String> = (0..5000).map(|_| generator.next_id()).collect();
    assert!(names.iter().all(|name| !JS_KEYWORDS.contains(&name.as_str())));
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
}

#[test]
fn test_default_alphabet_skips_reserved_two_letter_names() {
    let generator = SequentialIdGenerator::default();
    let names: Vec<String> = generator.take(52 * 53).collect();
    assert_eq!(names[0], "a");
    assert_eq!(names[51], "Z");
    assert!(!names.iter().any(|name| name == "do" || name == "if" || name == "in"));
}

#[test]
fn test_memorable_sequences_repeat_per_seed() {
    let first: Vec<String> = MemorableIdGenerator::new(42).take(20).collect();
    let second: Vec<String> = MemorableIdGenerator::new(42).take(20).collect();
    let other: Vec<String> = MemorableIdGenerator::new(43).take(20).collect();
    assert_eq!(first, second);
    assert_ne!(first, other);
}

proptest! {
    #[test]
    fn prop_sequential_names_are_distinct(alphabet in "[a-e]{1,5}", count in 1usize..300) {
        let mut generator = SequentialIdGenerator::new(&alphabet);
        let mut seen = HashSet::new();
        for _ in 0..count {
            let name = generator.next_id();
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| alphabet.contains(c)));
            prop_assert!(seen.insert(name));
        }
    }
}
