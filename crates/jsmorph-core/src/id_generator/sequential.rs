use rustc_hash::FxHashSet;

use super::IdGenerator;

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Reserved words of the language; never produced by default.
pub const JS_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "let",
    "new",
    "null",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Counts through every string over an alphabet, shortest first, like an
/// odometer whose rightmost digit turns fastest.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    alphabet: Vec<char>,
    reserved: FxHashSet<String>,
    digits: Vec<usize>,
}

impl SequentialIdGenerator {
    /// An empty alphabet falls back to [`DEFAULT_ALPHABET`]. Duplicate
    /// characters are ignored.
    pub fn new(alphabet: &str) -> Self {
        Self::with_reserved(alphabet, JS_KEYWORDS.iter().copied())
    }

    pub fn with_reserved<I, S>(alphabet: &str, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = if alphabet.is_empty() {
            DEFAULT_ALPHABET
        } else {
            alphabet
        };
        let mut alphabet = Vec::new();
        for ch in source.chars() {
            if !alphabet.contains(&ch) {
                alphabet.push(ch);
            }
        }
        Self {
            alphabet,
            reserved: reserved.into_iter().map(Into::into).collect(),
            digits: Vec::new(),
        }
    }

    /// Restarts the sequence from its first name.
    pub fn reset(&mut self) {
        self.digits.clear();
    }

    fn increment(&mut self) {
        let radix = self.alphabet.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < radix {
                return;
            }
            *digit = 0;
        }
        self.digits.insert(0, 0);
    }

    fn current(&self) -> String {
        self.digits.iter().map(|&d| self.alphabet[d]).collect()
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHABET)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        loop {
            self.increment();
            let candidate = self.current();
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl Iterator for SequentialIdGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_like_an_odometer() {
        let gen = SequentialIdGenerator::new("abAB");
        let names: Vec<String> = gen.take(9).collect();
        assert_eq!(names, ["a", "b", "A", "B", "aa", "ab", "aA", "aB", "ba"]);
    }

    #[test]
    fn test_skips_keywords() {
        let gen = SequentialIdGenerator::new("doD");
        let names: Vec<String> = gen.take(6).collect();
        assert_eq!(names, ["d", "o", "D", "dd", "dD", "od"]);
    }

    #[test]
    fn test_custom_reserved_words() {
        let gen = SequentialIdGenerator::with_reserved("ab", ["b"]);
        let names: Vec<String> = gen.take(6).collect();
        assert_eq!(names, ["a", "aa", "ab", "ba", "bb", "aaa"]);
    }

    #[test]
    fn test_empty_alphabet_uses_default() {
        let mut gen = SequentialIdGenerator::new("");
        assert_eq!(gen.next_id(), "a");
        for _ in 0..51 {
            gen.next_id();
        }
        assert_eq!(gen.next_id(), "aa");
    }

    #[test]
    fn test_reset() {
        let mut gen = SequentialIdGenerator::default();
        gen.next_id();
        gen.next_id();
        gen.reset();
        assert_eq!(gen.next_id(), "a");
    }
}
