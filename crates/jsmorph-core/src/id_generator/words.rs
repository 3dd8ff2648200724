//! Word lists for [`MemorableIdGenerator`](super::MemorableIdGenerator).
//! Lowercase ASCII only.

pub(super) const ADJECTIVES: &[&str] = &[
    "able", "acid", "amber", "ancient", "angry", "bald", "basic", "bitter", "black", "blue",
    "bold", "brave", "brief", "bright", "broad", "brown", "busy", "calm", "cheap", "chilly",
    "clean", "clever", "cold", "cool", "crisp", "curly", "damp", "dark", "deep", "dizzy",
    "dry", "dull", "eager", "early", "easy", "empty", "fair", "fancy", "fast", "fierce",
    "flat", "fresh", "funny", "gentle", "giant", "glad", "golden", "grand", "gray", "great",
    "green", "happy", "hard", "heavy", "hollow", "huge", "humble", "icy", "jolly", "keen",
    "kind", "large", "late", "lazy", "light", "little", "lively", "lonely", "long", "loud",
    "lucky", "mad", "merry", "mighty", "mild", "modern", "narrow", "neat", "new", "nice",
    "noisy", "odd", "old", "orange", "pale", "plain", "polite", "proud", "purple", "quick",
    "quiet", "rapid", "rare", "red", "rich", "rough", "round", "royal", "rusty", "sad",
    "safe", "salty", "sharp", "shiny", "short", "shy", "silent", "silly", "slow", "small",
    "smooth", "soft", "sour", "spicy", "steep", "stiff", "strong", "sunny", "sweet", "swift",
    "tall", "tame", "tender", "thick", "thin", "tidy", "tiny", "tough", "vast", "warm",
    "weak", "wet", "white", "wide", "wild", "wise", "witty", "yellow", "young", "zesty",
];

pub(super) const NOUNS: &[&str] = &[
    "apple", "arrow", "badger", "bamboo", "banana", "beacon", "bear", "beetle", "bell", "berry",
    "bird", "boat", "bottle", "breeze", "bridge", "brook", "button", "cabin", "camel", "candle",
    "canyon", "castle", "cherry", "cloud", "comet", "coral", "cotton", "crab", "crane", "crow",
    "daisy", "desert", "dolphin", "dragon", "eagle", "ember", "falcon", "feather", "fern", "field",
    "flame", "flower", "forest", "fox", "garden", "glacier", "goat", "grape", "harbor", "hawk",
    "hill", "horse", "island", "jungle", "kettle", "kite", "ladder", "lake", "lantern", "leaf",
    "lemon", "lion", "lizard", "maple", "meadow", "meteor", "mirror", "moon", "moose", "moth",
    "mountain", "needle", "nest", "oak", "ocean", "olive", "otter", "owl", "panda", "parrot",
    "peach", "pebble", "pepper", "pine", "planet", "pond", "puffin", "rabbit", "raven", "reef",
    "river", "robin", "rocket", "saddle", "salmon", "shadow", "shell", "sparrow", "spider", "spring",
    "star", "stone", "storm", "stream", "sun", "swan", "thunder", "tiger", "tulip", "turtle",
    "valley", "violet", "walrus", "wave", "whale", "willow", "wind", "wolf", "wren", "zebra",
];
