//! Fresh identifier sources.
//!
//! Generators are plain stateful structs. [`SequentialIdGenerator`]
//! enumerates names over its alphabet and so never repeats one;
//! [`MemorableIdGenerator`] draws at random and remembers what it has
//! issued, suffixing a counter once draws start to collide. Both skip
//! reserved words and implement [`Iterator`] so they can be zipped
//! against a list of variables.
//!
//! The trait itself promises nothing about repeats; implementations used
//! for renaming must not yield the same name twice.

mod memorable;
mod sequential;
mod words;

pub use memorable::MemorableIdGenerator;
pub use sequential::{SequentialIdGenerator, DEFAULT_ALPHABET, JS_KEYWORDS};

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}
