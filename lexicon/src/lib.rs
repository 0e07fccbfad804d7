#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Dictionary entries, the static function-word fallback table, and the
//! definition resolver used by the lexical phase of the compiler.

/// Dictionary entry data model.
pub mod entry;
/// Static fallback table for common function words.
pub mod fallback;
/// Definition provider trait and failover resolution.
pub mod resolver;

pub use entry::{DefinitionSense, DictionaryEntry, Meaning};
pub use fallback::FallbackWord;
pub use resolver::{DefinitionProvider, DefinitionResolver, LexiconError, LoopbackDictionary};
