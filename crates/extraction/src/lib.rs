//! Layered field extraction from free-text utterances
//!
//! Turns an arbitrary user message into validated structured fields using
//! three strategies in strict priority order, each with a fixed confidence:
//!
//! 1. Pattern strategy (0.8) - per-field ordered regex lists encoding
//!    common phrasings ("I'm 30 years old", "$50,000", "60 days")
//! 2. Entity strategy (0.7) - a named-entity recognizer mapped onto
//!    fields, with keyword-context disambiguation for ambiguous categories
//! 3. Context-window strategy (0.6) - keyword tokens with a nearby numeric
//!    or enumeration-member token
//!
//! Candidate values are normalized and validated before they are returned;
//! a field that fails either step is simply missing from the result. The
//! extractor holds no mutable cross-call state, and the entity recognizer
//! is an injected dependency rather than a process-wide model instance.

pub mod entities;
pub mod extractor;
pub mod numbers;
pub mod patterns;
pub mod token;

pub use entities::{EntityLabel, EntityRecognizer, LexiconRecognizer, NamedEntity};
pub use extractor::{Extracted, FieldExtractor};
pub use numbers::word_to_number;
pub use patterns::FieldPatterns;
pub use token::{tokenize, Token};
