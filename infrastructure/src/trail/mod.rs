//! Cognitive trail backends

mod jsonl;

pub use jsonl::JsonlCognitiveTrail;
