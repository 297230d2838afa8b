//! Text-generation backend abstraction.
//!
//! `ResponseGenerator` maps a prompt to generated text. Concrete backends
//! live in lumina-infra; `BoxResponseGenerator` erases the concrete type.

pub mod box_generator;
pub mod generator;
