//! Codebase context providers.

pub mod repomix;
