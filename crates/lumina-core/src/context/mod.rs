//! Codebase context abstractions.
//!
//! - `ContextProvider`: RPITIT trait for concrete context generators
//! - `BoxContextProvider`: Object-safe wrapper so a session can hold an
//!   optional provider without an extra type parameter

pub mod box_provider;
pub mod provider;
