//! Built-in content shipped with the engine.

pub mod embedded;
