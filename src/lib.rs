//! Refrain — an interactive score REPL that auditions each line as you type.
//!
//! Lines of notation are resolved against the grammar's entry points,
//! evaluated into a running score, and only the notes a line added are
//! played back.

pub mod audio;
pub mod config;
pub mod dsl;
pub mod event;
pub mod instrument;
pub mod repl;
pub mod score;
