//! The incremental score REPL core.
//!
//! One line of input is one turn: the [`context`] resolver picks the grammar
//! entry point, the score builder evaluates the forms, the [`diff`] finds the
//! events the line added, [`normalize`] moves them to start at zero and
//! [`dispatch`] hands them to an [`AudioSink`].

pub mod command;
pub mod context;
pub mod diff;
pub mod dispatch;
pub mod normalize;
pub mod session;

pub use command::{Command, CommandError, Flow};
pub use context::{ContextResolver, ParseFailure, SessionContext};
pub use diff::new_events;
pub use dispatch::{AudioSink, NullSink, PlayOptions, PlayTarget, PlaybackScore};
pub use normalize::normalize;
pub use session::{Evaluated, Session, TurnError, TurnOutcome};
