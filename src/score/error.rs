//! Errors raised while applying forms to the score.

use thiserror::Error;

/// A semantic error in otherwise well-formed notation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("no part is open; start one with e.g. 'piano:'")]
    NoActivePart,

    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("value {value} is out of range for '{name}'")]
    AttributeOutOfRange { name: String, value: f64 },

    #[error("note '{letter}' in octave {octave} is outside the MIDI range")]
    PitchOutOfRange { letter: char, octave: i32 },

    #[error("invalid note length '{0}'")]
    InvalidLength(u32),

    #[error("alias '{0}' already names a different part")]
    AliasInUse(String),

    #[error("the score has run past the end of the timeline")]
    TimelineOverflow,

    #[error("line expands to more than {limit} notes and rests")]
    TooLarge { limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        assert_eq!(
            EvalError::UnknownInstrument("kazoo".into()).to_string(),
            "unknown instrument 'kazoo'"
        );
        assert_eq!(
            EvalError::AttributeOutOfRange {
                name: "vol".into(),
                value: 140.0
            }
            .to_string(),
            "value 140 is out of range for 'vol'"
        );
    }
}
