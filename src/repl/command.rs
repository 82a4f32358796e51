//! Colon commands understood by the shell.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::audio::AudioError;
use crate::dsl::note::note_name;
use crate::dsl::Grammar;

use super::dispatch::{AudioSink, PlayOptions};
use super::session::{Session, TurnError};

pub const HELP: &str = "\
Type notation to add it to the score, e.g. `piano: c d e` then `f g`.

  :help          show this help
  :quit          leave (Ctrl-D works too)
  :new           start a fresh score
  :score         print the lines that make up the score
  :parts         list parts and how many notes each has
  :play          play the whole score from the start
  :save <file>   write the score's lines to a file
  :load <file>   evaluate a file line by line, without playing it

Ctrl-C silences playback.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    New,
    Score,
    Parts,
    Play,
    Save(PathBuf),
    Load(PathBuf),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command ':{0}' (try :help)")]
    Unknown(String),

    #[error(":{0} needs a file name")]
    MissingPath(&'static str),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{line}: {source}", .path.display())]
    Load {
        path: PathBuf,
        line: usize,
        source: TurnError,
    },

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
}

/// What the shell should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

impl Command {
    /// Parse a colon command. Returns `None` if `line` isn't one.
    pub fn parse(line: &str) -> Option<Result<Command, CommandError>> {
        let rest = line.trim().strip_prefix(':')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let path = |cmd: &'static str| {
            if arg.is_empty() {
                Err(CommandError::MissingPath(cmd))
            } else {
                Ok(PathBuf::from(arg))
            }
        };

        Some(match name {
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "new" => Ok(Command::New),
            "score" => Ok(Command::Score),
            "parts" => Ok(Command::Parts),
            "play" => Ok(Command::Play),
            "save" => path("save").map(Command::Save),
            "load" => path("load").map(Command::Load),
            other => Err(CommandError::Unknown(other.to_string())),
        })
    }

    pub fn execute<G: Grammar, S: AudioSink + ?Sized>(
        &self,
        session: &mut Session<G>,
        sink: &mut S,
        options: &PlayOptions,
    ) -> Result<Flow, CommandError> {
        let out = match self {
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Flow::Quit),
            Command::New => {
                session.reset();
                "new score".to_string()
            }
            Command::Score => {
                if session.history().is_empty() {
                    "(empty score)".to_string()
                } else {
                    session.history().join("\n")
                }
            }
            Command::Parts => describe_parts(session),
            Command::Play => {
                let played = session.replay(sink, options)?;
                format!("playing {} note(s), {}", played.len(), played.duration())
            }
            Command::Save(path) => {
                save(path, session.history())?;
                info!("saved score to {}", path.display());
                format!("saved {} line(s) to {}", session.history().len(), path.display())
            }
            Command::Load(path) => {
                let (lines, notes) = load(path, session)?;
                info!("loaded {}", path.display());
                format!(
                    "loaded {} line(s) from {}, {} new note(s)",
                    lines,
                    path.display(),
                    notes
                )
            }
        };
        Ok(Flow::Continue(out))
    }
}

fn describe_parts<G: Grammar>(session: &Session<G>) -> String {
    let score = session.current_score_snapshot();
    if score.parts().is_empty() {
        return "(no parts)".to_string();
    }
    score
        .parts()
        .iter()
        .map(|(id, info)| {
            let count = score.event_count(*id);
            let range = score
                .events()
                .iter()
                .filter(|e| e.part == *id)
                .map(|e| e.pitch)
                .fold(None, |acc: Option<(u8, u8)>, p| match acc {
                    Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
                    None => Some((p, p)),
                });
            let mut line = format!("{id} {} ({}): {count} note(s)", info.name, info.instrument);
            if let Some((lo, hi)) = range {
                line.push_str(&format!(", {} to {}", note_name(lo), note_name(hi)));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write one line per history entry.
pub fn save(path: &Path, lines: &[String]) -> Result<(), CommandError> {
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(path, text).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Evaluate each line of `path` into `session`. Returns the number of lines
/// evaluated and the number of notes they added.
pub fn load<G: Grammar>(path: &Path, session: &mut Session<G>) -> Result<(usize, usize), CommandError> {
    let text = fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = 0;
    let mut notes = 0;
    for (idx, line) in text.lines().enumerate() {
        let evaluated = session
            .evaluate_line(line)
            .map_err(|source| CommandError::Load {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        if let Some(evaluated) = evaluated {
            lines += 1;
            notes += evaluated.added.len();
        }
    }
    Ok((lines, notes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::dispatch::NullSink;

    fn exec(session: &mut Session, line: &str) -> Result<Flow, CommandError> {
        Command::parse(line)
            .unwrap()?
            .execute(session, &mut NullSink, &PlayOptions::silent())
    }

    #[test]
    fn non_commands_are_not_parsed() {
        assert!(Command::parse("piano: c d e").is_none());
        assert!(Command::parse("c d").is_none());
    }

    #[test]
    fn parses_commands_and_arguments() {
        assert!(matches!(Command::parse(":help"), Some(Ok(Command::Help))));
        assert!(matches!(Command::parse("  :q "), Some(Ok(Command::Quit))));
        match Command::parse(":save  tune.txt ") {
            Some(Ok(Command::Save(p))) => assert_eq!(p, PathBuf::from("tune.txt")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_path_and_unknown_command() {
        assert!(matches!(
            Command::parse(":load"),
            Some(Err(CommandError::MissingPath("load")))
        ));
        assert!(matches!(
            Command::parse(":dance"),
            Some(Err(CommandError::Unknown(_)))
        ));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut s = Session::default();
        assert_eq!(exec(&mut s, ":quit").unwrap(), Flow::Quit);
    }

    #[test]
    fn score_and_parts_listing() {
        let mut s = Session::default();
        assert_eq!(
            exec(&mut s, ":score").unwrap(),
            Flow::Continue("(empty score)".into())
        );
        s.evaluate_line("piano: c d e").unwrap();
        s.evaluate_line("f g").unwrap();
        assert_eq!(
            exec(&mut s, ":score").unwrap(),
            Flow::Continue("piano: c d e\nf g".into())
        );
        assert_eq!(
            exec(&mut s, ":parts").unwrap(),
            Flow::Continue("#0 piano (piano): 5 note(s), C4 to G4".into())
        );
    }

    #[test]
    fn new_clears_the_session() {
        let mut s = Session::default();
        s.evaluate_line("piano: c").unwrap();
        exec(&mut s, ":new").unwrap();
        assert!(s.history().is_empty());
    }

    #[test]
    fn save_then_load_rebuilds_the_score() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tune.txt");

        let mut s = Session::default();
        s.evaluate_line("piano: c d e").unwrap();
        s.evaluate_line("f g").unwrap();
        exec(&mut s, &format!(":save {}", path.display())).unwrap();

        let mut fresh = Session::default();
        let flow = exec(&mut fresh, &format!(":load {}", path.display())).unwrap();
        assert!(matches!(flow, Flow::Continue(msg) if msg.contains("5 new note(s)")));
        assert_eq!(
            fresh.current_score_snapshot(),
            s.current_score_snapshot()
        );
    }

    #[test]
    fn load_reports_failing_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "piano: c\n\nd q\n").unwrap();

        let mut s = Session::default();
        match load(&path, &mut s) {
            Err(CommandError::Load { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let mut s = Session::default();
        assert!(matches!(
            load(Path::new("/definitely/not/here.txt"), &mut s),
            Err(CommandError::Io { .. })
        ));
    }
}
