//! Session integration tests: one line at a time through resolve, evaluate,
//! diff, normalize and dispatch, with a sink that records what it was given.

use refrain::audio::AudioError;
use refrain::dsl::EntryPoint;
use refrain::repl::{
    AudioSink, PlayOptions, PlaybackScore, Session, SessionContext, TurnError, TurnOutcome,
};
use refrain::score::EvalError;

#[derive(Default)]
struct RecordingSink {
    loaded: Vec<PlaybackScore>,
    rendered: Vec<PlaybackScore>,
}

impl AudioSink for RecordingSink {
    fn load_instruments(&mut self, score: &PlaybackScore) -> Result<(), AudioError> {
        self.loaded.push(score.clone());
        Ok(())
    }

    fn render(&mut self, score: &PlaybackScore, _options: &PlayOptions) -> Result<(), AudioError> {
        self.rendered.push(score.clone());
        Ok(())
    }
}

fn turn(session: &mut Session, sink: &mut RecordingSink, line: &str) -> Result<TurnOutcome, TurnError> {
    session
        .turn(line, sink, &PlayOptions::silent())
        .map(|outcome| outcome.expect("line was blank"))
}

fn millis(events: &[refrain::event::SoundingEvent]) -> Vec<u64> {
    events.iter().map(|e| e.offset.millis()).collect()
}

#[test]
fn scenario_a_part_line_from_empty_session() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();

    let outcome = turn(&mut session, &mut sink, "piano: c d e").unwrap();

    assert_eq!(outcome.entry, EntryPoint::Part);
    assert_eq!(session.context(), SessionContext::PartLevel);
    assert_eq!(millis(&outcome.added), vec![0, 500, 1000]);
    assert_eq!(millis(outcome.playback.events()), vec![0, 500, 1000]);
    assert_eq!(session.current_score_snapshot().len(), 3);

    assert_eq!(sink.rendered.len(), 1);
    assert_eq!(sink.rendered[0], outcome.playback);
    assert_eq!(sink.loaded.len(), 1);
}

#[test]
fn scenario_b_music_data_continues_the_part() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: c d e").unwrap();

    let outcome = turn(&mut session, &mut sink, "f g").unwrap();

    assert_eq!(outcome.entry, EntryPoint::MusicData);
    assert_eq!(session.context(), SessionContext::MusicDataLevel);
    assert_eq!(millis(&outcome.added), vec![1500, 2000]);
    assert_eq!(millis(outcome.playback.events()), vec![0, 500]);
    let pitches: Vec<u8> = outcome.playback.events().iter().map(|e| e.pitch).collect();
    assert_eq!(pitches, vec![65, 67]);

    // The retained score keeps its own offsets.
    let score_offsets: Vec<u64> = session
        .current_score_snapshot()
        .events()
        .iter()
        .map(|e| e.offset.millis())
        .collect();
    assert_eq!(score_offsets, vec![0, 500, 1000, 1500, 2000]);
}

#[test]
fn scenario_c_syntax_error_changes_nothing() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: c d e").unwrap();
    turn(&mut session, &mut sink, "f g").unwrap();
    let before = session.current_score_snapshot().clone();

    let err = turn(&mut session, &mut sink, "piano: q").unwrap_err();

    let TurnError::Parse(failure) = &err else {
        panic!("expected a parse failure, got {err:?}");
    };
    assert_eq!(failure.attempts.len(), 3);
    assert!(err.to_string().starts_with("syntax error"));
    assert_eq!(session.context(), SessionContext::MusicDataLevel);
    assert_eq!(session.current_score_snapshot(), &before);
    assert_eq!(sink.rendered.len(), 2);
}

#[test]
fn scenario_d_unknown_instrument_commits_context_only() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: c d e").unwrap();
    turn(&mut session, &mut sink, "f g").unwrap();
    let before = session.current_score_snapshot().clone();

    let err = turn(&mut session, &mut sink, "kazoo: c d").unwrap_err();

    assert!(matches!(
        err,
        TurnError::Evaluation(EvalError::UnknownInstrument(ref name)) if name == "kazoo"
    ));
    assert_eq!(session.context(), SessionContext::PartLevel);
    assert_eq!(session.current_score_snapshot(), &before);
    assert_eq!(session.history().len(), 2);
    assert_eq!(sink.rendered.len(), 2);

    // The session is still usable and the piano carries on where it was.
    let next = turn(&mut session, &mut sink, "a").unwrap();
    assert_eq!(millis(&next.added), vec![2500]);
}

#[test]
fn music_data_first_is_an_evaluation_error() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();

    let err = turn(&mut session, &mut sink, "c d e").unwrap_err();

    assert!(matches!(err, TurnError::Evaluation(EvalError::NoActivePart)));
    assert_eq!(session.context(), SessionContext::MusicDataLevel);
    assert!(session.current_score_snapshot().is_empty());
    assert!(sink.rendered.is_empty());
}

#[test]
fn second_part_plays_from_zero() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: c d e f").unwrap();

    let outcome = turn(&mut session, &mut sink, "bass: o2 c1").unwrap();

    assert_eq!(outcome.entry, EntryPoint::Part);
    assert_eq!(millis(&outcome.added), vec![0]);
    assert_eq!(outcome.playback.parts().len(), 1);
    assert_eq!(session.current_score_snapshot().parts().len(), 2);
}

#[test]
fn multi_part_line_reads_as_score() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();

    let outcome = turn(&mut session, &mut sink, "(tempo! 60) piano: c bass: c").unwrap();

    assert_eq!(outcome.entry, EntryPoint::Score);
    assert_eq!(session.context(), SessionContext::ScoreLevel);
    assert_eq!(millis(&outcome.added), vec![0, 0]);
    assert_eq!(outcome.playback.duration().millis(), 900);
}

#[test]
fn repeating_existing_material_plays_only_the_new_notes() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: c d").unwrap();

    // Re-declaring the part continues it; nothing heard before plays again.
    let outcome = turn(&mut session, &mut sink, "piano: e").unwrap();
    assert_eq!(millis(&outcome.added), vec![1000]);
    assert_eq!(millis(outcome.playback.events()), vec![0]);
}

#[test]
fn load_flag_off_skips_instrument_loading() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    let options = PlayOptions {
        load_instruments: false,
        ..PlayOptions::silent()
    };

    session.turn("piano: c", &mut sink, &options).unwrap();

    assert!(sink.loaded.is_empty());
    assert_eq!(sink.rendered.len(), 1);
}

#[test]
fn replay_normalizes_whole_score() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: r c d").unwrap();

    let played = session.replay(&mut sink, &PlayOptions::silent()).unwrap();
    assert_eq!(millis(played.events()), vec![0, 500]);
}

/// Fails to render until `working` is set.
#[derive(Default)]
struct FlakySink {
    working: bool,
    rendered: Vec<PlaybackScore>,
}

impl AudioSink for FlakySink {
    fn load_instruments(&mut self, _score: &PlaybackScore) -> Result<(), AudioError> {
        Ok(())
    }

    fn render(&mut self, score: &PlaybackScore, _options: &PlayOptions) -> Result<(), AudioError> {
        if !self.working {
            return Err(AudioError::NoOutputDevice);
        }
        self.rendered.push(score.clone());
        Ok(())
    }
}

#[test]
fn audio_failure_still_commits_the_line() {
    let mut session = Session::default();
    let mut sink = FlakySink::default();

    let err = session
        .turn("piano: c d", &mut sink, &PlayOptions::silent())
        .unwrap_err();
    assert!(matches!(err, TurnError::Audio(AudioError::NoOutputDevice)));
    assert_eq!(session.current_score_snapshot().len(), 2);
    assert_eq!(session.history(), &["piano: c d".to_string()]);
    assert_eq!(session.context(), SessionContext::PartLevel);

    sink.working = true;
    let outcome = session
        .turn("e", &mut sink, &PlayOptions::silent())
        .unwrap()
        .unwrap();
    assert_eq!(millis(&outcome.added), vec![1000]);
    assert_eq!(outcome.playback.events().len(), 1);
    assert_eq!(outcome.playback.events()[0].pitch, 64);
    assert_eq!(sink.rendered.len(), 1);
    assert_eq!(session.current_score_snapshot().len(), 3);
}

#[test]
fn runaway_input_fails_the_turn_and_the_session_goes_on() {
    let mut session = Session::default();
    let mut sink = RecordingSink::default();
    turn(&mut session, &mut sink, "piano: c").unwrap();

    let lines = [
        format!("c{}", "+".repeat(128)),
        "o200000000 c".to_string(),
        "o4294967295 c".to_string(),
        "(tempo 0.000000001) c1".to_string(),
        "(tempo 0.0000000000001) c c".to_string(),
        "c9000 c9000 d".to_string(),
        "[[c]*1000]*2000".to_string(),
        "[[c]*4294967295]*4294967295".to_string(),
    ];
    for line in &lines {
        assert!(turn(&mut session, &mut sink, line).is_err(), "{line}");
    }
    assert!(matches!(
        turn(&mut session, &mut sink, "c9000"),
        Err(TurnError::Evaluation(EvalError::InvalidLength(9000)))
    ));
    assert!(matches!(
        turn(&mut session, &mut sink, "[[c]*1000]*2000"),
        Err(TurnError::Evaluation(EvalError::TooLarge { .. }))
    ));

    assert_eq!(session.current_score_snapshot().len(), 1);
    assert_eq!(session.history(), &["piano: c".to_string()]);

    let outcome = turn(&mut session, &mut sink, "d").unwrap();
    assert_eq!(millis(&outcome.added), vec![500]);
}
