//! Pitch arithmetic: note letters, accidentals and octaves to MIDI numbers.

/// Semitone step of a note letter within its octave.
pub fn letter_step(letter: char) -> Option<i32> {
    match letter.to_ascii_lowercase() {
        'c' => Some(0),
        'd' => Some(2),
        'e' => Some(4),
        'f' => Some(5),
        'g' => Some(7),
        'a' => Some(9),
        'b' => Some(11),
        _ => None,
    }
}

/// MIDI note number for `letter` with `accidentals` in `octave`.
///
/// Octave 4 holds middle C (60). Returns `None` outside 0..=127.
pub fn midi_pitch(letter: char, accidentals: i8, octave: i32) -> Option<u8> {
    let step = letter_step(letter)?;
    let midi = octave
        .checked_add(1)?
        .checked_mul(12)?
        .checked_add(step + i32::from(accidentals))?;
    u8::try_from(midi).ok().filter(|&m| m <= 127)
}

/// Name a MIDI note for display, e.g. `60` as `C4`, `61` as `C#4`.
pub fn note_name(midi: u8) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = i32::from(midi) / 12 - 1;
    format!("{}{}", NAMES[usize::from(midi % 12)], octave)
}
