//! ADSR envelope generator for synthesizers.

/// Attack-Decay-Sustain-Release envelope.
///
/// All time values are in seconds. Sustain is a level (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrEnvelope {
    pub const fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Calculate the amplitude at time `t` for a note held for
    /// `note_duration` seconds.
    ///
    /// While held the envelope runs attack → decay → sustain. Release ramps
    /// to zero from whatever level the held part had reached, so notes
    /// shorter than attack + decay don't jump.
    pub fn amplitude(&self, t: f64, note_duration: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        if t < note_duration {
            return self.held(t);
        }

        let release_t = t - note_duration;
        if self.release <= 0.0 || release_t >= self.release {
            return 0.0;
        }
        self.held(note_duration) * (1.0 - release_t / self.release)
    }

    /// Level while the note is held.
    fn held(&self, t: f64) -> f64 {
        if t < self.attack {
            // attack > 0 here
            t / self.attack
        } else if t < self.attack + self.decay {
            let decay_t = (t - self.attack) / self.decay;
            1.0 - decay_t * (1.0 - self.sustain)
        } else {
            self.sustain
        }
    }

    /// Total sound duration including release tail.
    pub fn total_duration(&self, note_duration: f64) -> f64 {
        note_duration + self.release
    }

    /// Number of frames needed to render a note with its release tail.
    pub fn frames(&self, note_duration: f64, sample_rate: u32) -> usize {
        (self.total_duration(note_duration) * sample_rate as f64).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_env() -> AdsrEnvelope {
        AdsrEnvelope::new(0.01, 0.05, 0.7, 0.1)
    }

    #[test]
    fn starts_at_zero() {
        let env = test_env();
        assert!((env.amplitude(0.0, 1.0)).abs() < 1e-10);
    }

    #[test]
    fn reaches_peak_at_attack() {
        let env = test_env();
        assert!((env.amplitude(0.01, 1.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn reaches_sustain_after_decay() {
        let env = test_env();
        assert!((env.amplitude(0.06, 1.0) - 0.7).abs() < 1e-10);
        assert!((env.amplitude(0.5, 1.0) - 0.7).abs() < 1e-10);
    }

    #[test]
    fn release_ramps_from_sustain_to_zero() {
        let env = test_env();
        assert!((env.amplitude(1.0, 1.0) - 0.7).abs() < 1e-10);
        assert!((env.amplitude(1.05, 1.0) - 0.35).abs() < 1e-10);
        assert!((env.amplitude(1.1, 1.0)).abs() < 1e-10);
        assert!((env.amplitude(2.0, 1.0)).abs() < 1e-10);
    }

    #[test]
    fn short_note_releases_from_attack_level() {
        let env = test_env();
        // Released halfway up the attack ramp.
        assert!((env.amplitude(0.005, 0.005) - 0.5).abs() < 1e-10);
        assert!((env.amplitude(0.055, 0.005) - 0.25).abs() < 1e-10);
    }

    #[test]
    fn negative_time_is_zero() {
        let env = test_env();
        assert!((env.amplitude(-0.1, 1.0)).abs() < 1e-10);
    }

    #[test]
    fn zero_attack_instant_peak() {
        let env = AdsrEnvelope::new(0.0, 0.05, 0.7, 0.1);
        assert!((env.amplitude(0.0, 1.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn zero_release_cuts_off() {
        let env = AdsrEnvelope::new(0.0, 0.0, 1.0, 0.0);
        assert!((env.amplitude(0.99, 1.0) - 1.0).abs() < 1e-10);
        assert_eq!(env.amplitude(1.0, 1.0), 0.0);
    }

    #[test]
    fn frame_count_covers_tail() {
        let env = test_env();
        assert!((env.total_duration(1.0) - 1.1).abs() < 1e-10);
        let gate = AdsrEnvelope::new(0.0, 0.0, 1.0, 0.5);
        assert_eq!(gate.frames(0.5, 1000), 1000);
    }

    #[test]
    fn envelope_stays_in_unit_range() {
        let env = test_env();
        for note in [0.003, 0.04, 1.0] {
            for i in 0..2000 {
                let t = i as f64 / 1000.0;
                let amp = env.amplitude(t, note);
                assert!((0.0..=1.0 + 1e-10).contains(&amp), "t={t}: {amp}");
            }
        }
    }
}
