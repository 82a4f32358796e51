//! Master limiter — soft knee with a hard ceiling.
//!
//! Samples below the knee pass untouched. Above it they bend smoothly
//! toward the ceiling, so several overlapping turns can stack without
//! harsh clipping.

/// Soft limiter bounded by `[-ceiling, ceiling]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limiter {
    ceiling: f32,
    knee: f32,
}

impl Limiter {
    /// `knee` is the fraction of the ceiling where compression starts.
    pub fn new(ceiling: f32, knee: f32) -> Self {
        debug_assert!(ceiling > 0.0 && ceiling <= 1.0);
        debug_assert!((0.0..1.0).contains(&knee));
        Self {
            ceiling,
            knee: ceiling * knee,
        }
    }

    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        let magnitude = sample.abs();
        if magnitude <= self.knee {
            return sample;
        }
        let room = self.ceiling - self.knee;
        let over = (magnitude - self.knee) / room;
        let bent = self.knee + room * over.tanh();
        bent.min(self.ceiling).copysign(sample)
    }

    #[inline]
    pub fn process_block(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(0.95, 0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_below_knee() {
        let limiter = Limiter::default();
        for s in [0.0, 0.3, -0.5, 0.75, -0.75] {
            assert_eq!(limiter.process(s), s);
        }
    }

    #[test]
    fn never_exceeds_ceiling() {
        let limiter = Limiter::default();
        for s in [0.9, 1.0, 2.5, 100.0, f32::MAX] {
            let out = limiter.process(s);
            assert!(out <= 0.95, "{s} -> {out}");
            assert_eq!(limiter.process(-s), -out);
        }
    }

    #[test]
    fn monotonic_above_knee() {
        let limiter = Limiter::default();
        let mut prev = limiter.process(0.76);
        for i in 1..100 {
            let out = limiter.process(0.76 + i as f32 * 0.02);
            assert!(out >= prev);
            prev = out;
        }
    }

    #[test]
    fn block_matches_per_sample() {
        let limiter = Limiter::new(0.5, 0.5);
        let mut buffer = vec![0.0, 0.2, -0.4, 1.5, -1.5];
        let expected: Vec<f32> = buffer.iter().map(|&s| limiter.process(s)).collect();
        limiter.process_block(&mut buffer);
        assert_eq!(buffer, expected);
        assert!((limiter.ceiling() - 0.5).abs() < f32::EPSILON);
    }
}
