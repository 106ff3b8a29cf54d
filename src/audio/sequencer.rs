//! Look-ahead step sequencer
//!
//! The shell polls [`Sequencer::pump`] on a coarse timer (around every
//! 100 ms of wall time) but every note is stamped with a precise audio-clock
//! time: while the next step falls inside the schedule-ahead window it is
//! emitted at exactly `next_step_time`, however late or bunched the polls
//! arrive. A delayed poll schedules several steps at once; none are dropped.

use rand::Rng;

use super::patterns::{PATTERN_LENGTH, Pattern, TRACKS};

/// Fixed musical tempo
pub const BPM: f64 = 128.0;
pub const SECONDS_PER_BEAT: f64 = 60.0 / BPM;
/// 16th notes
pub const STEPS_PER_BEAT: f64 = 4.0;
/// Duration of one step in seconds
pub const STEP_TIME: f64 = SECONDS_PER_BEAT / STEPS_PER_BEAT;

/// Poll interval for the shell's pump timer (ms)
pub const LOOKAHEAD_MS: f64 = 100.0;
/// How far past the audio clock steps are scheduled (s)
pub const SCHEDULE_AHEAD_TIME: f64 = 0.2;
/// Head start for the first step so it is never already in the past (s)
const START_DELAY: f64 = 0.1;

/// Receiver for scheduled note triggers; implemented by the Web Audio
/// instrument bank and by test recorders.
pub trait NoteSink {
    fn kick(&mut self, time: f64);
    fn hi_hat(&mut self, time: f64, open: bool);
    fn bass(&mut self, time: f64, freq: f32, duration: f64);
    fn lead(&mut self, time: f64, freq: f32, duration: f64);
}

/// Transport + step state. `current_step` grows without bound and is
/// wrapped into the pattern per step.
pub struct Sequencer {
    playing: bool,
    current_step: u64,
    next_step_time: f64,
    track: Option<&'static Pattern>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            playing: false,
            current_step: 0,
            next_step_time: 0.0,
            track: None,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn track(&self) -> Option<&'static Pattern> {
        self.track
    }

    /// Begin (or resume) playback against the given audio-clock time.
    ///
    /// A fresh start picks a random track; resuming after `pause` keeps the
    /// track and the step counter.
    pub fn start(&mut self, audio_now: f64, rng: &mut impl Rng) {
        if self.playing {
            return;
        }
        self.playing = true;
        if self.track.is_none() || self.current_step == 0 {
            let track = &TRACKS[rng.random_range(0..TRACKS.len())];
            log::info!("playing track: {}", track.name);
            self.track = Some(track);
        }
        self.next_step_time = audio_now + START_DELAY;
    }

    /// Halt playback, keeping the step counter for a later resume.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Halt playback and rewind to the top of the pattern.
    pub fn stop(&mut self) {
        self.pause();
        self.current_step = 0;
    }

    /// Schedule every step due inside the look-ahead window.
    pub fn pump(&mut self, audio_now: f64, sink: &mut impl NoteSink) {
        if !self.playing {
            return;
        }
        let Some(track) = self.track else { return };
        while self.next_step_time < audio_now + SCHEDULE_AHEAD_TIME {
            schedule_step(track, self.current_step, self.next_step_time, sink);
            self.next_step_time += STEP_TIME;
            self.current_step += 1;
        }
    }
}

fn schedule_step(track: &Pattern, step_number: u64, time: f64, sink: &mut impl NoteSink) {
    let step = step_number as usize % PATTERN_LENGTH;

    if track.kick[step] != 0 {
        sink.kick(time);
    }
    if track.hat[step] != 0 {
        // Open hat at the tail of every half bar
        sink.hi_hat(time, step % 8 == 7);
    }
    let bass_note = track.bass[step];
    if bass_note > 0.0 {
        sink.bass(time, bass_note, STEP_TIME * 1.5);
    }
    let lead_note = track.lead[step];
    if lead_note > 0.0 {
        sink.lead(time, lead_note, STEP_TIME * 2.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Records every trigger as (voice, time); steps are reconstructed
    /// from the pattern for exactly-once checks.
    #[derive(Default)]
    struct Recorder {
        kicks: Vec<f64>,
        hats: Vec<(f64, bool)>,
        basses: Vec<(f64, f32, f64)>,
        leads: Vec<(f64, f32, f64)>,
    }

    impl NoteSink for Recorder {
        fn kick(&mut self, time: f64) {
            self.kicks.push(time);
        }
        fn hi_hat(&mut self, time: f64, open: bool) {
            self.hats.push((time, open));
        }
        fn bass(&mut self, time: f64, freq: f32, duration: f64) {
            self.basses.push((time, freq, duration));
        }
        fn lead(&mut self, time: f64, freq: f32, duration: f64) {
            self.leads.push((time, freq, duration));
        }
    }

    fn started(clock: f64) -> Sequencer {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seq = Sequencer::new();
        seq.start(clock, &mut rng);
        seq
    }

    #[test]
    fn test_first_step_is_seeded_ahead() {
        let mut seq = started(10.0);
        let mut rec = Recorder::default();
        seq.pump(10.0, &mut rec);
        // Everything scheduled so far sits at or after now + start delay
        for &t in &rec.kicks {
            assert!(t >= 10.1);
        }
        assert!(seq.current_step() > 0);
    }

    #[test]
    fn test_pause_keeps_step_stop_rewinds() {
        let mut seq = started(0.0);
        let mut rec = Recorder::default();
        seq.pump(1.0, &mut rec);
        let step = seq.current_step();
        assert!(step > 0);

        seq.pause();
        assert_eq!(seq.current_step(), step);
        let track = seq.track().map(|t| t.name);

        // Resume keeps both the counter and the track
        let mut rng = Pcg32::seed_from_u64(99);
        seq.start(5.0, &mut rng);
        assert_eq!(seq.current_step(), step);
        assert_eq!(seq.track().map(|t| t.name), track);

        seq.stop();
        assert_eq!(seq.current_step(), 0);
        assert!(!seq.is_playing());
    }

    #[test]
    fn test_pump_while_stopped_schedules_nothing() {
        let mut seq = Sequencer::new();
        let mut rec = Recorder::default();
        seq.pump(100.0, &mut rec);
        assert!(rec.kicks.is_empty() && rec.hats.is_empty());
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn test_late_poll_catches_up_without_dropping_steps() {
        let mut seq = started(0.0);
        let mut rec = Recorder::default();
        // One poll arriving a full second late must emit every elapsed step
        seq.pump(1.0, &mut rec);
        let expected_steps = ((1.0 + SCHEDULE_AHEAD_TIME - 0.1) / STEP_TIME).ceil() as u64;
        assert_eq!(seq.current_step(), expected_steps);
    }

    /// Reconstruct the trigger times a perfect scheduler would emit for
    /// the first `steps` steps of `track` starting at `t0`.
    fn expected_times(track: &Pattern, steps: u64, t0: f64) -> Recorder {
        let mut rec = Recorder::default();
        for k in 0..steps {
            schedule_step(track, k, t0 + k as f64 * STEP_TIME, &mut rec);
        }
        rec
    }

    proptest! {
        /// However irregularly the poll fires, every step index is
        /// scheduled exactly once, at its exact grid time, in
        /// non-decreasing order.
        #[test]
        fn prop_irregular_polling_schedules_each_step_once(
            increments in proptest::collection::vec(0.001f64..0.4, 1..60),
        ) {
            let mut seq = started(10.0);
            let track = seq.track().unwrap();
            let mut rec = Recorder::default();

            let mut clock = 10.0;
            for inc in increments {
                clock += inc;
                seq.pump(clock, &mut rec);
            }

            let expected = expected_times(track, seq.current_step(), 10.1);
            assert_eq!(rec.kicks.len(), expected.kicks.len());
            for (got, want) in rec.kicks.iter().zip(&expected.kicks) {
                assert!((got - want).abs() < 1e-6);
            }
            assert_eq!(rec.hats.len(), expected.hats.len());
            for (got, want) in rec.hats.iter().zip(&expected.hats) {
                assert!((got.0 - want.0).abs() < 1e-6);
                assert_eq!(got.1, want.1);
            }
            assert_eq!(rec.basses.len(), expected.basses.len());
            for (got, want) in rec.basses.iter().zip(&expected.basses) {
                assert!((got.0 - want.0).abs() < 1e-6);
                assert_eq!(got.1, want.1);
                assert_eq!(got.2, want.2);
            }
            assert_eq!(rec.leads.len(), expected.leads.len());
            for (got, want) in rec.leads.iter().zip(&expected.leads) {
                assert!((got.0 - want.0).abs() < 1e-6);
                assert_eq!(got.1, want.1);
                assert_eq!(got.2, want.2);
            }

            // Non-decreasing trigger times
            for pair in rec.kicks.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
        }
    }
}
