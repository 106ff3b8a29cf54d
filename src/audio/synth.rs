//! Web Audio instrument bank
//!
//! Four fire-and-forget voices plus the countdown beep. Every voice builds
//! its own node chain, connects to a shared compressor bus, and schedules
//! its own envelope end; nothing needs explicit cleanup. The audio context
//! is created lazily and every trigger guards on it, so a browser without
//! (or refusing) audio degrades to silence instead of breaking gameplay.

use web_sys::{
    AudioBuffer, AudioContext, AudioContextState, BiquadFilterType, DelayNode,
    DynamicsCompressorNode, GainNode, OscillatorNode, OscillatorType,
};

use super::sequencer::{NoteSink, SECONDS_PER_BEAT};

/// Master gain while music plays
const MUSIC_LEVEL: f32 = 0.4;
/// Fade lengths (seconds)
const FADE_IN: f64 = 1.0;
const FADE_OUT: f64 = 0.1;

pub struct Synth {
    ctx: Option<AudioContext>,
    master: Option<GainNode>,
    compressor: Option<DynamicsCompressorNode>,
    noise_buffer: Option<AudioBuffer>,
    /// Lead delay effect, built once on first use
    delay: Option<DelayNode>,
    music_volume: f32,
    muted: bool,
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}

impl Synth {
    pub fn new() -> Self {
        Self {
            ctx: None,
            master: None,
            compressor: None,
            noise_buffer: None,
            delay: None,
            music_volume: MUSIC_LEVEL,
            muted: false,
        }
    }

    /// Set music volume (0.0 - 1.0 of the master level)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = (vol.clamp(0.0, 1.0)) * MUSIC_LEVEL;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn target_level(&self) -> f32 {
        if self.muted { 0.0 } else { self.music_volume }
    }

    /// Lazily create the context and the compressor -> master bus.
    fn ensure_context(&mut self) {
        if self.ctx.is_some() {
            return;
        }
        let Ok(ctx) = AudioContext::new() else {
            log::warn!("failed to create AudioContext - audio disabled");
            return;
        };

        let chain = (|| {
            let master = ctx.create_gain().ok()?;
            master.gain().set_value(MUSIC_LEVEL);

            let compressor = ctx.create_dynamics_compressor().ok()?;
            compressor.threshold().set_value(-24.0);
            compressor.knee().set_value(30.0);
            compressor.ratio().set_value(12.0);
            compressor.attack().set_value(0.003);
            compressor.release().set_value(0.25);

            compressor.connect_with_audio_node(&master).ok()?;
            master.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((master, compressor))
        })();

        match chain {
            Some((master, compressor)) => {
                self.master = Some(master);
                self.compressor = Some(compressor);
                self.ctx = Some(ctx);
            }
            None => log::warn!("failed to build audio bus - audio disabled"),
        }
    }

    /// Resume a suspended context (browsers require a user gesture).
    /// Returns whether audio is ready for scheduling.
    pub fn ensure_ready(&mut self) -> bool {
        self.ensure_context();
        let Some(ctx) = &self.ctx else { return false };
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        true
    }

    /// Audio-clock time in seconds, if a context exists.
    pub fn current_time(&self) -> Option<f64> {
        self.ctx.as_ref().map(|ctx| ctx.current_time())
    }

    /// Fade the master in for playback start.
    pub fn fade_in(&mut self) {
        if !self.ensure_ready() {
            return;
        }
        let (Some(ctx), Some(master)) = (&self.ctx, &self.master) else {
            return;
        };
        let now = ctx.current_time();
        let gain = master.gain();
        let _ = gain.cancel_scheduled_values(now);
        gain.set_value_at_time(0.0, now).ok();
        gain.linear_ramp_to_value_at_time(self.target_level(), now + FADE_IN)
            .ok();
    }

    /// Short fade to silence for pause/stop.
    pub fn fade_out(&self) {
        let (Some(ctx), Some(master)) = (&self.ctx, &self.master) else {
            return;
        };
        let now = ctx.current_time();
        let gain = master.gain();
        let _ = gain.cancel_scheduled_values(now);
        gain.linear_ramp_to_value_at_time(0.0, now + FADE_OUT).ok();
    }

    /// UI beep for the countdown; routed straight to the destination so it
    /// is audible while the music bus is faded down.
    pub fn beep(&mut self, freq: f32, duration_ms: f64) {
        if !self.ensure_ready() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        let Some((osc, gain)) = make_osc(ctx, freq, OscillatorType::Sine) else {
            return;
        };
        if gain.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        let t = ctx.current_time();
        let dur = duration_ms / 1000.0;
        gain.gain().set_value_at_time(0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + dur)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + dur).ok();
    }

    /// Two seconds of white noise, generated once for the hats.
    fn noise(&mut self) -> Option<AudioBuffer> {
        if let Some(buffer) = &self.noise_buffer {
            return Some(buffer.clone());
        }
        let ctx = self.ctx.as_ref()?;
        let rate = ctx.sample_rate();
        let len = (rate * 2.0) as u32;
        let buffer = ctx.create_buffer(1, len, rate).ok()?;
        let mut data = vec![0.0f32; len as usize];
        for sample in data.iter_mut() {
            *sample = (js_sys::Math::random() * 2.0 - 1.0) as f32;
        }
        buffer.copy_to_channel(&mut data, 0).ok()?;
        self.noise_buffer = Some(buffer.clone());
        Some(buffer)
    }

    /// Dotted-8th delay loop for the lead, built once and reused.
    fn delay_send(&mut self) -> Option<DelayNode> {
        if let Some(delay) = &self.delay {
            return Some(delay.clone());
        }
        let ctx = self.ctx.as_ref()?;
        let master = self.master.as_ref()?;

        let delay = ctx.create_delay().ok()?;
        delay.delay_time().set_value((SECONDS_PER_BEAT * 0.75) as f32);

        let feedback = ctx.create_gain().ok()?;
        feedback.gain().set_value(0.4);

        let feedback_filter = ctx.create_biquad_filter().ok()?;
        feedback_filter.set_type(BiquadFilterType::Lowpass);
        feedback_filter.frequency().set_value(1200.0);

        delay.connect_with_audio_node(&feedback).ok()?;
        feedback.connect_with_audio_node(&feedback_filter).ok()?;
        feedback_filter.connect_with_audio_node(&delay).ok()?;
        delay.connect_with_audio_node(master).ok()?;

        self.delay = Some(delay.clone());
        Some(delay)
    }
}

/// Oscillator feeding its own gain, not yet routed anywhere.
fn make_osc(ctx: &AudioContext, freq: f32, kind: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;
    osc.set_type(kind);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    Some((osc, gain))
}

impl NoteSink for Synth {
    /// Punchy sine sweep: 150 Hz dropping to nothing over half a second.
    fn kick(&mut self, time: f64) {
        let (Some(ctx), Some(compressor)) = (&self.ctx, &self.compressor) else {
            return;
        };
        let Some((osc, gain)) = make_osc(ctx, 150.0, OscillatorType::Sine) else {
            return;
        };
        if gain.connect_with_audio_node(compressor).is_err() {
            return;
        }

        osc.frequency().set_value_at_time(150.0, time).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(0.01, time + 0.5)
            .ok();
        gain.gain().set_value_at_time(1.0, time).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, time + 0.5)
            .ok();

        osc.start_with_when(time).ok();
        osc.stop_with_when(time + 0.5).ok();
    }

    /// Bandpassed noise burst; the open variant rings longer and louder.
    fn hi_hat(&mut self, time: f64, open: bool) {
        let Some(buffer) = self.noise() else { return };
        let (Some(ctx), Some(compressor)) = (&self.ctx, &self.compressor) else {
            return;
        };

        let trigger = (|| {
            let source = ctx.create_buffer_source().ok()?;
            source.set_buffer(Some(&buffer));

            let filter = ctx.create_biquad_filter().ok()?;
            filter.set_type(BiquadFilterType::Bandpass);
            filter.frequency().set_value(4000.0);
            filter.q().set_value(1.0);

            let gain = ctx.create_gain().ok()?;
            let duration = if open { 0.4 } else { 0.05 };
            let volume = if open { 0.4 } else { 0.3 };
            gain.gain().set_value_at_time(volume, time).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, time + duration)
                .ok()?;

            source.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(compressor).ok()?;

            source.start_with_when(time).ok()?;
            source.stop_with_when(time + duration).ok()?;
            Some(())
        })();
        let _ = trigger;
    }

    /// Low sawtooth with a rising-then-falling filter sweep.
    fn bass(&mut self, time: f64, freq: f32, duration: f64) {
        let (Some(ctx), Some(compressor)) = (&self.ctx, &self.compressor) else {
            return;
        };

        let trigger = (|| {
            let osc = ctx.create_oscillator().ok()?;
            osc.set_type(OscillatorType::Sawtooth);
            osc.frequency().set_value(freq);

            let filter = ctx.create_biquad_filter().ok()?;
            filter.set_type(BiquadFilterType::Lowpass);
            filter.q().set_value(5.0);
            filter.frequency().set_value_at_time(150.0, time).ok()?;
            filter
                .frequency()
                .linear_ramp_to_value_at_time(600.0, time + 0.1)
                .ok()?;
            filter
                .frequency()
                .exponential_ramp_to_value_at_time(150.0, time + duration - 0.05)
                .ok()?;

            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value_at_time(0.4, time).ok()?;
            gain.gain()
                .linear_ramp_to_value_at_time(0.3, time + 0.1)
                .ok()?;
            gain.gain()
                .linear_ramp_to_value_at_time(0.0, time + duration)
                .ok()?;

            osc.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(compressor).ok()?;

            osc.start_with_when(time).ok()?;
            osc.stop_with_when(time + duration).ok()?;
            Some(())
        })();
        let _ = trigger;
    }

    /// Two detuned squares, lowpassed, split dry plus into the delay loop.
    fn lead(&mut self, time: f64, freq: f32, duration: f64) {
        let delay = self.delay_send();
        let (Some(ctx), Some(compressor)) = (&self.ctx, &self.compressor) else {
            return;
        };

        let trigger = (|| {
            let osc1 = ctx.create_oscillator().ok()?;
            let osc2 = ctx.create_oscillator().ok()?;
            osc1.set_type(OscillatorType::Square);
            osc2.set_type(OscillatorType::Square);
            osc1.frequency().set_value(freq);
            osc2.frequency().set_value(freq * 1.01);

            let filter = ctx.create_biquad_filter().ok()?;
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value(1000.0);
            filter.q().set_value(1.0);

            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value_at_time(0.15, time).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, time + duration)
                .ok()?;

            osc1.connect_with_audio_node(&filter).ok()?;
            osc2.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(compressor).ok()?;
            if let Some(delay) = &delay {
                gain.connect_with_audio_node(delay).ok()?;
            }

            osc1.start_with_when(time).ok()?;
            osc2.start_with_when(time).ok()?;
            osc1.stop_with_when(time + duration).ok()?;
            osc2.stop_with_when(time + duration).ok()?;
            Some(())
        })();
        let _ = trigger;
    }
}
