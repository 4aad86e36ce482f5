//! Web Audio backend

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use super::{AudioBackend, AudioError, Bus, Envelope, MUSIC_BUS_GAIN, Tone};

/// Fade applied when a voice is cut short (avoids a click)
const CANCEL_FADE_SECONDS: f64 = 0.02;

fn js_err(e: wasm_bindgen::JsValue) -> String {
    format!("{:?}", e)
}

pub struct WebAudioBackend {
    ctx: AudioContext,
    master: GainNode,
    music: GainNode,
}

impl WebAudioBackend {
    /// Create the context and the master/music buses
    ///
    /// Fails if the browser refuses an AudioContext; the game has no silent
    /// fallback.
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(js_err(e)))?;

        let master = ctx.create_gain().map_err(|e| AudioError::Graph(js_err(e)))?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| AudioError::Graph(js_err(e)))?;

        let music = ctx.create_gain().map_err(|e| AudioError::Graph(js_err(e)))?;
        music.gain().set_value(MUSIC_BUS_GAIN);
        music
            .connect_with_audio_node(&master)
            .map_err(|e| AudioError::Graph(js_err(e)))?;

        log::info!("AudioContext ready ({} Hz)", ctx.sample_rate());
        Ok(Self { ctx, master, music })
    }

    /// Create an oscillator with gain envelope, wired into `bus`
    fn create_osc(&self, freq: f32, bus: Bus) -> Result<(OscillatorNode, GainNode), AudioError> {
        let osc = self
            .ctx
            .create_oscillator()
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        let gain = self
            .ctx
            .create_gain()
            .map_err(|e| AudioError::Graph(js_err(e)))?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain)
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        let out = match bus {
            Bus::Effects => &self.master,
            Bus::Music => &self.music,
        };
        gain.connect_with_audio_node(out)
            .map_err(|e| AudioError::Graph(js_err(e)))?;

        Ok((osc, gain))
    }
}

impl AudioBackend for WebAudioBackend {
    type Voice = (OscillatorNode, GainNode);

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn schedule(&mut self, tone: &Tone) -> Result<Self::Voice, AudioError> {
        let (osc, gain) = self.create_osc(tone.frequency, tone.bus)?;
        let t = tone.start;
        let end = tone.end();

        match tone.envelope {
            Envelope::Decay { peak, floor } => {
                // Exponential ramps can't start at 0
                gain.gain().set_value_at_time(peak.max(floor), t).ok();
                gain.gain().exponential_ramp_to_value_at_time(floor, end).ok();
            }
            Envelope::Swell { peak, attack } => {
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(peak, t + attack)
                    .ok();
                gain.gain().linear_ramp_to_value_at_time(0.0, end).ok();
            }
        }

        osc.start_with_when(t)
            .map_err(|e| AudioError::Graph(js_err(e)))?;
        osc.stop_with_when(end).ok();
        Ok((osc, gain))
    }

    fn cancel(&mut self, (osc, gain): &Self::Voice) {
        let t = self.ctx.current_time();
        gain.gain().cancel_scheduled_values(t).ok();
        gain.gain().set_value_at_time(gain.gain().value(), t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(0.0, t + CANCEL_FADE_SECONDS)
            .ok();
        // Throws if already stopped - that's fine
        osc.stop_with_when(t + CANCEL_FADE_SECONDS).ok();
    }

    fn set_master_gain(&mut self, gain: f32) {
        let t = self.ctx.current_time();
        self.master.gain().set_value_at_time(gain, t).ok();
    }

    fn resume(&mut self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }
}
