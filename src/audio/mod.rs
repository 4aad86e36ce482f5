//! Audio system
//!
//! Procedurally generated sound effects and a looping melody - no external
//! files needed! Every cue is a stack of sine tones built fresh on each play;
//! the platform oscillator is single-use, so nothing is ever restarted.
//!
//! The synthesis graph sits behind [`AudioBackend`]: Web Audio in the browser,
//! [`OfflineBackend`] natively and in tests.

mod offline;
#[cfg(target_arch = "wasm32")]
mod web;

use std::collections::HashMap;

pub use offline::OfflineBackend;
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

/// Gain a cue starts at (scaled by volume)
pub const CUE_PEAK_GAIN: f32 = 0.3;
/// Gain a cue decays to
pub const CUE_FLOOR_GAIN: f32 = 0.01;

/// Background melody: D4 F4 A4 C5
pub const MELODY: [f32; 4] = [293.66, 349.23, 440.00, 523.25];
/// Seconds per melody note
pub const NOTE_SECONDS: f64 = 0.5;
/// Peak gain of a melody note
pub const NOTE_PEAK_GAIN: f32 = 0.2;
/// Attack of a melody note
pub const NOTE_ATTACK_SECONDS: f64 = 0.1;
/// Gain of the music bus feeding the master
pub const MUSIC_BUS_GAIN: f32 = 0.15;
/// How far ahead of the audio clock the next loop is queued
pub const MUSIC_LOOKAHEAD_SECONDS: f64 = 0.25;

/// Seconds per melody loop
pub fn melody_seconds() -> f64 {
    MELODY.len() as f64 * NOTE_SECONDS
}

/// Audio errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No audio context could be created (unsupported or blocked)
    Unavailable(String),
    /// A node could not be created or connected
    Graph(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Audio unavailable: {}", e),
            Self::Graph(e) => write!(f, "Audio graph error: {}", e),
        }
    }
}

impl std::error::Error for AudioError {}

/// Mix bus a tone is routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    /// Straight into the master gain
    Effects,
    /// Through the quieter music gain
    Music,
}

/// Gain envelope of a single tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope {
    /// Exponential decay from `peak` to `floor` over the tone
    Decay { peak: f32, floor: f32 },
    /// Linear rise 0 -> `peak` over `attack`, then linear fall to 0 at the end
    Swell { peak: f32, attack: f64 },
}

/// One scheduled sine tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    /// Audio clock time the tone starts
    pub start: f64,
    pub duration: f64,
    pub envelope: Envelope,
    pub bus: Bus,
}

impl Tone {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Platform synthesis surface
pub trait AudioBackend {
    /// Handle to a scheduled oscillator
    type Voice;

    /// Audio clock in seconds
    fn current_time(&self) -> f64;

    /// Build a fresh oscillator + gain for `tone` and schedule its start/stop
    fn schedule(&mut self, tone: &Tone) -> Result<Self::Voice, AudioError>;

    /// Stop a voice now; already-stopped voices are fine
    fn cancel(&mut self, voice: &Self::Voice);

    /// Master output gain
    fn set_master_gain(&mut self, gain: f32);

    /// Resume a suspended context (browsers require a user gesture)
    fn resume(&mut self) {}
}

/// Named cues the game plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Hit,
    Miss,
    PriceUp,
    PriceDown,
    PowerUp,
    GameOver,
}

impl Cue {
    pub const ALL: [Cue; 6] = [
        Cue::Hit,
        Cue::Miss,
        Cue::PriceUp,
        Cue::PriceDown,
        Cue::PowerUp,
        Cue::GameOver,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Cue::Hit => "hit",
            Cue::Miss => "miss",
            Cue::PriceUp => "priceUp",
            Cue::PriceDown => "priceDown",
            Cue::PowerUp => "powerup",
            Cue::GameOver => "gameover",
        }
    }

    /// (frequencies, seconds)
    fn definition(&self) -> (&'static [f32], f64) {
        match self {
            // Bright arpeggio
            Cue::Hit => (&[440.0, 880.0, 1760.0], 0.15),
            // Low thud
            Cue::Miss => (&[220.0, 110.0], 0.2),
            Cue::PriceUp => (&[440.0, 880.0, 1760.0, 2200.0], 0.3),
            Cue::PriceDown => (&[440.0, 220.0, 110.0], 0.3),
            Cue::PowerUp => (&[880.0, 1760.0, 2200.0], 0.25),
            // Descending octaves
            Cue::GameOver => (&[440.0, 220.0, 110.0, 55.0], 0.4),
        }
    }
}

/// Immutable cue definition
#[derive(Debug, Clone, PartialEq)]
pub struct CueDef {
    pub frequencies: Vec<f32>,
    pub duration: f64,
}

/// Looping melody scheduler state
struct Music<V> {
    playing: bool,
    /// Audio clock time the next loop starts
    next_loop_at: f64,
    /// Scheduled notes with their end times
    voices: Vec<(V, f64)>,
}

impl<V> Default for Music<V> {
    fn default() -> Self {
        Self {
            playing: false,
            next_loop_at: 0.0,
            voices: Vec::new(),
        }
    }
}

/// Sound engine for the game
pub struct SoundEngine<B: AudioBackend> {
    backend: B,
    cues: HashMap<String, CueDef>,
    volume: f32,
    muted: bool,
    music: Music<B::Voice>,
}

impl<B: AudioBackend> SoundEngine<B> {
    /// Wrap a backend and register the built-in cues
    pub fn new(backend: B) -> Self {
        let mut engine = Self {
            backend,
            cues: HashMap::new(),
            volume: 1.0,
            muted: false,
            music: Music::default(),
        };
        for cue in Cue::ALL {
            let (freqs, duration) = cue.definition();
            engine.define_sound(cue.name(), freqs, duration);
        }
        engine.apply_master_gain();
        engine
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Register (or replace) a cue
    pub fn define_sound(&mut self, name: &str, frequencies: &[f32], duration: f64) {
        self.cues.insert(
            name.to_string(),
            CueDef {
                frequencies: frequencies.to_vec(),
                duration,
            },
        );
    }

    pub fn cue(&self, name: &str) -> Option<&CueDef> {
        self.cues.get(name)
    }

    /// Play a cue by name; unknown names and mute are silent no-ops
    pub fn play(&mut self, name: &str) {
        if self.muted {
            return;
        }
        let Some(def) = self.cues.get(name) else {
            log::debug!("Unknown sound cue '{}'", name);
            return;
        };

        self.backend.resume();
        let now = self.backend.current_time();
        let envelope = Envelope::Decay {
            peak: CUE_PEAK_GAIN * self.volume,
            floor: CUE_FLOOR_GAIN,
        };
        for &frequency in &def.frequencies {
            let tone = Tone {
                frequency,
                start: now,
                duration: def.duration,
                envelope,
                bus: Bus::Effects,
            };
            if let Err(e) = self.backend.schedule(&tone) {
                log::warn!("Dropped '{}' tone: {}", name, e);
            }
        }
    }

    pub fn play_cue(&mut self, cue: Cue) {
        self.play(cue.name());
    }

    /// Start the background melody (no-op if already playing)
    pub fn start_music(&mut self) {
        if self.music.playing {
            return;
        }
        self.backend.resume();
        self.music.playing = true;
        self.music.next_loop_at = self.backend.current_time();
        self.pump_music();
        log::debug!("Music started");
    }

    /// Queue upcoming melody loops and forget finished notes
    pub fn pump_music(&mut self) {
        if !self.music.playing {
            return;
        }
        let now = self.backend.current_time();
        self.music.voices.retain(|(_, end)| *end > now);

        // Fell behind (e.g. a backgrounded tab): resync rather than burst
        if self.music.next_loop_at < now {
            self.music.next_loop_at = now;
        }
        while self.music.next_loop_at <= now + MUSIC_LOOKAHEAD_SECONDS {
            let loop_start = self.music.next_loop_at;
            self.queue_melody(loop_start);
            self.music.next_loop_at = loop_start + melody_seconds();
        }
    }

    fn queue_melody(&mut self, loop_start: f64) {
        for (i, &frequency) in MELODY.iter().enumerate() {
            let tone = Tone {
                frequency,
                start: loop_start + i as f64 * NOTE_SECONDS,
                duration: NOTE_SECONDS,
                envelope: Envelope::Swell {
                    peak: NOTE_PEAK_GAIN,
                    attack: NOTE_ATTACK_SECONDS,
                },
                bus: Bus::Music,
            };
            match self.backend.schedule(&tone) {
                Ok(voice) => self.music.voices.push((voice, tone.end())),
                Err(e) => log::warn!("Dropped melody note: {}", e),
            }
        }
    }

    /// Stop the melody and silence every scheduled note
    pub fn stop_music(&mut self) {
        if !self.music.playing {
            return;
        }
        for (voice, _) in self.music.voices.drain(..) {
            self.backend.cancel(&voice);
        }
        self.music.playing = false;
        log::debug!("Music stopped");
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.playing
    }

    /// Notes currently queued or sounding
    pub fn scheduled_notes(&self) -> usize {
        self.music.voices.len()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_volume(&mut self, vol: f32) {
        self.volume = vol.clamp(0.0, 1.0);
        self.apply_master_gain();
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mute/unmute all audio; the melody keeps its schedule
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.apply_master_gain();
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            self.toggle_mute();
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    fn apply_master_gain(&mut self) {
        let gain = self.effective_volume();
        self.backend.set_master_gain(gain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SoundEngine<OfflineBackend> {
        SoundEngine::new(OfflineBackend::new())
    }

    #[test]
    fn test_builtin_cues_registered() {
        let engine = engine();
        for cue in Cue::ALL {
            assert!(engine.cue(cue.name()).is_some(), "{}", cue.name());
        }
        assert_eq!(engine.cue("gameover").unwrap().frequencies.len(), 4);
    }

    #[test]
    fn test_play_schedules_fresh_tones() {
        let mut engine = engine();
        engine.play("hit");
        engine.play("hit");

        let tones = &engine.backend().scheduled;
        assert_eq!(tones.len(), 6);
        assert_eq!(engine.backend().voices_created(), 6);
        let first = tones[0];
        assert_eq!(first.frequency, 440.0);
        assert_eq!(first.duration, 0.15);
        assert_eq!(
            first.envelope,
            Envelope::Decay {
                peak: CUE_PEAK_GAIN,
                floor: CUE_FLOOR_GAIN
            }
        );
    }

    #[test]
    fn test_play_unknown_is_noop() {
        let mut engine = engine();
        engine.play("nope");
        assert!(engine.backend().scheduled.is_empty());
    }

    #[test]
    fn test_redefine_replaces() {
        let mut engine = engine();
        engine.define_sound("hit", &[100.0], 0.5);
        engine.play("hit");
        assert_eq!(engine.backend().scheduled.len(), 1);
        assert_eq!(engine.backend().scheduled[0].frequency, 100.0);
    }

    #[test]
    fn test_volume_clamped_and_scales_cues() {
        let mut engine = engine();
        engine.set_volume(3.0);
        assert_eq!(engine.volume(), 1.0);
        engine.set_volume(-1.0);
        assert_eq!(engine.volume(), 0.0);
        assert_eq!(engine.backend().master_gain, 0.0);

        engine.set_volume(0.5);
        engine.play_cue(Cue::Miss);
        let Envelope::Decay { peak, .. } = engine.backend().scheduled[0].envelope else {
            panic!("cue tones decay");
        };
        assert!((peak - 0.15).abs() < 1e-6);
        assert_eq!(engine.backend().master_gain, 0.5);
    }

    #[test]
    fn test_mute_silences_without_stopping_music() {
        let mut engine = engine();
        engine.set_volume(0.8);
        engine.start_music();

        assert!(engine.toggle_mute());
        assert_eq!(engine.backend().master_gain, 0.0);
        assert!(engine.is_music_playing());

        engine.play("hit");
        assert_eq!(engine.backend().scheduled.iter().filter(|t| t.bus == Bus::Effects).count(), 0);

        assert!(!engine.toggle_mute());
        assert_eq!(engine.backend().master_gain, 0.8);
    }

    #[test]
    fn test_music_loops_until_stopped() {
        let mut engine = engine();
        engine.start_music();
        engine.start_music();
        assert_eq!(engine.scheduled_notes(), MELODY.len());

        // Just before the first loop ends the next one is queued
        engine.backend_mut().advance(melody_seconds() - 0.1);
        engine.pump_music();
        let melody_tones = engine
            .backend()
            .scheduled
            .iter()
            .filter(|t| t.bus == Bus::Music)
            .count();
        assert_eq!(melody_tones, MELODY.len() * 2);
        let second_loop = engine.backend().scheduled[MELODY.len()];
        assert!((second_loop.start - melody_seconds()).abs() < 1e-9);

        engine.stop_music();
        assert!(!engine.is_music_playing());
        assert_eq!(engine.scheduled_notes(), 0);
        assert!(engine.backend().cancelled > 0);

        let cancelled = engine.backend().cancelled;
        engine.stop_music();
        assert_eq!(engine.backend().cancelled, cancelled);
    }

    #[test]
    fn test_music_resyncs_after_stall() {
        let mut engine = engine();
        engine.start_music();
        engine.backend_mut().advance(30.0);
        engine.pump_music();
        let last = engine.backend().scheduled.last().copied().unwrap();
        assert!(last.start >= 30.0);
        // Stale notes were dropped, only the fresh loop remains
        assert_eq!(engine.scheduled_notes(), MELODY.len());
    }

    #[test]
    fn test_error_display() {
        let e = AudioError::Unavailable("blocked".into());
        assert_eq!(e.to_string(), "Audio unavailable: blocked");
    }
}
