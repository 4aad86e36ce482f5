//! Session controller
//!
//! Owns the game state, the sound engine and the view sink, and exposes one
//! entry point per external stimulus (timer ticks, animation frames, clicks,
//! buttons). Drivers outside this module only decide *when* to call them;
//! every entry point re-checks the phase, so a tick delivered after a phase
//! change is a no-op.

use glam::Vec2;

use crate::audio::{AudioBackend, Cue, SoundEngine};
use crate::consts::*;
use crate::hud::Hud;
use crate::renderer::{Painter, draw_frame};
use crate::settings::Settings;
use crate::sim::{
    CountdownStep, GamePhase, GameState, Hit, PriceJump, SessionSummary, resolve_click,
    spawn_target, step_frame,
};

pub struct GameLoop<B: AudioBackend, H: Hud> {
    state: GameState,
    sound: SoundEngine<B>,
    hud: H,
    settings: Settings,
    /// Timestamp of the last frame that ran
    last_frame: Option<f64>,
    /// Whether the view currently carries a shake offset
    shake_applied: bool,
}

impl<B: AudioBackend, H: Hud> GameLoop<B, H> {
    pub fn new(seed: u64, width: f32, height: f32, backend: B, hud: H, settings: Settings) -> Self {
        let state = GameState::with_star_density(
            seed,
            width,
            height,
            settings.quality.star_density_scale(),
        );

        let mut sound = SoundEngine::new(backend);
        sound.set_volume(settings.volume);
        sound.set_muted(settings.muted);

        let mut game = Self {
            state,
            sound,
            hud,
            settings,
            last_frame: None,
            shake_applied: false,
        };
        game.hud.show_muted(game.sound.is_muted());
        game.push_session_view();
        game.hud.show_phase(GamePhase::Idle);
        game
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == GamePhase::Running
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn sound(&self) -> &SoundEngine<B> {
        &self.sound
    }

    pub fn sound_mut(&mut self) -> &mut SoundEngine<B> {
        &mut self.sound
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut H {
        &mut self.hud
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Begin a new session: reset and enter the countdown
    ///
    /// Ignored while a countdown or session is already in progress.
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Idle | GamePhase::Ended => {}
            phase => {
                log::debug!("Start ignored in {:?}", phase);
                return false;
            }
        }

        self.state.reset_session();
        self.state.phase = GamePhase::Countdown;
        self.state.countdown_remaining = COUNTDOWN_STEPS;
        self.last_frame = None;
        self.clear_shake();

        self.push_session_view();
        self.hud.show_phase(GamePhase::Countdown);
        self.hud
            .show_countdown(CountdownStep::from_remaining(self.state.countdown_remaining));
        log::info!("Session starting");
        true
    }

    /// One countdown timer tick; enters Running after "GO"
    pub fn countdown_tick(&mut self, now_ms: f64) -> GamePhase {
        if self.state.phase != GamePhase::Countdown {
            return self.state.phase;
        }

        self.state.countdown_remaining = self.state.countdown_remaining.saturating_sub(1);
        match CountdownStep::from_remaining(self.state.countdown_remaining) {
            Some(step) => self.hud.show_countdown(Some(step)),
            None => self.enter_running(now_ms),
        }
        self.state.phase
    }

    fn enter_running(&mut self, now_ms: f64) {
        self.state.phase = GamePhase::Running;
        self.state.last_price_update = now_ms;
        self.last_frame = None;
        self.sound.start_music();

        // Opening target; the spawner's first tick comes a second later
        spawn_target(&mut self.state);

        self.hud.show_countdown(None);
        self.hud.show_phase(GamePhase::Running);
        self.push_session_view();
        log::info!("Session running ({}s)", self.state.time_left);
    }

    /// Run one animation frame if the throttle allows
    ///
    /// Returns whether the frame was simulated and drawn.
    pub fn frame(&mut self, now_ms: f64, painter: &mut impl Painter) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(last) = self.last_frame {
            if now_ms - last < FRAME_INTERVAL_MS {
                return false;
            }
        }
        self.last_frame = Some(now_ms);

        let outcome = step_frame(&mut self.state, now_ms);

        if let Some(update) = outcome.price {
            self.hud
                .show_price(update.value, &self.state.price_history);
            match update.jump() {
                Some(PriceJump::Up) => self.sound.play_cue(Cue::PriceUp),
                Some(PriceJump::Down) => self.sound.play_cue(Cue::PriceDown),
                None => {}
            }
        }

        let shaking = self.state.shake.is_active();
        if shaking || self.shake_applied {
            self.hud.shake(self.state.shake.offset);
        }
        self.shake_applied = shaking;

        draw_frame(&self.state, painter, now_ms, self.settings.quality.twinkle());
        self.sound.pump_music();
        true
    }

    /// Spawner tick: add one target while Running
    pub fn spawn_tick(&mut self) -> Option<u32> {
        if !self.is_running() {
            return None;
        }
        Some(spawn_target(&mut self.state))
    }

    /// Session clock tick; ends the session at zero
    pub fn timer_tick(&mut self) -> GamePhase {
        if !self.is_running() {
            return self.state.phase;
        }

        self.state.time_left = self.state.time_left.saturating_sub(1);
        self.hud.show_time(self.state.time_left);
        if self.state.time_left == 0 {
            self.end_session();
        }
        self.state.phase
    }

    /// Click/tap at canvas coordinates
    pub fn handle_click(&mut self, x: f32, y: f32) -> Option<Hit> {
        if !self.is_running() {
            return None;
        }

        let Some(hit) = resolve_click(&mut self.state, Vec2::new(x, y)) else {
            self.sound.play_cue(Cue::Miss);
            return None;
        };

        self.hud.show_score(self.state.score);
        self.sound.play_cue(Cue::Hit);
        if self.settings.effective_screen_shake() {
            self.state.shake.trigger();
        }
        if self.settings.haptics {
            self.hud.vibrate(VIBRATE_MS);
        }
        log::debug!("Hit {:?} for {} points", hit.kind, hit.points);
        Some(hit)
    }

    /// Stop button: end the session early
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.end_session();
        true
    }

    /// Return to the start screen; a running session is stopped first
    pub fn home(&mut self) {
        if self.is_running() {
            self.end_session();
        }
        self.state.phase = GamePhase::Idle;
        self.state.countdown_remaining = 0;
        self.state.targets.clear();
        self.state.particles.clear();
        self.clear_shake();

        self.hud.show_countdown(None);
        self.hud.show_phase(GamePhase::Idle);
    }

    fn end_session(&mut self) {
        self.state.phase = GamePhase::Ended;
        self.sound.stop_music();
        self.sound.play_cue(Cue::GameOver);
        self.clear_shake();

        let summary = self.state.summary();
        self.hud.show_summary(&summary);
        self.hud.show_phase(GamePhase::Ended);
        log_summary(&summary);
    }

    fn clear_shake(&mut self) {
        self.state.shake.clear();
        if self.shake_applied {
            self.hud.shake(Vec2::ZERO);
            self.shake_applied = false;
        }
    }

    fn push_session_view(&mut self) {
        self.hud.show_score(self.state.score);
        self.hud.show_time(self.state.time_left);
        self.hud
            .show_price(self.state.bitcoin_value, &self.state.price_history);
    }

    /// Mute toggle; returns the new muted state
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.sound.toggle_mute();
        self.hud.show_muted(muted);
        log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        muted
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sound.set_volume(volume);
    }

    /// Canvas resized (pixels)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }
}

fn log_summary(summary: &SessionSummary) {
    match serde_json::to_string(summary) {
        Ok(json) => log::info!("Session over: {}", json),
        Err(e) => log::warn!("Session over (summary not serializable: {})", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineBackend;
    use crate::renderer::NullPainter;
    use crate::sim::{PriceHistory, Target, TargetKind};

    #[derive(Debug, Default)]
    struct TestHud {
        phases: Vec<GamePhase>,
        countdown: Vec<Option<CountdownStep>>,
        score: u64,
        time: u32,
        prices: Vec<f32>,
        summaries: Vec<SessionSummary>,
        shakes: Vec<Vec2>,
        vibrations: u32,
        muted: bool,
    }

    impl Hud for TestHud {
        fn show_phase(&mut self, phase: GamePhase) {
            self.phases.push(phase);
        }
        fn show_countdown(&mut self, step: Option<CountdownStep>) {
            self.countdown.push(step);
        }
        fn show_score(&mut self, score: u64) {
            self.score = score;
        }
        fn show_time(&mut self, seconds: u32) {
            self.time = seconds;
        }
        fn show_price(&mut self, value: f32, _history: &PriceHistory) {
            self.prices.push(value);
        }
        fn show_summary(&mut self, summary: &SessionSummary) {
            self.summaries.push(*summary);
        }
        fn show_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
        fn shake(&mut self, offset: Vec2) {
            self.shakes.push(offset);
        }
        fn vibrate(&mut self, _millis: u32) {
            self.vibrations += 1;
        }
    }

    type TestGame = GameLoop<OfflineBackend, TestHud>;

    fn new_game(settings: Settings) -> TestGame {
        GameLoop::new(99, 800.0, 600.0, OfflineBackend::new(), TestHud::default(), settings)
    }

    fn running_game() -> TestGame {
        let mut game = new_game(Settings::default());
        assert!(game.start());
        for _ in 0..COUNTDOWN_STEPS {
            game.countdown_tick(0.0);
        }
        assert!(game.is_running());
        game
    }

    fn place(game: &mut TestGame, kind: TargetKind, x: f32, y: f32) {
        let id = game.state.next_entity_id();
        game.state.targets.push(Target {
            id,
            pos: Vec2::new(x, y),
            kind,
            radius: TARGET_RADIUS,
            speed: 2.0,
            rotation: 0.0,
        });
    }

    #[test]
    fn test_countdown_sequence() {
        let mut game = new_game(Settings::default());
        game.start();
        assert_eq!(game.phase(), GamePhase::Countdown);

        assert_eq!(game.countdown_tick(0.0), GamePhase::Countdown);
        assert_eq!(game.countdown_tick(0.0), GamePhase::Countdown);
        assert_eq!(game.countdown_tick(0.0), GamePhase::Countdown);
        assert_eq!(game.countdown_tick(500.0), GamePhase::Running);

        assert_eq!(
            game.hud().countdown,
            vec![
                Some(CountdownStep::Three),
                Some(CountdownStep::Two),
                Some(CountdownStep::One),
                Some(CountdownStep::Go),
                None,
            ]
        );
        assert_eq!(game.state().last_price_update, 500.0);
        assert!(game.sound().is_music_playing());
    }

    #[test]
    fn test_running_opens_with_one_target() {
        let mut game = new_game(Settings::default());
        game.start();
        for _ in 0..COUNTDOWN_STEPS - 1 {
            game.countdown_tick(0.0);
            assert!(game.state().targets.is_empty());
        }
        game.countdown_tick(0.0);
        assert!(game.is_running());
        assert_eq!(game.state().targets.len(), 1);

        // Still there after a second of frames, before any spawner tick
        let mut now = 0.0;
        for _ in 0..58 {
            now += 17.0;
            game.frame(now, &mut NullPainter);
        }
        assert_eq!(game.state().targets.len(), 1);
        assert_eq!(game.state().time_left, SESSION_SECONDS);
    }

    #[test]
    fn test_start_ignored_while_busy() {
        let mut game = running_game();
        assert!(!game.start());
        assert_eq!(game.phase(), GamePhase::Running);
    }

    #[test]
    fn test_ticks_ignored_outside_running() {
        let mut game = new_game(Settings::default());
        assert_eq!(game.spawn_tick(), None);
        assert_eq!(game.timer_tick(), GamePhase::Idle);
        assert_eq!(game.handle_click(10.0, 10.0), None);
        assert!(!game.frame(100.0, &mut NullPainter));
        assert_eq!(game.state().time_left, SESSION_SECONDS);
        assert!(game.sound().backend().scheduled.is_empty());
    }

    #[test]
    fn test_frames_are_throttled() {
        let mut game = running_game();
        assert!(game.frame(1000.0, &mut NullPainter));
        assert!(!game.frame(1010.0, &mut NullPainter));
        assert!(game.frame(1017.0, &mut NullPainter));
    }

    #[test]
    fn test_hit_scores_and_gives_feedback() {
        let mut game = running_game();
        place(&mut game, TargetKind::Dollar, 200.0, 200.0);

        let hit = game.handle_click(205.0, 195.0).unwrap();
        assert_eq!(hit.points, 1);
        assert_eq!(game.hud().score, 1);
        assert_eq!(game.hud().vibrations, 1);
        assert!(game.state().shake.is_active());
        assert_eq!(game.sound().backend().count_frequency(1760.0), 1);
    }

    #[test]
    fn test_miss_plays_miss_cue() {
        let mut game = running_game();
        assert_eq!(game.handle_click(5.0, 5.0), None);
        assert_eq!(game.sound().backend().count_frequency(110.0), 1);
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn test_shake_reaches_view_and_resets() {
        let mut game = running_game();
        place(&mut game, TargetKind::Dollar, 200.0, 200.0);
        game.handle_click(200.0, 200.0);

        game.frame(1000.0, &mut NullPainter);
        game.frame(1200.0, &mut NullPainter);
        game.frame(1300.0, &mut NullPainter);

        let shakes = &game.hud().shakes;
        assert_eq!(shakes.len(), 2);
        assert_eq!(shakes[1], Vec2::ZERO);
    }

    #[test]
    fn test_reduced_motion_and_haptics_off() {
        let settings = Settings {
            reduced_motion: true,
            haptics: false,
            ..Default::default()
        };
        let mut game = new_game(settings);
        game.start();
        for _ in 0..COUNTDOWN_STEPS {
            game.countdown_tick(0.0);
        }
        place(&mut game, TargetKind::Bitcoin, 100.0, 100.0);
        assert!(game.handle_click(100.0, 100.0).is_some());
        assert!(!game.state().shake.is_active());
        assert_eq!(game.hud().vibrations, 0);
    }

    #[test]
    fn test_timer_ends_session() {
        let mut game = running_game();
        for _ in 0..SESSION_SECONDS - 1 {
            assert_eq!(game.timer_tick(), GamePhase::Running);
        }
        assert_eq!(game.timer_tick(), GamePhase::Ended);
        assert_eq!(game.hud().time, 0);
        assert_eq!(game.hud().summaries.len(), 1);
        assert!(!game.sound().is_music_playing());
        assert_eq!(game.sound().backend().count_frequency(55.0), 1);

        // Late tick after the end is ignored
        assert_eq!(game.timer_tick(), GamePhase::Ended);
        assert_eq!(game.sound().backend().count_frequency(55.0), 1);
    }

    #[test]
    fn test_stop_and_restart() {
        let mut game = running_game();
        place(&mut game, TargetKind::Dollar, 50.0, 50.0);
        game.handle_click(50.0, 50.0);

        assert!(game.stop());
        assert!(!game.stop());
        assert_eq!(game.hud().summaries[0].score, 1);

        assert!(game.start());
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().time_left, SESSION_SECONDS);
        assert!(game.state().targets.is_empty());
    }

    #[test]
    fn test_home_from_running_stops_first() {
        let mut game = running_game();
        game.home();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(!game.sound().is_music_playing());
        assert_eq!(game.hud().summaries.len(), 1);
        assert_eq!(game.sound().backend().count_frequency(55.0), 1);
        assert_eq!(game.hud().phases.last(), Some(&GamePhase::Idle));

        // Already idle: nothing more to stop
        game.home();
        assert_eq!(game.sound().backend().count_frequency(55.0), 1);
    }

    #[test]
    fn test_home_during_countdown() {
        let mut game = new_game(Settings::default());
        game.start();
        game.countdown_tick(0.0);
        game.home();
        assert_eq!(game.countdown_tick(0.0), GamePhase::Idle);
        assert_eq!(game.hud().countdown.last(), Some(&None));
    }

    #[test]
    fn test_mute_silences_cues() {
        let mut game = running_game();
        let before = game.sound().backend().scheduled.len();
        assert!(game.toggle_mute());
        assert!(game.hud().muted);
        game.handle_click(5.0, 5.0);
        assert_eq!(game.sound().backend().scheduled.len(), before);
    }

    #[test]
    fn test_start_muted_setting() {
        let game = new_game(Settings {
            muted: true,
            ..Default::default()
        });
        assert!(game.sound().is_muted());
        assert!(game.hud().muted);
    }

    #[test]
    fn test_resize_moves_spawn_bounds() {
        let mut game = new_game(Settings::default());
        game.resize(100.0, 300.0);
        game.start();
        for _ in 0..COUNTDOWN_STEPS {
            game.countdown_tick(0.0);
        }
        for _ in 0..20 {
            game.spawn_tick();
        }
        assert!(game.state().targets.iter().all(|t| t.pos.x >= 20.0 && t.pos.x <= 80.0));
    }

    #[test]
    fn test_price_updates_reach_view() {
        let mut game = running_game();
        let before = game.hud().prices.len();
        game.frame(1000.0, &mut NullPainter);
        game.frame(2000.0, &mut NullPainter);
        assert_eq!(game.hud().prices.len(), before + 1);
        assert_eq!(game.hud().prices.last(), Some(&game.state().bitcoin_value));
    }
}
