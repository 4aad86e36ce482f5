//! Per-frame simulation step, spawning and click resolution
//!
//! Movement is in pixels per frame; the caller throttles how often frames run.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::hit::pick_target;
use super::price::{PriceUpdate, next_price};
use super::state::{GamePhase, GameState, Particle, Target, TargetKind};
use crate::consts::*;

/// What happened during one frame step
#[derive(Debug, Clone, Default)]
pub struct FrameOutcome {
    /// Set when the price clock fired this frame
    pub price: Option<PriceUpdate>,
    /// Targets that fell out of view
    pub despawned: usize,
}

/// A successful click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target_id: u32,
    pub kind: TargetKind,
    pub points: u64,
    pub pos: Vec2,
}

/// Advance the game state by one frame
pub fn step_frame(state: &mut GameState, now_ms: f64) -> FrameOutcome {
    let mut outcome = FrameOutcome::default();

    state
        .stars
        .advance(&mut state.rng, state.width, state.height);

    if state.phase == GamePhase::Running {
        outcome.price = update_price(state, now_ms);
    }

    for target in &mut state.targets {
        target.pos.y += target.speed;
        target.rotation += TARGET_SPIN;
    }
    let before = state.targets.len();
    let height = state.height;
    state.targets.retain(|t| !t.is_below(height));
    outcome.despawned = before - state.targets.len();

    step_particles(&mut state.particles);

    let rng = &mut state.rng;
    state
        .shake
        .update(now_ms, || rng.random::<f32>() * 2.0 - 1.0);

    outcome
}

/// Recompute the price if a full update interval has passed
pub fn update_price(state: &mut GameState, now_ms: f64) -> Option<PriceUpdate> {
    if now_ms - state.last_price_update < PRICE_UPDATE_MS {
        return None;
    }

    let update = next_price(state.time_left, &mut state.rng);
    state.bitcoin_value = update.value;
    state.price_history.push(update.value);
    state.last_price_update = now_ms;

    log::debug!(
        "Price {:.1} (change {:+.1}{})",
        update.value,
        update.change,
        if update.sudden { ", sudden" } else { "" }
    );
    Some(update)
}

/// Integrate particles one frame and drop the dead ones
pub fn step_particles(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.vel.y += p.gravity;
        p.pos += p.vel;
        p.rotation += p.rotation_speed;
        p.life -= PARTICLE_DECAY;
        p.size *= PARTICLE_SHRINK;
    }
    particles.retain(|p| p.life > 0.0);
}

/// Spawn one target along the top edge, returning its id
pub fn spawn_target(state: &mut GameState) -> u32 {
    let kind = if state.rng.random_bool(BITCOIN_CHANCE) {
        TargetKind::Bitcoin
    } else {
        TargetKind::Dollar
    };

    let margin = TARGET_SPAWN_FOOTPRINT / 2.0;
    let span = (state.width - 2.0 * margin).max(0.0);
    let x = margin + state.rng.random::<f32>() * span;
    let speed = state.rng.random_range(TARGET_MIN_SPEED..TARGET_MAX_SPEED);
    let rotation = state.rng.random::<f32>() * TAU;

    let id = state.next_entity_id();
    state.targets.push(Target {
        id,
        pos: Vec2::new(x, -TARGET_RADIUS),
        kind,
        radius: TARGET_RADIUS,
        speed,
        rotation,
    });
    log::debug!("Spawned {:?} #{} at x={:.0}", kind, id, x);
    id
}

/// Emit a radial burst of particles at `pos`
pub fn spawn_burst(state: &mut GameState, pos: Vec2, kind: TargetKind) {
    let rng = &mut state.rng;
    state.particles.reserve(BURST_SIZE);

    for i in 0..BURST_SIZE {
        let angle = TAU * i as f32 / BURST_SIZE as f32 + rng.random::<f32>() * 0.5;
        let speed = rng.random::<f32>() * 4.0 + 3.0;
        let kick = -speed * 0.5 * rng.random::<f32>();

        state.particles.push(Particle {
            pos,
            vel: Vec2::from_angle(angle) * speed * 0.5 + Vec2::new(0.0, kick),
            size: rng.random::<f32>() * 6.0 + 2.0,
            rotation: rng.random::<f32>() * TAU,
            rotation_speed: (rng.random::<f32>() - 0.5) * 0.2,
            gravity: PARTICLE_GRAVITY,
            life: 1.0,
            kind,
        });
    }
}

/// Resolve a click at `point`: consume at most one target and score it
///
/// Only valid while Running; otherwise nothing happens.
pub fn resolve_click(state: &mut GameState, point: Vec2) -> Option<Hit> {
    if state.phase != GamePhase::Running {
        return None;
    }

    let index = pick_target(&state.targets, point)?;
    let target = state.targets.remove(index);

    let points = match target.kind {
        TargetKind::Dollar => {
            state.stats.dollars += 1;
            1
        }
        TargetKind::Bitcoin => {
            let value = state.bitcoin_value.round() as u64;
            state.stats.bitcoin_count += 1;
            state.stats.bitcoin_points += value;
            value
        }
    };
    state.score += points;

    spawn_burst(state, target.pos, target.kind);

    Some(Hit {
        target_id: target.id,
        kind: target.kind,
        points,
        pos: target.pos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_state() -> GameState {
        let mut state = GameState::new(12345, 800.0, 600.0);
        state.phase = GamePhase::Running;
        state
    }

    fn place(state: &mut GameState, kind: TargetKind, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.targets.push(Target {
            id,
            pos: Vec2::new(x, y),
            kind,
            radius: TARGET_RADIUS,
            speed: 3.0,
            rotation: 0.0,
        });
        id
    }

    #[test]
    fn test_bitcoin_hit_scores_rounded_value() {
        let mut state = running_state();
        state.bitcoin_value = 57.4;
        let id = place(&mut state, TargetKind::Bitcoin, 200.0, 150.0);

        let hit = resolve_click(&mut state, Vec2::new(200.0, 150.0)).expect("hit");
        assert_eq!(hit.target_id, id);
        assert_eq!(hit.points, 57);
        assert_eq!(state.score, 57);
        assert_eq!(state.stats.bitcoin_count, 1);
        assert_eq!(state.stats.bitcoin_points, 57);
        assert!(state.targets.iter().all(|t| t.id != id));
        assert_eq!(state.particles.len(), BURST_SIZE);
        assert!(state.particles.iter().all(|p| p.pos == Vec2::new(200.0, 150.0)));
        assert!(state.particles.iter().all(|p| p.kind == TargetKind::Bitcoin));
    }

    #[test]
    fn test_dollar_hit_scores_one() {
        let mut state = running_state();
        state.bitcoin_value = 90.0;
        place(&mut state, TargetKind::Dollar, 50.0, 50.0);

        let hit = resolve_click(&mut state, Vec2::new(60.0, 55.0)).expect("hit");
        assert_eq!(hit.points, 1);
        assert_eq!(state.score, 1);
        assert_eq!(state.stats.dollars, 1);
        assert_eq!(state.stats.bitcoin_points, 0);
    }

    #[test]
    fn test_click_consumes_at_most_one_target() {
        let mut state = running_state();
        place(&mut state, TargetKind::Dollar, 100.0, 100.0);
        place(&mut state, TargetKind::Dollar, 100.0, 100.0);
        place(&mut state, TargetKind::Dollar, 100.0, 100.0);

        resolve_click(&mut state, Vec2::new(100.0, 100.0));
        assert_eq!(state.targets.len(), 2);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_click_ignored_unless_running() {
        let mut state = GameState::new(1, 800.0, 600.0);
        place(&mut state, TargetKind::Dollar, 100.0, 100.0);
        for phase in [GamePhase::Idle, GamePhase::Countdown, GamePhase::Ended] {
            state.phase = phase;
            assert!(resolve_click(&mut state, Vec2::new(100.0, 100.0)).is_none());
        }
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_target_falls_out_without_scoring() {
        let mut state = running_state();
        place(&mut state, TargetKind::Bitcoin, 100.0, 600.0 + TARGET_RADIUS - 1.0);

        let outcome = step_frame(&mut state, 0.0);
        assert_eq!(outcome.despawned, 1);
        assert!(state.targets.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_targets_move_and_spin() {
        let mut state = running_state();
        place(&mut state, TargetKind::Dollar, 100.0, 10.0);
        step_frame(&mut state, 0.0);
        assert_eq!(state.targets[0].pos.y, 13.0);
        assert!((state.targets[0].rotation - TARGET_SPIN).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_within_margins() {
        let mut state = running_state();
        for _ in 0..200 {
            spawn_target(&mut state);
        }
        let margin = TARGET_SPAWN_FOOTPRINT / 2.0;
        for t in &state.targets {
            assert!(t.pos.x >= margin && t.pos.x <= state.width - margin);
            assert_eq!(t.pos.y, -TARGET_RADIUS);
            assert!(t.speed >= TARGET_MIN_SPEED && t.speed < TARGET_MAX_SPEED);
        }
        let bitcoins = state
            .targets
            .iter()
            .filter(|t| t.kind == TargetKind::Bitcoin)
            .count();
        assert!(bitcoins > 20 && bitcoins < 90, "bitcoins = {bitcoins}");
    }

    #[test]
    fn test_particles_expire() {
        let mut state = running_state();
        spawn_burst(&mut state, Vec2::new(10.0, 10.0), TargetKind::Dollar);
        assert_eq!(state.particles.len(), BURST_SIZE);

        // life 1.0 decays by 0.02 per frame
        for _ in 0..49 {
            step_particles(&mut state.particles);
        }
        assert_eq!(state.particles.len(), BURST_SIZE);
        step_particles(&mut state.particles);
        step_particles(&mut state.particles);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_particle_gravity_and_shrink() {
        let mut particles = vec![Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, -2.0),
            size: 10.0,
            rotation: 0.0,
            rotation_speed: 0.1,
            gravity: PARTICLE_GRAVITY,
            life: 1.0,
            kind: TargetKind::Dollar,
        }];
        step_particles(&mut particles);
        let p = &particles[0];
        assert!((p.vel.y - (-1.9)).abs() < 1e-6);
        assert!((p.pos - Vec2::new(1.0, -1.9)).length() < 1e-6);
        assert!((p.size - 9.7).abs() < 1e-5);
        assert!((p.life - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_price_updates_on_two_second_clock() {
        let mut state = running_state();
        state.last_price_update = 1000.0;

        assert!(step_frame(&mut state, 2999.0).price.is_none());
        assert!(step_frame(&mut state, 3000.0).price.is_some());
        assert_eq!(state.last_price_update, 3000.0);
        assert_eq!(state.price_history.latest(), Some(state.bitcoin_value));
        assert!(step_frame(&mut state, 3500.0).price.is_none());
    }

    #[test]
    fn test_price_frozen_outside_running() {
        let mut state = GameState::new(9, 800.0, 600.0);
        state.phase = GamePhase::Ended;
        assert!(step_frame(&mut state, 1e9).price.is_none());
        assert_eq!(state.bitcoin_value, PRICE_MIN);
    }
}
