//! Single-wave gameplay
//!
//! A [`WaveSimulation`] owns the ship, the alien formation and every bolt on
//! screen. The caller drives it once per frame in the order
//! [`update_bolts`](WaveSimulation::update_bolts),
//! [`update_ship`](WaveSimulation::update_ship),
//! [`update_aliens`](WaveSimulation::update_aliens) and then asks
//! [`is_winning`](WaveSimulation::is_winning) /
//! [`is_losing`](WaveSimulation::is_losing). Start a new instance for every
//! new game.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{AlienGrid, Bolt, GameEvent, Ship};
use crate::audio::{SoundChannels, SoundEffect};
use crate::config::GameConfig;
use crate::consts::KILL_POINTS;
use crate::platform::{EdgeTrigger, InputState, Key};
use crate::renderer::{DrawSurface, shapes};
use crate::sanitize_dt;

pub struct WaveSimulation {
    config: GameConfig,
    rng: Pcg32,
    aliens: AlienGrid,
    /// None while the ship is destroyed
    ship: Option<Ship>,
    /// Insertion ordered
    bolts: Vec<Bolt>,
    /// March direction, +1 right / -1 left
    direction: f32,
    /// Whether the last edge reaction was a drop; starts true so the first
    /// edge contact steps sideways instead of dropping
    last_edge_dropped: bool,
    /// Seconds since the last march step
    march_elapsed: f32,
    /// Seconds between march steps
    march_interval: f32,
    /// March steps between alien volleys, in 1..=bolt_rate
    volley_countdown: u32,
    steps_since_volley: u32,
    lives: u32,
    score: u64,
    sound: SoundChannels,
    fire_key: EdgeTrigger,
    events: Vec<GameEvent>,
    next_bolt_id: u32,
}

impl WaveSimulation {
    /// Full formation, fresh ship, sound attached
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let volley_countdown = rng.random_range(1..=config.bolt_rate.max(1));
        log::debug!(
            "New wave: {}x{} aliens, seed {}",
            config.alien_rows,
            config.aliens_in_row,
            seed
        );
        Self {
            aliens: AlienGrid::new(&config),
            ship: Some(Ship::spawn(&config)),
            bolts: Vec::new(),
            direction: 1.0,
            last_edge_dropped: true,
            march_elapsed: 0.0,
            march_interval: config.alien_speed,
            volley_countdown,
            steps_since_volley: 0,
            lives: config.ship_lives,
            score: 0,
            sound: SoundChannels::attached(),
            fire_key: EdgeTrigger::new(),
            events: Vec::new(),
            next_bolt_id: 1,
            rng,
            config,
        }
    }

    // === Queries ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn aliens(&self) -> &AlienGrid {
        &self.aliens
    }

    pub fn ship(&self) -> Option<&Ship> {
        self.ship.as_ref()
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn march_interval(&self) -> f32 {
        self.march_interval
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound.is_attached()
    }

    /// True once every alien is destroyed
    pub fn is_winning(&self) -> bool {
        self.aliens.is_empty()
    }

    /// True once the lowest alien's bottom edge reaches the defense line
    pub fn is_losing(&self) -> bool {
        self.aliens
            .bottom_most()
            .is_some_and(|alien| alien.bounds().bottom() <= self.config.defense_line)
    }

    /// Events raised since the last drain, oldest first
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    // === Sound ===

    /// Attach all four sound channels
    pub fn set_sound(&mut self) {
        self.sound.attach();
    }

    /// Detach all four sound channels
    pub fn stop_sound(&mut self) {
        self.sound.detach();
    }

    /// Replace a destroyed ship with a new one at the spawn point
    pub fn set_new_ship(&mut self) {
        self.ship = Some(Ship::spawn(&self.config));
    }

    // === Updates ===

    /// Resolve alien hits on the ship, then move it from left/right input
    pub fn update_ship(&mut self, input: &dyn InputState) {
        let Some(ship) = &self.ship else { return };
        let ship_box = ship.bounds();

        let hit = self
            .bolts
            .iter()
            .position(|b| !b.is_player_bolt() && b.bounds().overlaps(&ship_box));
        if let Some(index) = hit {
            self.ship = None;
            self.bolts.remove(index);
            self.lives = self.lives.saturating_sub(1);
            self.emit_sound(SoundEffect::ShipExplode);
            self.events.push(GameEvent::ShipDestroyed { lives_left: self.lives });
            log::debug!("Ship destroyed, {} lives left", self.lives);
            return;
        }

        let width = self.config.game_width;
        let step = self.config.ship_movement;
        if let Some(ship) = &mut self.ship {
            if input.is_key_down(Key::Left) {
                ship.move_by(-step, width);
            }
            if input.is_key_down(Key::Right) {
                ship.move_by(step, width);
            }
        }
    }

    /// Resolve one ship-bolt hit, then march the formation if its step is due
    pub fn update_aliens(&mut self, dt: f32) {
        self.resolve_alien_hit();

        self.march_elapsed += sanitize_dt(dt);
        if self.march_elapsed < self.march_interval {
            return;
        }

        if let Some((left, right)) = self.aliens.horizontal_extent() {
            let margin = self.config.alien_h_sep;
            if self.config.game_width - right <= margin || left <= margin {
                self.handle_edge();
            } else {
                self.march_sideways();
            }
        }
        self.march_elapsed = 0.0;
        self.steps_since_volley += 1;
    }

    /// Cull off-screen bolts, fire an alien volley if due, move every bolt,
    /// then fire a ship bolt on a fresh press of the fire key.
    /// The fire latch updates every call, so a press made while a ship bolt
    /// is in flight is consumed and never fires later.
    pub fn update_bolts(&mut self, input: &dyn InputState) {
        let height = self.config.game_height;
        self.bolts.retain(|b| !b.is_off_screen(height));

        if self.steps_since_volley >= self.volley_countdown && !self.aliens.is_empty() {
            self.fire_alien_volley();
        }

        for bolt in &mut self.bolts {
            bolt.pos.y += bolt.velocity;
        }

        let player_bolt_live = self.bolts.iter().any(Bolt::is_player_bolt);
        let fire = self.fire_key.poll(input, Key::Fire);
        if fire && !player_bolt_live {
            if let Some(ship) = &self.ship {
                let muzzle = ship.muzzle(&self.config);
                let velocity = self.config.bolt_speed;
                self.spawn_bolt(muzzle, velocity);
                self.emit_sound(SoundEffect::ShipFire);
            }
        }
    }

    /// Draw aliens, ship and bolts
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for (_, alien) in self.aliens.iter() {
            surface.draw(&shapes::alien(alien));
        }
        if let Some(ship) = &self.ship {
            surface.draw(&shapes::ship(ship));
        }
        for bolt in &self.bolts {
            surface.draw(&shapes::bolt(bolt));
        }
    }

    // === Helpers ===

    fn emit_sound(&mut self, effect: SoundEffect) {
        if let Some(effect) = self.sound.trigger(effect) {
            self.events.push(GameEvent::Sound(effect));
        }
    }

    fn spawn_bolt(&mut self, pos: Vec2, velocity: f32) -> u32 {
        let id = self.next_bolt_id;
        self.next_bolt_id = self.next_bolt_id.wrapping_add(1);
        self.bolts.push(Bolt::new(id, pos, &self.config, velocity));
        id
    }

    /// First ship bolt overlapping a live alien, scanning bolts in order and
    /// cells row-major. At most one hit per call.
    fn resolve_alien_hit(&mut self) {
        let hit = self
            .bolts
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_player_bolt())
            .find_map(|(bi, bolt)| {
                let bolt_box = bolt.bounds();
                self.aliens
                    .iter()
                    .find(|(_, alien)| alien.bounds().overlaps(&bolt_box))
                    .map(|(cell, _)| (bi, cell))
            });
        let Some((bolt_index, (row, col))) = hit else { return };

        let points = KILL_POINTS * (self.aliens.rows() - row) as u64;
        self.score += points;
        self.aliens.remove(row, col);
        self.bolts.remove(bolt_index);
        self.march_interval *= self.config.alien_speedup;
        self.emit_sound(SoundEffect::AlienExplode);
        self.events.push(GameEvent::AlienDestroyed { row, col, points });
        log::debug!("Alien ({row}, {col}) destroyed for {points}, score {}", self.score);
    }

    fn march_sideways(&mut self) {
        self.aliens
            .translate(Vec2::new(self.direction * self.config.alien_h_walk, 0.0));
    }

    /// Alternate between dropping-and-reversing and one extra sideways step
    fn handle_edge(&mut self) {
        if self.last_edge_dropped {
            self.march_sideways();
            self.last_edge_dropped = false;
        } else {
            self.aliens.translate(Vec2::new(0.0, -self.config.alien_v_walk));
            self.direction = -self.direction;
            self.last_edge_dropped = true;
        }
    }

    /// Fire from the lowest alien of a random occupied column
    fn fire_alien_volley(&mut self) {
        let columns = self.aliens.occupied_columns();
        if columns.is_empty() {
            return;
        }
        let col = columns[self.rng.random_range(0..columns.len())];
        let Some((_, alien)) = self.aliens.lowest_in_column(col) else { return };
        let origin = Vec2::new(alien.pos.x, alien.pos.y - alien.size.y / 2.0);

        let velocity = -self.config.bolt_speed;
        self.spawn_bolt(origin, velocity);
        self.emit_sound(SoundEffect::AlienFire);
        self.events.push(GameEvent::AlienVolley { col });

        self.volley_countdown = self.rng.random_range(1..=self.config.bolt_rate.max(1));
        self.steps_since_volley = 0;
    }
}

#[cfg(test)]
impl WaveSimulation {
    /// Put a bolt on screen directly
    pub(crate) fn inject_bolt(&mut self, pos: Vec2, velocity: f32) -> u32 {
        self.spawn_bolt(pos, velocity)
    }

    /// Stop alien volleys for the rest of the wave
    pub(crate) fn suppress_volleys(&mut self) {
        self.volley_countdown = u32::MAX;
    }

    pub(crate) fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    pub(crate) fn aliens_mut(&mut self) -> &mut AlienGrid {
        &mut self.aliens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::KeyboardState;
    use crate::renderer::{Drawable, RecordingSurface, Sprite};
    use proptest::prelude::*;

    const SEED: u64 = 12345;

    fn wave() -> WaveSimulation {
        WaveSimulation::new(GameConfig::default(), SEED)
    }

    fn no_keys() -> KeyboardState {
        KeyboardState::new()
    }

    /// Keep volleys from firing during a test
    fn hold_volleys(wave: &mut WaveSimulation) {
        wave.suppress_volleys();
    }

    /// Empty every cell except the listed ones
    fn keep_only(wave: &mut WaveSimulation, keep: &[(usize, usize)]) {
        for row in 0..wave.aliens.rows() {
            for col in 0..wave.aliens.cols() {
                if !keep.contains(&(row, col)) {
                    wave.aliens.remove(row, col);
                }
            }
        }
    }

    fn alien_pos(wave: &WaveSimulation, row: usize, col: usize) -> Vec2 {
        wave.aliens.get(row, col).unwrap().pos
    }

    #[test]
    fn test_new_wave_defaults() {
        let wave = wave();
        assert_eq!(wave.aliens().live_count(), 60);
        assert_eq!(wave.ship().unwrap().pos, Vec2::new(400.0, 54.0));
        assert!(wave.bolts().is_empty());
        assert_eq!(wave.direction(), 1.0);
        assert!(wave.last_edge_dropped);
        assert_eq!(wave.march_elapsed, 0.0);
        assert_eq!(wave.march_interval(), 1.0);
        assert!((1..=5).contains(&wave.volley_countdown));
        assert_eq!(wave.steps_since_volley, 0);
        assert_eq!(wave.lives(), 3);
        assert_eq!(wave.score(), 0);
        assert!(wave.sound_enabled());
        assert!(!wave.is_winning());
        assert!(!wave.is_losing());
    }

    #[test]
    fn test_is_winning_only_when_empty() {
        let mut wave = wave();
        keep_only(&mut wave, &[(3, 7)]);
        assert!(!wave.is_winning());
        wave.aliens.remove(3, 7);
        assert!(wave.is_winning());
        // Empty grid never counts as losing
        assert!(!wave.is_losing());
    }

    #[test]
    fn test_bolt_removal_is_exact() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        let h = wave.config.game_height;
        let half = wave.config.bolt_height / 2.0;

        let at_floor = wave.spawn_bolt(Vec2::new(100.0, -half), -10.0); // top == 0
        let at_ceiling = wave.spawn_bolt(Vec2::new(100.0, h + half), 10.0); // bottom == H
        let inside_low = wave.spawn_bolt(Vec2::new(200.0, -half + 0.5), -10.0);
        let inside_high = wave.spawn_bolt(Vec2::new(300.0, h + half - 0.5), 10.0);

        wave.update_bolts(&no_keys());

        let ids: Vec<u32> = wave.bolts().iter().map(|b| b.id).collect();
        assert!(!ids.contains(&at_floor));
        assert!(!ids.contains(&at_ceiling));
        assert_eq!(ids, vec![inside_low, inside_high]);
    }

    #[test]
    fn test_bolts_move_by_velocity() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        let up = wave.spawn_bolt(Vec2::new(100.0, 300.0), 10.0);
        let down = wave.spawn_bolt(Vec2::new(100.0, 300.0), -10.0);
        wave.update_bolts(&no_keys());
        let y = |id| wave.bolts().iter().find(|b| b.id == id).unwrap().pos.y;
        assert_eq!(y(up), 310.0);
        assert_eq!(y(down), 290.0);
    }

    #[test]
    fn test_ship_clamped_at_left_edge() {
        let mut wave = wave();
        let half = wave.config.ship_width / 2.0;
        wave.ship.as_mut().unwrap().pos.x = half;
        let left = KeyboardState::with(&[Key::Left]);
        for _ in 0..20 {
            wave.update_ship(&left);
        }
        assert_eq!(wave.ship().unwrap().pos.x, half);
    }

    #[test]
    fn test_ship_clamped_at_right_edge() {
        let mut wave = wave();
        let right = KeyboardState::with(&[Key::Right]);
        for _ in 0..500 {
            wave.update_ship(&right);
        }
        let ship = wave.ship().unwrap();
        assert_eq!(ship.bounds().right(), wave.config.game_width);
    }

    #[test]
    fn test_ship_moves_by_step() {
        let mut wave = wave();
        wave.update_ship(&KeyboardState::with(&[Key::Left]));
        assert_eq!(wave.ship().unwrap().pos.x, 395.0);
        wave.update_ship(&KeyboardState::with(&[Key::Right]));
        wave.update_ship(&KeyboardState::with(&[Key::Right]));
        assert_eq!(wave.ship().unwrap().pos.x, 405.0);
        // Both held cancel out
        wave.update_ship(&KeyboardState::with(&[Key::Left, Key::Right]));
        assert_eq!(wave.ship().unwrap().pos.x, 405.0);
    }

    #[test]
    fn test_alien_bolt_destroys_ship() {
        let mut wave = wave();
        let ship_pos = wave.ship().unwrap().pos;
        let bolt = wave.spawn_bolt(ship_pos, -10.0);
        let other = wave.spawn_bolt(Vec2::new(700.0, 400.0), -10.0);

        // Movement is skipped on the frame the ship dies
        wave.update_ship(&KeyboardState::with(&[Key::Left]));

        assert!(wave.ship().is_none());
        assert_eq!(wave.lives(), 2);
        let ids: Vec<u32> = wave.bolts().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![other]);
        assert!(!ids.contains(&bolt));

        let events: Vec<GameEvent> = wave.drain_events().collect();
        assert_eq!(
            events,
            vec![
                GameEvent::Sound(SoundEffect::ShipExplode),
                GameEvent::ShipDestroyed { lives_left: 2 },
            ]
        );
    }

    #[test]
    fn test_player_bolt_does_not_hit_ship() {
        let mut wave = wave();
        let ship_pos = wave.ship().unwrap().pos;
        wave.spawn_bolt(ship_pos, 10.0);
        wave.update_ship(&no_keys());
        assert!(wave.ship().is_some());
        assert_eq!(wave.lives(), 3);
        assert_eq!(wave.bolts().len(), 1);
    }

    #[test]
    fn test_absent_ship_ignores_bolts_and_input() {
        let mut wave = wave();
        wave.ship = None;
        wave.spawn_bolt(Vec2::new(400.0, 54.0), -10.0);
        wave.update_ship(&KeyboardState::with(&[Key::Left]));
        assert!(wave.ship().is_none());
        assert_eq!(wave.lives(), 3);
        assert_eq!(wave.bolts().len(), 1);
    }

    #[test]
    fn test_set_new_ship_respawns_at_start() {
        let mut wave = wave();
        wave.ship.as_mut().unwrap().pos.x = 100.0;
        wave.ship = None;
        wave.set_new_ship();
        assert_eq!(wave.ship(), Some(&Ship::spawn(&GameConfig::default())));
    }

    #[test]
    fn test_top_row_kill_scores_most() {
        let mut wave = wave();
        // 5 rows, three survivors, one of them in the top row
        keep_only(&mut wave, &[(0, 4), (2, 6), (4, 9)]);
        let target = alien_pos(&wave, 0, 4);
        wave.spawn_bolt(target, 10.0);

        wave.update_aliens(0.0);

        assert_eq!(wave.score(), 500);
        assert!(wave.aliens().get(0, 4).is_none());
        assert_eq!(wave.aliens().live_count(), 2);
        assert!(wave.bolts().is_empty());
    }

    #[test]
    fn test_bottom_row_kill_scores_100() {
        let mut wave = wave();
        let target = alien_pos(&wave, 4, 0);
        wave.spawn_bolt(target, 10.0);
        wave.update_aliens(0.0);
        assert_eq!(wave.score(), 100);
        let events: Vec<GameEvent> = wave.drain_events().collect();
        assert_eq!(
            events,
            vec![
                GameEvent::Sound(SoundEffect::AlienExplode),
                GameEvent::AlienDestroyed { row: 4, col: 0, points: 100 },
            ]
        );
    }

    #[test]
    fn test_alien_bolt_does_not_kill_alien() {
        let mut wave = wave();
        let target = alien_pos(&wave, 4, 0);
        wave.spawn_bolt(target, -10.0);
        wave.update_aliens(0.0);
        assert_eq!(wave.aliens().live_count(), 60);
        assert_eq!(wave.score(), 0);
    }

    #[test]
    fn test_one_kill_per_update() {
        let mut wave = wave();
        let a = alien_pos(&wave, 4, 0);
        let b = alien_pos(&wave, 4, 5);
        wave.spawn_bolt(a, 10.0);
        wave.spawn_bolt(b, 10.0);

        wave.update_aliens(0.0);
        assert_eq!(wave.aliens().live_count(), 59);
        assert!(wave.aliens().get(4, 0).is_none());
        assert_eq!(wave.bolts().len(), 1);

        wave.update_aliens(0.0);
        assert_eq!(wave.aliens().live_count(), 58);
        assert!(wave.bolts().is_empty());
    }

    #[test]
    fn test_kills_speed_up_march() {
        let mut wave = wave();
        let base = wave.march_interval();
        let mut previous = base;
        for col in 0..10 {
            let target = alien_pos(&wave, 4, col);
            wave.spawn_bolt(target, 10.0);
            wave.update_aliens(0.0);
            assert!(wave.march_interval() <= previous);
            previous = wave.march_interval();
        }
        let expected = base * 0.98f32.powi(10);
        assert!((wave.march_interval() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_march_waits_for_interval() {
        let mut wave = wave();
        wave.aliens.translate(Vec2::new(100.0, 0.0));
        let start = alien_pos(&wave, 0, 0);
        wave.update_aliens(0.5);
        assert_eq!(alien_pos(&wave, 0, 0), start);
        assert_eq!(wave.steps_since_volley, 0);

        wave.update_aliens(0.5);
        assert_eq!(alien_pos(&wave, 0, 0), start + Vec2::new(8.0, 0.0));
        assert_eq!(wave.march_elapsed, 0.0);
        assert_eq!(wave.steps_since_volley, 1);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut wave = wave();
        wave.update_aliens(-3.0);
        assert_eq!(wave.march_elapsed, 0.0);
        wave.update_aliens(f32::NAN);
        assert_eq!(wave.march_elapsed, 0.0);
    }

    /// Push the formation right until its next step is an edge reaction
    fn park_at_right_edge(wave: &mut WaveSimulation) {
        let (_, right) = wave.aliens.horizontal_extent().unwrap();
        let target = wave.config.game_width - wave.config.alien_h_sep;
        wave.aliens.translate(Vec2::new(target - right, 0.0));
    }

    #[test]
    fn test_first_edge_contact_steps_sideways() {
        let mut wave = wave();
        park_at_right_edge(&mut wave);
        let before = alien_pos(&wave, 0, 0);

        wave.update_aliens(1.0);

        assert_eq!(alien_pos(&wave, 0, 0), before + Vec2::new(8.0, 0.0));
        assert_eq!(wave.direction(), 1.0);
        assert!(!wave.last_edge_dropped);
    }

    #[test]
    fn test_opening_step_is_sideways_from_left_edge() {
        // The fresh formation starts exactly one gap from the left wall, so
        // its first step is an edge reaction that must not drop
        let mut wave = wave();
        let start = alien_pos(&wave, 0, 0);
        wave.update_aliens(1.0);
        assert_eq!(alien_pos(&wave, 0, 0), start + Vec2::new(8.0, 0.0));
        assert!(!wave.last_edge_dropped);

        wave.update_aliens(1.0);
        assert_eq!(alien_pos(&wave, 0, 0), start + Vec2::new(16.0, 0.0));
        assert!(!wave.last_edge_dropped);
    }

    #[test]
    fn test_edge_reactions_alternate() {
        let mut wave = wave();
        wave.last_edge_dropped = false;
        park_at_right_edge(&mut wave);
        let start = alien_pos(&wave, 0, 0);

        // Drop and reverse
        wave.update_aliens(1.0);
        assert_eq!(alien_pos(&wave, 0, 0), start - Vec2::new(0.0, 16.0));
        assert_eq!(wave.direction(), -1.0);
        assert!(wave.last_edge_dropped);

        // Still touching the edge: one sideways step in the new direction
        wave.update_aliens(1.0);
        assert_eq!(alien_pos(&wave, 0, 0), start + Vec2::new(-8.0, -16.0));
        assert_eq!(wave.direction(), -1.0);
        assert!(!wave.last_edge_dropped);

        // Clear of the edge: normal march
        wave.update_aliens(1.0);
        assert_eq!(alien_pos(&wave, 0, 0), start + Vec2::new(-16.0, -16.0));
        assert_eq!(wave.steps_since_volley, 3);
    }

    #[test]
    fn test_left_edge_drops_too() {
        let mut wave = wave();
        wave.direction = -1.0;
        wave.last_edge_dropped = false;
        // Default layout already sits exactly one gap from the left edge
        let start = alien_pos(&wave, 0, 0);
        wave.update_aliens(1.0);
        assert_eq!(alien_pos(&wave, 0, 0), start - Vec2::new(0.0, 16.0));
        assert_eq!(wave.direction(), 1.0);
    }

    #[test]
    fn test_losing_when_formation_reaches_defense_line() {
        let mut wave = wave();
        let bottom = wave.aliens.bottom_most().unwrap().bounds().bottom();
        let line = wave.config.defense_line;
        wave.aliens.translate(Vec2::new(0.0, line - bottom + 0.5));
        assert!(!wave.is_losing());
        wave.aliens.translate(Vec2::new(0.0, -0.5));
        assert!(wave.is_losing());
    }

    #[test]
    fn test_volley_fires_from_lowest_alien() {
        let mut wave = wave();
        keep_only(&mut wave, &[(0, 5), (2, 5)]);
        wave.steps_since_volley = wave.volley_countdown;

        wave.update_bolts(&no_keys());

        assert_eq!(wave.bolts().len(), 1);
        let bolt = &wave.bolts()[0];
        let shooter = alien_pos(&wave, 2, 5);
        assert!(!bolt.is_player_bolt());
        assert_eq!(bolt.pos.x, shooter.x);
        // Spawned at the alien's bottom edge, then moved once
        assert_eq!(bolt.pos.y, shooter.y - 16.5 - 10.0);
        assert_eq!(wave.steps_since_volley, 0);
        assert!((1..=5).contains(&wave.volley_countdown));

        let events: Vec<GameEvent> = wave.drain_events().collect();
        assert_eq!(
            events,
            vec![GameEvent::Sound(SoundEffect::AlienFire), GameEvent::AlienVolley { col: 5 }]
        );
    }

    #[test]
    fn test_volley_only_targets_occupied_columns() {
        let mut wave = wave();
        keep_only(&mut wave, &[(1, 2), (4, 9)]);
        for _ in 0..50 {
            wave.bolts.clear();
            wave.steps_since_volley = wave.volley_countdown;
            wave.update_bolts(&no_keys());
            let x = wave.bolts()[0].pos.x;
            assert!(x == alien_pos(&wave, 1, 2).x || x == alien_pos(&wave, 4, 9).x);
        }
    }

    #[test]
    fn test_no_volley_without_aliens() {
        let mut wave = wave();
        keep_only(&mut wave, &[]);
        wave.steps_since_volley = wave.volley_countdown;
        wave.update_bolts(&no_keys());
        assert!(wave.bolts().is_empty());
    }

    #[test]
    fn test_fire_is_edge_triggered() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        let fire = KeyboardState::with(&[Key::Fire]);

        wave.update_bolts(&fire);
        assert_eq!(wave.bolts().len(), 1);
        assert!(wave.bolts()[0].is_player_bolt());

        // Holding fire until the bolt leaves the screen never refires
        for _ in 0..200 {
            wave.update_bolts(&fire);
        }
        assert!(wave.bolts().is_empty());

        // Release and press again
        wave.update_bolts(&no_keys());
        wave.update_bolts(&fire);
        assert_eq!(wave.bolts().len(), 1);
    }

    #[test]
    fn test_press_during_flight_is_consumed() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        let fire = KeyboardState::with(&[Key::Fire]);
        wave.update_bolts(&fire);
        wave.update_bolts(&no_keys());

        // Fresh press while the first bolt is still climbing
        wave.update_bolts(&fire);
        assert_eq!(wave.bolts().len(), 1);

        // Keep holding until it leaves the screen; the press was used up
        for _ in 0..200 {
            wave.update_bolts(&fire);
        }
        assert!(wave.bolts().is_empty());
    }

    #[test]
    fn test_bolt_ids_wrap() {
        let mut wave = wave();
        wave.next_bolt_id = u32::MAX;
        let last = wave.spawn_bolt(Vec2::new(100.0, 300.0), 10.0);
        let wrapped = wave.spawn_bolt(Vec2::new(200.0, 300.0), -10.0);
        assert_eq!(last, u32::MAX);
        assert_eq!(wrapped, 0);
        assert_eq!(wave.bolts().len(), 2);
    }

    #[test]
    fn test_one_player_bolt_at_a_time() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        let fire = KeyboardState::with(&[Key::Fire]);
        wave.update_bolts(&fire);
        wave.update_bolts(&no_keys());
        wave.update_bolts(&fire);
        assert_eq!(wave.bolts().iter().filter(|b| b.is_player_bolt()).count(), 1);
    }

    #[test]
    fn test_ship_bolt_spawns_at_muzzle() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        wave.update_bolts(&KeyboardState::with(&[Key::Fire]));
        let bolt = &wave.bolts()[0];
        assert_eq!(bolt.pos, Vec2::new(400.0, 84.0));
        assert_eq!(bolt.velocity, 10.0);
        let events: Vec<GameEvent> = wave.drain_events().collect();
        assert_eq!(events, vec![GameEvent::Sound(SoundEffect::ShipFire)]);
    }

    #[test]
    fn test_no_fire_without_ship() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        wave.ship = None;
        wave.update_bolts(&KeyboardState::with(&[Key::Fire]));
        assert!(wave.bolts().is_empty());
    }

    #[test]
    fn test_muted_wave_raises_no_sounds() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        wave.stop_sound();
        assert!(!wave.sound_enabled());
        wave.update_bolts(&KeyboardState::with(&[Key::Fire]));
        assert_eq!(wave.drain_events().count(), 0);

        wave.set_sound();
        wave.update_bolts(&no_keys());
        wave.bolts.clear();
        wave.update_bolts(&KeyboardState::with(&[Key::Fire]));
        let events: Vec<GameEvent> = wave.drain_events().collect();
        assert_eq!(events, vec![GameEvent::Sound(SoundEffect::ShipFire)]);
    }

    #[test]
    fn test_same_seed_same_volleys() {
        let run = |seed| {
            let mut wave = WaveSimulation::new(GameConfig::default(), seed);
            let keys = no_keys();
            for _ in 0..600 {
                wave.update_bolts(&keys);
                wave.update_ship(&keys);
                wave.update_aliens(1.0 / 60.0);
            }
            let columns: Vec<usize> = wave
                .drain_events()
                .filter_map(|e| match e {
                    GameEvent::AlienVolley { col } => Some(col),
                    _ => None,
                })
                .collect();
            columns
        };
        let a = run(7);
        assert!(!a.is_empty());
        assert_eq!(a, run(7));
    }

    #[test]
    fn test_draw_emits_entities() {
        let mut wave = wave();
        hold_volleys(&mut wave);
        wave.update_bolts(&KeyboardState::with(&[Key::Fire]));
        let mut surface = RecordingSurface::new();
        wave.draw(&mut surface);
        assert_eq!(surface.count_sprites(|s| matches!(s, Sprite::Alien(_))), 60);
        assert_eq!(surface.count_sprites(|s| *s == Sprite::Ship), 1);
        assert_eq!(
            surface
                .shapes
                .iter()
                .filter(|s| matches!(s, Drawable::Rect { .. }))
                .count(),
            1
        );
    }

    proptest! {
        #[test]
        fn prop_bolt_culling_keeps_only_on_screen(ys in proptest::collection::vec(-40.0f32..740.0, 1..24)) {
            let mut wave = wave();
            hold_volleys(&mut wave);
            let h = wave.config.game_height;
            let half = wave.config.bolt_height / 2.0;

            let mut expected = Vec::new();
            for y in ys {
                let id = wave.spawn_bolt(Vec2::new(100.0, y), -10.0);
                if y + half > 0.0 && y - half < h {
                    expected.push(id);
                }
            }
            wave.update_bolts(&no_keys());

            let ids: Vec<u32> = wave.bolts().iter().map(|b| b.id).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
