//! Top-level game state machine
//!
//! The session decides *when* the game runs; [`WaveSimulation`] decides *what*
//! happens while it does. It only ever touches the wave through its public
//! operations.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use super::wave::WaveSimulation;
use crate::audio::AudioSink;
use crate::config::GameConfig;
use crate::platform::{EdgeTrigger, InputState, Key};
use crate::renderer::{DrawSurface, shapes};
use crate::sanitize_dt;

pub const WELCOME_MESSAGE: &str = "Press 'S' to Play";
pub const PAUSED_MESSAGE: &str = "Press 'S' to Continue";
pub const WIN_MESSAGE: &str = "Congratulations!\nPress 'S'";
pub const LOSS_MESSAGE: &str = "You Lose\nPress 'S'";
pub const SOUND_ON_TEXT: &str = "Press 'Q' to Turn Off the Sound";
pub const SOUND_OFF_TEXT: &str = "Press 'Q' to Turn On the Sound";

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Title screen, no wave
    Inactive,
    /// Building a wave (lasts zero frames)
    NewWave,
    /// Normal gameplay
    Active,
    /// Ship lost, waiting for the player to continue
    Paused,
    /// Respawning the ship (lasts zero frames)
    Continue,
    /// Wave won or lost
    Complete,
}

/// How a completed wave ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

pub struct SessionController {
    config: GameConfig,
    /// Seeds each new wave
    rng: Pcg32,
    state: SessionState,
    /// Present whenever state != Inactive
    wave: Option<WaveSimulation>,
    /// Present whenever state != Active
    message: Option<String>,
    outcome: Option<Outcome>,
    start_key: EdgeTrigger,
    mute_key: EdgeTrigger,
    sound_text: String,
    score_text: String,
    waves_started: u32,
}

impl SessionController {
    /// A session on the title screen
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut session = Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            state: SessionState::Inactive,
            wave: None,
            message: None,
            outcome: None,
            start_key: EdgeTrigger::new(),
            mute_key: EdgeTrigger::new(),
            sound_text: String::new(),
            score_text: String::new(),
            waves_started: 0,
        };
        session.start();
        session
    }

    /// Return to the title screen with no wave and fresh latches
    pub fn start(&mut self) {
        self.set_state(SessionState::Inactive);
        self.wave = None;
        self.outcome = None;
        self.message = Some(WELCOME_MESSAGE.to_string());
        self.sound_text = SOUND_ON_TEXT.to_string();
        self.score_text = score_text(0);
        self.start_key.reset();
        self.mute_key.reset();
    }

    // === Queries ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn wave(&self) -> Option<&WaveSimulation> {
        self.wave.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn sound_text(&self) -> &str {
        &self.sound_text
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of waves built since the session was created
    pub fn waves_started(&self) -> u32 {
        self.waves_started
    }

    // === Frame ===

    /// Advance one frame
    pub fn update(&mut self, dt: f32, input: &dyn InputState, audio: &mut dyn AudioSink) {
        let dt = sanitize_dt(dt);

        if self.start_key.poll(input, Key::Start) {
            match self.state {
                SessionState::Inactive => self.set_state(SessionState::NewWave),
                SessionState::Paused => self.set_state(SessionState::Continue),
                SessionState::Complete => {
                    self.start();
                    // The press that reset the game must not also start one
                    self.start_key.update(true);
                }
                _ => {}
            }
        }

        match self.state {
            SessionState::NewWave => {
                let seed = self.rng.random::<u64>();
                self.wave = Some(WaveSimulation::new(self.config.clone(), seed));
                self.waves_started += 1;
                self.message = None;
                self.outcome = None;
                self.score_text = score_text(0);
                self.set_state(SessionState::Active);
            }
            SessionState::Active => self.update_active(dt, input, audio),
            SessionState::Continue => {
                if let Some(wave) = &mut self.wave {
                    wave.set_new_ship();
                }
                self.message = None;
                self.set_state(SessionState::Active);
            }
            SessionState::Inactive | SessionState::Paused | SessionState::Complete => {}
        }
    }

    /// Emit this frame's drawables
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let playing = !matches!(self.state, SessionState::Inactive | SessionState::Complete);
        if let (true, Some(wave)) = (playing, &self.wave) {
            wave.draw(surface);
            surface.draw(&shapes::defense_line(&self.config));
            surface.draw(&shapes::sound_label(&self.config, &self.sound_text));
            surface.draw(&shapes::score_label(&self.config, &self.score_text));
        }
        if let Some(message) = &self.message {
            surface.draw(&shapes::message(&self.config, message));
        }
    }

    // === Helpers ===

    fn set_state(&mut self, next: SessionState) {
        if next != self.state {
            log::info!("Session {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn update_active(&mut self, dt: f32, input: &dyn InputState, audio: &mut dyn AudioSink) {
        let Some(wave) = self.wave.as_mut() else {
            return;
        };

        if self.mute_key.poll(input, Key::Mute) {
            if wave.sound_enabled() {
                wave.stop_sound();
                self.sound_text = SOUND_OFF_TEXT.to_string();
                log::info!("Sound off");
            } else {
                wave.set_sound();
                self.sound_text = SOUND_ON_TEXT.to_string();
                log::info!("Sound on");
            }
        }

        wave.update_bolts(input);
        wave.update_ship(input);
        wave.update_aliens(dt);

        for event in wave.drain_events() {
            match event {
                GameEvent::Sound(effect) => audio.play(effect),
                other => log::debug!("{other:?}"),
            }
        }

        self.score_text = score_text(wave.score());
        self.resolve_outcome();
    }

    /// Leave Active if the wave is won, lost or waiting for a new ship
    fn resolve_outcome(&mut self) {
        let Some(wave) = &self.wave else { return };
        let ship_lost = wave.ship().is_none();

        if wave.is_winning() {
            self.complete(Outcome::Won);
        } else if ship_lost && wave.lives() > 0 {
            self.message = Some(PAUSED_MESSAGE.to_string());
            self.set_state(SessionState::Paused);
        } else if ship_lost || wave.is_losing() {
            self.complete(Outcome::Lost);
        }
    }

    fn complete(&mut self, outcome: Outcome) {
        let text = match outcome {
            Outcome::Won => WIN_MESSAGE,
            Outcome::Lost => LOSS_MESSAGE,
        };
        let score = self.wave.as_ref().map_or(0, WaveSimulation::score);
        log::info!("Wave {:?} with score {}", outcome, score);
        self.message = Some(text.to_string());
        self.outcome = Some(outcome);
        self.set_state(SessionState::Complete);
    }
}

fn score_text(score: u64) -> String {
    format!("Score: {score}")
}
