//! Alien Invaders headless driver
//!
//! Runs a session at a fixed 60 Hz with an autopilot standing in for the
//! keyboard. Useful for soak-testing the simulation and for eyeballing a frame
//! through the ASCII surface.
//!
//! ```text
//! alien-invaders [--config <file.json>] [--seed <u64>] [--frames <n>] [--ascii] [--quiet] [--dump-config]
//! ```

use std::process::ExitCode;

use glam::Vec2;

use alien_invaders::audio::{LogAudio, NullAudio};
use alien_invaders::renderer::AsciiSurface;
use alien_invaders::sim::{Outcome, SessionController, SessionState};
use alien_invaders::{AudioSink, ConfigError, GameConfig, InputState, Key, KeyboardState};

/// Fixed frame time (60 Hz display refresh)
const FRAME_DT: f32 = 1.0 / 60.0;
/// Frame on which the autopilot mutes the sound once
const MUTE_FRAME: u64 = 600;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Unknown argument: {0}")]
    UnknownArg(String),
    #[error("Missing value for {0}")]
    MissingValue(&'static str),
    #[error("Invalid value for {flag}: {value}")]
    BadValue { flag: &'static str, value: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    config: Option<String>,
    seed: u64,
    frames: u64,
    ascii: bool,
    /// Drop sound triggers instead of logging them
    quiet: bool,
    dump_config: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            seed: 1,
            frames: 60 * 60 * 5,
            ascii: false,
            quiet: false,
            dump_config: false,
        }
    }
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    options.config = Some(args.next().ok_or(CliError::MissingValue("--config"))?);
                }
                "--seed" => options.seed = parse_value(&mut args, "--seed")?,
                "--frames" => options.frames = parse_value(&mut args, "--frames")?,
                "--ascii" => options.ascii = true,
                "--quiet" => options.quiet = true,
                "--dump-config" => options.dump_config = true,
                _ => return Err(CliError::UnknownArg(arg)),
            }
        }
        Ok(options)
    }
}

fn parse_value(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<u64, CliError> {
    let value = args.next().ok_or(CliError::MissingValue(flag))?;
    value.parse().map_err(|_| CliError::BadValue { flag, value })
}

/// Scripted player that starts, chases the lowest alien, fires and continues
struct Autopilot {
    keys: KeyboardState,
    frame: u64,
    muted_once: bool,
}

impl Autopilot {
    fn new() -> Self {
        Self {
            keys: KeyboardState::new(),
            frame: 0,
            muted_once: false,
        }
    }

    fn next_input(&mut self, session: &SessionController) -> KeyboardState {
        self.frame += 1;
        let last = self.keys;
        self.keys.release_all();

        match session.state() {
            // Tap start: press only if it was released last frame
            SessionState::Inactive | SessionState::Paused => {
                self.keys.set(Key::Start, !last.is_key_down(Key::Start));
            }
            SessionState::Active => self.steer(session, &last),
            _ => {}
        }
        self.keys
    }

    fn steer(&mut self, session: &SessionController, last: &KeyboardState) {
        let Some(wave) = session.wave() else { return };

        if !self.muted_once && self.frame >= MUTE_FRAME {
            self.keys.press(Key::Mute);
            self.muted_once = true;
        }

        let Some(ship) = wave.ship() else { return };
        if let Some(target) = wave.aliens().bottom_most() {
            let dx = target.pos.x - ship.pos.x;
            if dx < -2.0 {
                self.keys.press(Key::Left);
            } else if dx > 2.0 {
                self.keys.press(Key::Right);
            }
        }
        self.keys.set(Key::Fire, !last.is_key_down(Key::Fire));
    }
}

fn run(options: &Options) -> Result<(), CliError> {
    let config = match &options.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if options.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    log::info!("Running {} frames with seed {}", options.frames, options.seed);
    let mut session = SessionController::new(config.clone(), options.seed);
    let mut log_audio = LogAudio::new();
    let mut null_audio = NullAudio;
    let audio: &mut dyn AudioSink = if options.quiet {
        &mut null_audio
    } else {
        &mut log_audio
    };
    let mut pilot = Autopilot::new();

    for frame in 0..options.frames {
        let input = pilot.next_input(&session);
        session.update(FRAME_DT, &input, audio);
        if session.state() == SessionState::Complete {
            log::info!("Session complete after {} frames", frame + 1);
            break;
        }
    }

    let (score, lives) = session
        .wave()
        .map_or((0, config.ship_lives), |w| (w.score(), w.lives()));
    let result = match session.outcome() {
        Some(Outcome::Won) => "won",
        Some(Outcome::Lost) => "lost",
        None => "unfinished",
    };
    println!(
        "result: {result}  score: {score}  lives: {lives}  sounds played: {}",
        log_audio.total()
    );

    if options.ascii {
        let mut surface = AsciiSurface::new(
            Vec2::new(config.game_width, config.game_height),
            Vec2::new(10.0, 20.0),
        );
        session.draw(&mut surface);
        print!("{}", surface.render());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Alien Invaders (headless) starting...");

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            eprintln!(
                "usage: alien-invaders [--config <file.json>] [--seed <u64>] [--frames <n>] [--ascii] [--quiet] [--dump-config]"
            );
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(Options::parse(args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn test_parse_all_flags() {
        let options = Options::parse(args(&[
            "--seed", "42", "--frames", "10", "--ascii", "--quiet", "--config", "game.json",
        ]))
        .unwrap();
        assert!(options.quiet);
        assert_eq!(options.seed, 42);
        assert_eq!(options.frames, 10);
        assert!(options.ascii);
        assert_eq!(options.config.as_deref(), Some("game.json"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Options::parse(args(&["--bogus"])),
            Err(CliError::UnknownArg(_))
        ));
        assert!(matches!(
            Options::parse(args(&["--seed"])),
            Err(CliError::MissingValue("--seed"))
        ));
        assert!(matches!(
            Options::parse(args(&["--frames", "lots"])),
            Err(CliError::BadValue { flag: "--frames", .. })
        ));
    }

    #[test]
    fn test_autopilot_starts_and_plays() {
        let mut session = SessionController::new(GameConfig::default(), 3);
        let mut audio = LogAudio::new();
        let mut pilot = Autopilot::new();
        for _ in 0..120 {
            let input = pilot.next_input(&session);
            session.update(FRAME_DT, &input, &mut audio);
        }
        assert_ne!(session.state(), SessionState::Inactive);
        assert!(session.wave().is_some());
    }

    #[test]
    fn test_quiet_run_completes() {
        let options = Options {
            frames: 120,
            quiet: true,
            ..Options::default()
        };
        assert!(run(&options).is_ok());
    }
}
