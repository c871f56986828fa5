//! Audio seam
//!
//! The core never owns an audio device. It raises fire-and-forget
//! [`SoundEffect`] triggers that a frontend plays through an [`AudioSink`].
//! Muting detaches all four channels at once; there is no per-channel volume.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ship fires a bolt
    ShipFire,
    /// An alien fires a bolt
    AlienFire,
    /// Ship destroyed by an alien bolt
    ShipExplode,
    /// Alien destroyed by a ship bolt
    AlienExplode,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 4] = [
        SoundEffect::ShipFire,
        SoundEffect::AlienFire,
        SoundEffect::ShipExplode,
        SoundEffect::AlienExplode,
    ];

    /// Asset name a frontend can map to a sample
    pub fn asset_name(&self) -> &'static str {
        match self {
            SoundEffect::ShipFire => "pew1.wav",
            SoundEffect::AlienFire => "pew2.wav",
            SoundEffect::ShipExplode => "blast1.wav",
            SoundEffect::AlienExplode => "pop1.wav",
        }
    }
}

/// Fire-and-forget playback
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// The four sound channels of a wave, attached or detached as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundChannels {
    attached: bool,
}

impl Default for SoundChannels {
    fn default() -> Self {
        Self::attached()
    }
}

impl SoundChannels {
    pub fn attached() -> Self {
        Self { attached: true }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The effect if its channel is attached, otherwise None
    pub fn trigger(&self, effect: SoundEffect) -> Option<SoundEffect> {
        self.attached.then_some(effect)
    }
}

/// Sink that drops every trigger
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Sink that logs triggers and counts them (headless runs)
#[derive(Debug, Default, Clone)]
pub struct LogAudio {
    counts: [u32; 4],
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, effect: SoundEffect) -> u32 {
        self.counts[effect as usize]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.counts[effect as usize] += 1;
        log::trace!("play {}", effect.asset_name());
    }
}
