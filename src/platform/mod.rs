//! Platform abstraction layer
//!
//! The simulation never talks to a keyboard library directly. Frontends
//! implement [`InputState`]; the core polls it once per frame and does its own
//! edge detection with [`EdgeTrigger`].

pub mod input;

pub use input::{EdgeTrigger, InputState, Key, KeyboardState};
