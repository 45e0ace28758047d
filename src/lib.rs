pub mod axis;
pub mod config;
pub mod console;
pub mod coordinate;
pub mod error;
pub mod grid;
pub mod jog;
pub mod mode;
pub mod sequencer;
pub mod session;
pub mod simulator;
