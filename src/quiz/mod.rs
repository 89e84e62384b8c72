//! Quiz core: scoring, countdown and the navigation state machine.
//!
//! Nothing in here knows about HTTP or markup. Time is passed in explicitly so
//! every transition can be driven from tests.

pub mod navigator;
pub mod state;
pub mod timer;

pub use navigator::{Event, Navigator, Phase};
pub use state::QuizState;
