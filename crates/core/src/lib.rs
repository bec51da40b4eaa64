//! Core data types for the contest reminder bot.

pub mod contest;
pub mod offset;
pub mod platform;

pub use contest::*;
pub use offset::*;
pub use platform::*;
