//! Data models for Seat Reveal

mod assignment;
mod roster;
mod seat;

pub use assignment::*;
pub use roster::*;
pub use seat::*;
