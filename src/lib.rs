pub mod accumulator;
pub mod animation;
pub mod clock;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod math;

pub use error::{MotionError, Result};
