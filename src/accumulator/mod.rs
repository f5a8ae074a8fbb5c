mod scalar;
mod vector;

pub use scalar::SubPixelAccumulator;
pub use vector::VectorSubPixelAccumulator;
