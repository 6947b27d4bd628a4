pub mod points;
pub mod transforms;

pub use points::Vec2;
pub use transforms::{Mat3, MathError};
