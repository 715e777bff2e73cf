//! Frame handling for the lens: sampling stills out of camera frames and
//! mapping analysis boxes onto the screen.

mod frame;
pub use frame::*;
pub mod geometry;
pub use geometry::{BoundingBox, ScreenRect, Size};
