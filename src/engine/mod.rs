pub mod aggregate;
pub mod attachments;
pub mod batch;
pub mod grid;
pub mod interpolate;
pub mod pipeline;

pub use batch::{Engine, RoomQuery};
