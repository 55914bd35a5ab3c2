// Library root for the tactics-board domain: formations, slot assignment,
// rating aggregation, saved analyses, favourite and custom teams. Nothing in
// here performs I/O; the app crate wires these types to the backend and the
// event loop.

pub mod analysis;
pub mod assignment;
pub mod board;
pub mod custom_team;
pub mod favourites;
pub mod formation;
pub mod player;
pub mod position;
pub mod rating;
pub mod strategy;
