//! Maze substrate: tiles, generation, persistence and routing
//!
//! A `TileGrid` is built once (generated or loaded) and only read afterwards.

pub mod layout;
pub mod maze;
pub mod path;
pub mod tile;

pub use layout::{TileCodes, decode_layout, encode_layout, read_layout, write_layout};
pub use maze::{MazeAlgorithm, MazeGenerator};
pub use path::{Route, find_path};
pub use tile::{Tile, TileGrid};
