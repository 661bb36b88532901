//! Adapters between the game and the outside world: CSV catalog import and the
//! line-oriented terminal front end.

pub mod csv;
pub mod terminal;
