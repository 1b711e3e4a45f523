//! Card catalog: the standard development cards, nobles and opening setup.
//!
//! ## Key Types
//!
//! - `CatalogError`: Malformed card table or an unplayable catalog
//!
//! ## Entry Points
//!
//! - `setup_game`: Shuffle the standard catalog and deal a two-player board
//! - `setup_game_with`: Same for a custom card and noble set

pub mod catalog;

pub use catalog::{
    build_decks, parse_cards, setup_game, setup_game_with, standard_cards, standard_nobles,
    CatalogError,
};
