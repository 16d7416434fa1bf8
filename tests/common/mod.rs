//! Common test infrastructure
//!
//! Builds the dataset fixtures on disk and runs a local stand-in for the Genius API and
//! the reference table downloads. Tests only import from this module.

mod constants;
mod fixtures;
mod server;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{create_mxm_db, genre_table_text, match_list_text, test_config, zip_text};
pub use server::MockServer;
