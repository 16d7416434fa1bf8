//! Tabular files exchanged between the dataset stages.

mod records;
mod reference;

pub use records::{read_csv, write_csv, EnrichedRecord, IdentifierMapping};
pub use reference::{
    parse_genre_table, parse_match_table, read_genre_table, read_match_table, GenreRow, MatchRow,
    GENRE_TABLE_SKIP_LINES, MATCH_TABLE_SKIP_LINES,
};
