//! Shared constants for the integration tests

/// Token the mock Genius API accepts.
pub const TEST_TOKEN: &str = "test-token";

/// Rows of the SQLite `lyrics` table: (track_id, mxm_tid, is_test).
/// Every row is inserted once per word, like the real bag-of-words table.
pub const DB_MAPPINGS: &[(&str, i64, i64)] = &[
    ("TRAAAAV128F421A322", 4418550, 0),
    ("TRAAABD128F429CF47", 10162, 1),
    ("TRAAAED128E0783FAB", 2569958, 0),
    ("TRAAAEF128F4273421", 7420, 0),
    ("TRAAAEW128F42930C0", 8541019, 1),
];

/// Rows of the match list: (msd_tid, mxm_artist_name, mxm_title).
/// `TRAAAEW128F42930C0` is missing so the first join drops it.
pub const MATCH_ROWS: &[(&str, &str, &str)] = &[
    ("TRAAAAV128F421A322", "Western Addiction", "A Poor Recipe For Civic Cohesion"),
    ("TRAAABD128F429CF47", "The Box Tops", "Soul Deep"),
    ("TRAAAED128E0783FAB", "Jamie Cullum", "It's About Time"),
    ("TRAAAEF128F4273421", "Adam Ant", "Something Girls"),
    ("TRZZZZZ128F4200000", "Nobody", "Unmapped Track"),
];

/// Rows of the genre table. `TRAAAEF128F4273421` has no genre so the second join drops it.
pub const GENRE_ROWS: &[(&str, &str)] = &[
    ("TRAAAAV128F421A322", "Punk"),
    ("TRAAABD128F429CF47", "RnB"),
    ("TRAAAED128E0783FAB", "Jazz"),
    ("TRAAAEW128F42930C0", "Pop"),
];

/// Track ids expected in `data_no_lyrics.csv` after both joins.
pub const MERGED_IDS: &[&str] = &[
    "TRAAAAV128F421A322",
    "TRAAABD128F429CF47",
    "TRAAAED128E0783FAB",
];

/// Title with complete lyrics on the mock Genius.
pub const LYRICS_TITLE: &str = "A Poor Recipe For Civic Cohesion";
/// Lyrics of [`LYRICS_TITLE`] once extracted and stripped of section headers.
pub const LYRICS_TEXT: &str = "Tick tock, tick tock\nThe clock is ticking";
/// Title the mock Genius knows as an instrumental.
pub const INSTRUMENTAL_TITLE: &str = "Soul Deep";
/// Title the mock Genius has no hits for.
pub const UNKNOWN_TITLE: &str = "It's About Time";
/// Search query that makes the mock Genius fail before answering.
pub const FLAKY_TITLE: &str = "Something Girls";
