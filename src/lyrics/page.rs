//! Lyrics extraction from a Genius song page.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LYRICS_CONTAINER: Regex =
        Regex::new(r#"<div[^>]*data-lyrics-container="true"[^>]*>"#).unwrap();
    static ref EXCLUDED_BLOCK: Regex =
        Regex::new(r#"<div[^>]*data-exclude-from-selection="true"[^>]*>"#).unwrap();
    static ref DIV_TAG: Regex = Regex::new(r"<div\b[^>]*>|</div\s*>").unwrap();
    static ref LINE_BREAK: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap();
    static ref SECTION_HEADER: Regex = Regex::new(r"(\[.*?\])*").unwrap();
    static ref DOUBLE_NEWLINE: Regex = Regex::new(r"\n{2}").unwrap();
}

/// A `<div>` element located in a page: outer span and inner content span.
struct DivSpan {
    outer_start: usize,
    inner_start: usize,
    inner_end: usize,
    outer_end: usize,
}

/// Plain text of every lyrics container on the page, joined by newlines.
pub fn extract_lyrics(html: &str) -> String {
    let blocks: Vec<String> = find_divs(html, &LYRICS_CONTAINER)
        .into_iter()
        .map(|span| {
            let inner = remove_excluded(&html[span.inner_start..span.inner_end]);
            to_plain_text(&inner)
        })
        .collect();

    blocks.join("\n").trim().to_string()
}

/// Removes bracketed section headers such as `[Chorus]` and the blank lines they leave.
pub fn strip_section_headers(lyrics: &str) -> String {
    let without_headers = SECTION_HEADER.replace_all(lyrics, "");
    DOUBLE_NEWLINE
        .replace_all(&without_headers, "\n")
        .trim()
        .to_string()
}

fn remove_excluded(fragment: &str) -> String {
    let mut kept = String::with_capacity(fragment.len());
    let mut cursor = 0;
    for span in find_divs(fragment, &EXCLUDED_BLOCK) {
        kept.push_str(&fragment[cursor..span.outer_start]);
        cursor = span.outer_end;
    }
    kept.push_str(&fragment[cursor..]);
    kept
}

fn to_plain_text(fragment: &str) -> String {
    let with_newlines = LINE_BREAK.replace_all(fragment, "\n");
    let stripped = ANY_TAG.replace_all(&with_newlines, "");
    decode_entities(&stripped)
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16)
                        .ok()
                        .and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Finds the `<div>` elements whose opening tag matches `opening`, following nested divs
/// to the matching close tag. Unterminated elements run to the end of the input.
fn find_divs(html: &str, opening: &Regex) -> Vec<DivSpan> {
    let mut spans = Vec::new();
    let mut search_from = 0;

    while let Some(open) = opening.find_at(html, search_from) {
        let inner_start = open.end();
        let mut depth = 1usize;
        let mut inner_end = html.len();
        let mut outer_end = html.len();

        for tag in DIV_TAG.find_iter(&html[inner_start..]) {
            if tag.as_str().starts_with("</") {
                depth -= 1;
                if depth == 0 {
                    inner_end = inner_start + tag.start();
                    outer_end = inner_start + tag.end();
                    break;
                }
            } else {
                depth += 1;
            }
        }

        spans.push(DivSpan {
            outer_start: open.start(),
            inner_start,
            inner_end,
            outer_end,
        });
        search_from = outer_end;
    }

    spans
}
