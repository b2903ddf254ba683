use crate::{CategoryMap, MovieRecord, RawEntry};

/// Converts one raw catalog entry into the canonical record shape.
///
/// Pure function: no shared state is touched, so it is safe to call from
/// any number of concurrent batches against the same category map.
pub fn normalize(raw: &RawEntry, categories: &CategoryMap, include_adult: bool) -> MovieRecord {
    let genre = raw
        .genre_ids
        .iter()
        .flatten()
        .filter_map(|id| categories.get(id))
        .filter(|name| !name.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    MovieRecord {
        title: raw.title.clone().unwrap_or_default(),
        year: raw
            .release_date
            .as_deref()
            .map(release_year)
            .unwrap_or_default(),
        rating: raw.vote_average.unwrap_or(0.0),
        description: raw
            .overview
            .as_deref()
            .map(flatten_newlines)
            .unwrap_or_default(),
        genre,
        // The field is omitted entirely when the flag is off, not set false.
        adult: include_adult.then(|| raw.adult.unwrap_or(false)),
    }
}

/// Leading date segment when it is exactly four ASCII digits, else empty.
fn release_year(date: &str) -> String {
    let head = date.split('-').next().unwrap_or("");
    if head.len() == 4 && head.bytes().all(|b| b.is_ascii_digit()) {
        head.to_string()
    } else {
        String::new()
    }
}

fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}
