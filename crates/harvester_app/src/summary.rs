use std::collections::BTreeSet;

use harvester_core::MovieRecord;

/// Aggregate statistics for a harvested dataset.
#[derive(Debug, PartialEq)]
pub struct DatasetSummary {
    pub total: usize,
    pub year_range: Option<(String, String)>,
    pub average_rating: Option<f64>,
    pub distinct_genres: usize,
}

pub fn summarize(records: &[MovieRecord]) -> DatasetSummary {
    let mut years: Vec<&str> = records
        .iter()
        .map(|record| record.year.as_str())
        .filter(|year| !year.is_empty())
        .collect();
    years.sort_unstable();
    let year_range = match (years.first(), years.last()) {
        (Some(min), Some(max)) => Some(((*min).to_string(), (*max).to_string())),
        _ => None,
    };

    let average_rating = if records.is_empty() {
        None
    } else {
        let sum: f64 = records.iter().map(|record| record.rating).sum();
        Some(sum / records.len() as f64)
    };

    let distinct_genres = records
        .iter()
        .flat_map(|record| record.genre.split(", "))
        .filter(|genre| !genre.is_empty())
        .collect::<BTreeSet<_>>()
        .len();

    DatasetSummary {
        total: records.len(),
        year_range,
        average_rating,
        distinct_genres,
    }
}

pub fn print_summary(summary: &DatasetSummary) {
    log::info!("Dataset summary:");
    log::info!("  Total movies: {}", summary.total);
    if let Some((min, max)) = &summary.year_range {
        log::info!("  Year range: {min} - {max}");
    }
    if let Some(average) = summary.average_rating {
        log::info!("  Average rating: {average:.1}");
    }
    log::info!("  Distinct genres: {}", summary.distinct_genres);
}
