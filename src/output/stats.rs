//! Statistics over a persisted dataset
//!
//! This module provides functionality for summarising a loaded record mapping
//! and printing the result.

use crate::store::RecordMap;
use std::collections::HashMap;

/// Dataset statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStatistics {
    /// Total number of records
    pub total_records: usize,

    /// Records with a non-empty phone number
    pub with_phone: usize,

    /// Records with a non-empty website
    pub with_website: usize,

    /// Records whose rating parses as a number
    pub rated: usize,

    /// Mean of the parseable ratings, if any
    pub average_rating: Option<f64>,

    /// Sum of the parseable review counts
    pub total_reviews: u64,

    /// Count of records by category (blank categories counted as "Uncategorized")
    pub by_category: HashMap<String, usize>,
}

fn parse_review_count(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Computes statistics for a record mapping
///
/// # Arguments
///
/// * `records` - The loaded dataset
///
/// # Returns
///
/// The computed statistics; an empty mapping yields all zeros
pub fn compute_statistics(records: &RecordMap) -> DatasetStatistics {
    let mut stats = DatasetStatistics {
        total_records: records.len(),
        ..DatasetStatistics::default()
    };
    let mut rating_sum = 0.0;

    for record in records.values() {
        if !record.phone.trim().is_empty() {
            stats.with_phone += 1;
        }
        if !record.website.trim().is_empty() {
            stats.with_website += 1;
        }
        if let Ok(rating) = record.rating_value.trim().parse::<f64>() {
            stats.rated += 1;
            rating_sum += rating;
        }
        if let Some(reviews) = parse_review_count(&record.review_count) {
            stats.total_reviews = stats.total_reviews.saturating_add(reviews);
        }

        let category = match record.category.trim() {
            "" => "Uncategorized",
            other => other,
        };
        *stats.by_category.entry(category.to_string()).or_insert(0) += 1;
    }

    if stats.rated > 0 {
        stats.average_rating = Some(rating_sum / stats.rated as f64);
    }

    stats
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!(
        "  With phone: {} ({:.1}%)",
        stats.with_phone,
        percentage(stats.with_phone, stats.total_records)
    );
    println!(
        "  With website: {} ({:.1}%)",
        stats.with_website,
        percentage(stats.with_website, stats.total_records)
    );
    println!("  Rated: {}", stats.rated);
    match stats.average_rating {
        Some(average) => println!("  Average rating: {:.2}", average),
        None => println!("  Average rating: n/a"),
    }
    println!("  Total reviews: {}", stats.total_reviews);
    println!();

    if !stats.by_category.is_empty() {
        println!("Records by Category:");
        // Sort categories by count (descending), then name
        let mut counts: Vec<_> = stats.by_category.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (category, count) in counts {
            println!("  {}: {}", category, count);
        }
        println!();
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}
