use difflib::sequencematcher::SequenceMatcher;

pub const KNOWN_BRANDS: [&str; 6] = ["paypal", "google", "apple", "amazon", "bank", "microsoft"];

/// Highest similarity ratio between `label` and any known brand.
pub fn brand_similarity(label: &str) -> f64 {
    KNOWN_BRANDS
        .iter()
        .map(|brand| sequence_ratio(label, brand))
        .fold(0.0, f64::max)
}

/// Ratcliff/Obershelp ratio over characters: `2 * M / T`, where `M` counts
/// characters in the matching blocks and `T` is the combined length.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // SequenceMatcher::ratio is f32, which shifts values sitting on the 0.8 threshold
    let matched: usize = SequenceMatcher::new(a.as_slice(), b.as_slice())
        .get_matching_blocks()
        .iter()
        .map(|m| m.size)
        .sum();
    2.0 * matched as f64 / total as f64
}
