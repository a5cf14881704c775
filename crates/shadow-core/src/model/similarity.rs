use std::collections::HashSet;

/// Lowercase, drop everything except ASCII alphanumerics and whitespace,
/// and collapse runs of whitespace to a single space.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character-set Jaccard similarity of two texts after normalization.
///
/// Two empty texts are identical (1.0); one empty text shares nothing (0.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    let overlap = set_a.intersection(&set_b).count();
    let total = set_a.union(&set_b).count();
    overlap as f64 / total as f64
}
