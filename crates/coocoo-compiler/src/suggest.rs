//! "Did you mean" suggestions for misspelled names.

/// Closest candidate within a small edit distance, ties broken by order.
pub fn closest<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let threshold = (query.chars().count() / 3).clamp(1, 3);
    candidates
        .into_iter()
        .filter(|c| *c != query)
        .map(|c| (levenshtein_distance(query, c), c))
        .filter(|(dist, _)| *dist <= threshold)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, c)| c)
}

/// Levenshtein distance between two strings, using a single rolling row.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let chars2: Vec<char> = s2.chars().collect();
    let mut row: Vec<usize> = (0..=chars2.len()).collect();

    for (i, c1) in s1.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, c2) in chars2.iter().enumerate() {
            let cost = usize::from(c1 != *c2);
            let next = (row[j] + 1).min(row[j + 1] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[chars2.len()]
}
