fn fold(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn distance_budget(folded: &str) -> usize {
    match folded.len() {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        n => (n / 3).max(3),
    }
}

/// Closest candidates to `input`, best first. Case, `_` and `-` are ignored;
/// substring matches rank right after exact ones.
pub fn suggest<S: AsRef<str>>(input: &str, candidates: &[S], limit: usize) -> Vec<String> {
    let needle = fold(input);
    if needle.is_empty() {
        return Vec::new();
    }
    let budget = distance_budget(&needle);

    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|c| AsRef::<str>::as_ref(c))
        .filter_map(|candidate: &str| {
            let folded = fold(candidate);
            if folded.is_empty() {
                return None;
            }
            let score = if folded == needle {
                0
            } else if folded.contains(&needle) || needle.contains(&folded) {
                1
            } else {
                edit_distance(&needle, &folded)
            };
            (score <= budget).then_some((score, candidate))
        })
        .collect();

    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
