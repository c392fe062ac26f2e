use std::collections::BTreeSet;

/// Trims and lowercases free text before comparison.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whitespace-separated tokens of an already normalized string, deduplicated
/// and sorted.
pub fn token_set(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

/// Normalized Indel similarity: `2 * LCS / (len_a + len_b)` over chars.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (2 * lcs_len(&a, &b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Order-insensitive token overlap similarity in `[0, 1]`.
///
/// Both inputs are expected to be normalized. Tokens shared by both sides are
/// compared as a sorted block against each side's full token list, so word
/// order and duplicated words do not affect the score.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = token_set(a);
    let tokens_b = token_set(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = join(tokens_a.intersection(&tokens_b));
    let diff_ab = join(tokens_a.difference(&tokens_b));
    let diff_ba = join(tokens_b.difference(&tokens_a));

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    let combined_ab = concat(&intersection, &diff_ab);
    let combined_ba = concat(&intersection, &diff_ba);

    ratio(&intersection, &combined_ab)
        .max(ratio(&intersection, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn concat(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Hello World \n"), "hello world");
    }

    #[test]
    fn ratio_edges() {
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("abc", "abc"), 1.0);
        assert!((ratio("pyton", "python") - 10.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn token_order_does_not_matter() {
        assert_eq!(token_set_ratio("new york mets", "mets new york"), 1.0);
    }

    #[test]
    fn subset_of_tokens_is_full_match() {
        assert_eq!(token_set_ratio("the answer", "the answer is here"), 1.0);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(token_set_ratio("", "python"), 0.0);
        assert_eq!(token_set_ratio("python", "   "), 0.0);
    }

    #[test]
    fn partial_overlap_is_between_bounds() {
        let score = token_set_ratio("red apple", "green apple");
        assert!(score > 0.0 && score < 1.0, "got {}", score);
    }
}
