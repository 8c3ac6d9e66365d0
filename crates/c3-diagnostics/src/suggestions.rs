// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Did-you-mean suggestions for misspelled words.

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest candidate to `word` within a length-scaled distance. Exact
/// matches are not suggestions.
pub fn closest_match<'a>(word: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let max_distance = match word.chars().count() {
        0..=2 => return None,
        3..=5 => 1,
        _ => 2,
    };

    candidates
        .into_iter()
        .filter(|c| c.len().abs_diff(word.len()) <= max_distance)
        .map(|c| (c, edit_distance(word, c)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(closest, _)| closest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_nearest_keyword() {
        let kws = ["return", "foreach", "foreach_r", "nextcase", "struct"];
        assert_eq!(closest_match("retrun", kws), Some("return"));
        assert_eq!(closest_match("strcut", kws), Some("struct"));
        assert_eq!(closest_match("banana", kws), None);
        assert_eq!(closest_match("return", kws), None);
    }

    #[test]
    fn short_words_are_left_alone() {
        assert_eq!(closest_match("fo", ["fn", "for"]), None);
    }

    #[test]
    fn distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
    }
}
