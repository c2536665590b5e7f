use std::sync::LazyLock;

use regex::Regex;

use super::LexiconEntry;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse runs of whitespace so surfaces spanning a stray line break still
/// match.
pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Count surface occurrences in `text` for one aspect's entries, longest match
/// wins and matches never overlap. "친절" inside "불친절" counts once, for
/// "불친절". Returns counts aligned to the entry order of the slice.
pub fn count_matches(text: &str, entries: &[LexiconEntry]) -> Vec<u32> {
    let mut counts = vec![0u32; entries.len()];
    if text.is_empty() || entries.is_empty() {
        return counts;
    }

    // entry indices, longest surface first; ties keep lexicon order
    let mut by_len: Vec<usize> = (0..entries.len()).collect();
    by_len.sort_by_key(|&i| std::cmp::Reverse(entries[i].surface.len()));

    let mut rest = text;
    'scan: while !rest.is_empty() {
        for &i in &by_len {
            let surface = entries[i].surface.as_str();
            if rest.starts_with(surface) {
                counts[i] += 1;
                rest = &rest[surface.len()..];
                continue 'scan;
            }
        }
        let step = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        rest = &rest[step..];
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(surfaces: &[&str]) -> Vec<LexiconEntry> {
        surfaces
            .iter()
            .map(|s| LexiconEntry::new(s, 1, 0.5))
            .collect()
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  친절하고 \n 깨끗해요  "), "친절하고 깨끗해요");
    }

    #[test]
    fn counts_simple_occurrences() {
        let lex = entries(&["친절"]);
        assert_eq!(count_matches("친절하고 정말 친절해요", &lex), vec![2]);
    }

    #[test]
    fn longest_match_wins() {
        let lex = entries(&["친절", "불친절"]);
        assert_eq!(count_matches("직원이 불친절해요", &lex), vec![0, 1]);
    }

    #[test]
    fn matches_do_not_overlap() {
        let lex = entries(&["과잉진료", "과잉"]);
        assert_eq!(count_matches("과잉진료 의심", &lex), vec![1, 0]);
    }

    #[test]
    fn empty_text_yields_zeroes() {
        let lex = entries(&["친절"]);
        assert_eq!(count_matches("", &lex), vec![0]);
    }
}
