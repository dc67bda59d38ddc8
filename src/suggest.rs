//! Typo-aware suggestion machinery.
//!
//! Backs both the validator's "Did you mean ...?" hints and the linter's
//! automatic fixes. A correction is only ever offered when it is
//! unambiguous.

/// Maximum edit distance at which a candidate still counts as a near miss.
pub const MAX_SUGGEST_DISTANCE: usize = 2;

/// An automatically applicable correction for one source line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Fix {
    pub line: usize,
    pub old_text: String,
    pub new_text: String,
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Rank candidates by case-insensitive edit distance, nearest first; ties
/// break alphabetically so output is stable across runs.
fn ranked<'a>(word: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let word_lower = word.to_lowercase();
    let mut scored: Vec<(&str, usize)> = candidates
        .into_iter()
        .map(|c| (c, levenshtein(&word_lower, &c.to_lowercase())))
        .collect();
    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    scored
}

/// All candidates within [`MAX_SUGGEST_DISTANCE`] of `word`, nearest first.
pub fn find_similar<'a>(
    word: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Vec<&'a str> {
    ranked(word, candidates)
        .into_iter()
        .filter(|(_, d)| *d <= MAX_SUGGEST_DISTANCE)
        .map(|(c, _)| c)
        .collect()
}

/// Build the suffix for an "unknown X" diagnostic.
///
/// A "Did you mean" hint is emitted only when a single candidate is strictly
/// nearest; otherwise small candidate sets are listed and large ones
/// summarized by count.
pub fn format_alternatives<'a>(
    word: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> String {
    let scored = ranked(word, candidates);
    if scored.is_empty() {
        return "none defined in schema".to_string();
    }

    let near: Vec<&(&str, usize)> = scored
        .iter()
        .filter(|(_, d)| *d <= MAX_SUGGEST_DISTANCE)
        .collect();
    let unique_best = match near.as_slice() {
        [] => None,
        [only] => Some(only.0),
        [best, second, ..] if best.1 < second.1 => Some(best.0),
        _ => None,
    };
    if let Some(best) = unique_best {
        return format!("Did you mean '{best}'?");
    }

    if scored.len() <= 5 {
        let mut names: Vec<&str> = scored.iter().map(|(c, _)| *c).collect();
        names.sort_unstable();
        format!("Valid options: {}", names.join(", "))
    } else {
        format!("{} defined in schema", scored.len())
    }
}

/// An obvious fix exists only when exactly one candidate sits within the
/// suggestion distance.
pub fn obvious_fix<'a>(
    word: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    line: usize,
) -> Option<Fix> {
    let near = find_similar(word, candidates);
    match near.as_slice() {
        [only] => Some(Fix {
            line,
            old_text: word.to_string(),
            new_text: (*only).to_string(),
        }),
        _ => None,
    }
}
