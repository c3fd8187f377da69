//! Evidence aggregation into a single verdict.

use tracing::debug;

use crate::core::{DetectionResult, Language};

/// Pick the most frequent candidate and derive its confidence.
///
/// Ties go to the language discovered first. With no candidates the result
/// is `Unknown` at confidence 0.
pub fn finalize(result: &mut DetectionResult) {
    let Some((language, count)) = most_frequent(&result.candidate_languages) else {
        result.primary_language = Language::Unknown;
        result.confidence = 0.0;
        return;
    };

    result.primary_language = language;
    result.confidence = count as f64 / result.candidate_languages.len() as f64;
    debug!(
        language = %language,
        count,
        total = result.candidate_languages.len(),
        "aggregated evidence"
    );
}

/// Most frequent language and its count; the first to reach the maximum wins.
pub fn most_frequent(candidates: &[Language]) -> Option<(Language, usize)> {
    let mut tallies: Vec<(Language, usize)> = Vec::new();
    for &language in candidates {
        match tallies.iter_mut().find(|(l, _)| *l == language) {
            Some((_, count)) => *count += 1,
            None => tallies.push((language, 1)),
        }
    }

    tallies
        .into_iter()
        .fold(None, |best: Option<(Language, usize)>, (language, count)| {
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((language, count)),
            }
        })
}
