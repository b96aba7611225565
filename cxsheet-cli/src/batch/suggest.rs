//! "Did you mean" suggestions for display names missing from the agent

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// How a suggestion was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Same name once case and separators are ignored
    Normalized,
    /// Best fuzzy subsequence score
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub match_type: MatchType,
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | '.' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Closest candidate to `target`, normalized matches first
pub fn suggest<'a>(target: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<Suggestion> {
    let candidates: Vec<&str> = candidates.into_iter().collect();

    let wanted = normalize(target);
    if let Some(found) = candidates.iter().find(|c| normalize(c) == wanted) {
        return Some(Suggestion {
            name: found.to_string(),
            match_type: MatchType::Normalized,
        });
    }

    let matcher = SkimMatcherV2::default();
    let target_lower = target.to_lowercase();
    candidates
        .iter()
        .filter_map(|candidate| {
            let candidate_lower = candidate.to_lowercase();
            let forward = matcher.fuzzy_match(&candidate_lower, &target_lower);
            let backward = matcher.fuzzy_match(&target_lower, &candidate_lower);
            forward.max(backward).map(|score| (*candidate, score))
        })
        .max_by_key(|(_, score)| *score)
        .map(|(name, _)| Suggestion {
            name: name.to_string(),
            match_type: MatchType::Fuzzy,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_match_wins() {
        let found = suggest("Order.Status", ["greeting", "order_status", "order"]).unwrap();
        assert_eq!(found.name, "order_status");
        assert_eq!(found.match_type, MatchType::Normalized);
    }

    #[test]
    fn test_fuzzy_match() {
        let found = suggest("ordr", ["greeting", "order"]).unwrap();
        assert_eq!(found.name, "order");
        assert_eq!(found.match_type, MatchType::Fuzzy);
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(suggest("anything", Vec::<&str>::new()), None);
        assert_eq!(suggest("xyz", ["abc"]), None);
    }
}
