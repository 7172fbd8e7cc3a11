//! Suggestion ranking over the cached app list.

use crate::provider::AppEntry;

use super::types::Suggestion;

/// Rank name matches for the suggestion dropdown: exact matches first,
/// then shorter names, then alphabetical. Matching is a case-insensitive
/// substring test against the full catalog list.
pub(crate) fn rank_suggestions(apps: &[AppEntry], query: &str, limit: usize) -> Vec<Suggestion> {
    let needle = query.to_lowercase();

    let mut matches: Vec<&AppEntry> = apps
        .iter()
        .filter(|app| app.name.to_lowercase().contains(&needle))
        .collect();

    matches.sort_by(|a, b| {
        let a_exact = a.name.to_lowercase() == needle;
        let b_exact = b.name.to_lowercase() == needle;
        b_exact
            .cmp(&a_exact)
            .then(a.name.len().cmp(&b.name.len()))
            .then(a.name.cmp(&b.name))
    });

    matches
        .into_iter()
        .take(limit)
        .map(|app| Suggestion {
            id: app.id,
            name: app.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn names(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let apps = vec![
            fixtures::app_entry(1, "Portal 2"),
            fixtures::app_entry(2, "portal"),
            fixtures::app_entry(3, "Portal Stories: Mel"),
        ];

        let ranked = rank_suggestions(&apps, "Portal", 8);

        assert_eq!(names(&ranked), vec!["portal", "Portal 2", "Portal Stories: Mel"]);
    }

    #[test]
    fn test_shorter_names_beat_longer_ones() {
        let apps = vec![
            fixtures::app_entry(1, "Half-Life 2: Episode One"),
            fixtures::app_entry(2, "Half-Life"),
            fixtures::app_entry(3, "Half-Life 2"),
        ];

        let ranked = rank_suggestions(&apps, "half", 8);

        assert_eq!(
            names(&ranked),
            vec!["Half-Life", "Half-Life 2", "Half-Life 2: Episode One"]
        );
    }

    #[test]
    fn test_equal_length_ties_break_alphabetically() {
        let apps = vec![
            fixtures::app_entry(1, "Arma X"),
            fixtures::app_entry(2, "Arma 3"),
        ];

        let ranked = rank_suggestions(&apps, "arma", 8);

        assert_eq!(names(&ranked), vec!["Arma 3", "Arma X"]);
    }

    #[test]
    fn test_limit_truncates_matches() {
        let apps: Vec<_> = (1..=20)
            .map(|i| fixtures::app_entry(i, &format!("Game {:02}", i)))
            .collect();

        let ranked = rank_suggestions(&apps, "game", 8);

        assert_eq!(ranked.len(), 8);
        assert_eq!(ranked[0].name, "Game 01");
    }

    #[test]
    fn test_non_matching_query_is_empty() {
        let apps = vec![fixtures::app_entry(1, "Portal")];

        assert!(rank_suggestions(&apps, "doom", 8).is_empty());
    }
}
