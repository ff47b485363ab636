use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};
use log::{debug, trace};

use crate::Template;

/// Fuzzy-searches titles and contents, best matches first.
///
/// Title matches weigh twice as much as content matches.
pub fn search_templates(templates: &[Template], query: &str) -> Vec<Template> {
    let matcher = SkimMatcherV2::default();

    let mut scored: Vec<(i64, &Template)> = templates
        .iter()
        .filter_map(|template| {
            let title_score = matcher.fuzzy_match(&template.title, query).unwrap_or(0);
            let content_score = matcher.fuzzy_match(&template.content, query).unwrap_or(0);
            let score = title_score * 2 + content_score;
            trace!("Template {} scored {}", template.id, score);
            (score > 0).then_some((score, template))
        })
        .collect();

    // Stable sort keeps newest-first order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    debug!("Search for '{}' matched {} templates", query, scored.len());

    scored.into_iter().map(|(_, t)| t.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: u64, title: &str, content: &str) -> Template {
        Template {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn title_matches_rank_above_content_matches() {
        let templates = vec![
            template(3, "Shipping notice", "your parcel is on its way"),
            template(2, "Welcome", "thanks for joining, here is your parcel tracker"),
            template(1, "Parcel delivered", ""),
        ];

        let results = search_templates(&templates, "parcel");
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn no_match_returns_empty() {
        let templates = vec![template(1, "Hello", "world")];
        assert!(search_templates(&templates, "zzzz").is_empty());
    }
}
