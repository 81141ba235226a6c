//! Model selection over a dynamically discovered model list.
//!
//! The set of models an API key can reach changes over time, so the model is
//! picked at run time from whatever the provider reports, using an ordered
//! list of preferred name fragments. Everything here is pure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Preferred model name fragments, most preferred first.
pub const DEFAULT_PREFERENCES: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "text-bison",
    "chat-bison",
];

/// How a model was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// The explicitly requested model was found.
    Requested,
    /// A preferred model was used instead.
    Preferred,
    /// Nothing preferred was available; the first listed model was used.
    FirstAvailable,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Requested => write!(f, "requested"),
            Selection::Preferred => write!(f, "preferred"),
            Selection::FirstAvailable => write!(f, "first available"),
        }
    }
}

/// A resolved model and how it was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChoice {
    /// Full model name as listed by the provider (e.g. `models/gemini-1.5-flash`).
    pub name: String,
    pub selection: Selection,
}

/// Strip any resource path, keeping the part after the last `/`.
///
/// `models/gemini-1.5-flash` becomes `gemini-1.5-flash`.
pub fn short_model_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Pick a model by preference.
///
/// For each preference in order, the first available name containing it
/// wins. When no preference matches, the first available name is used.
/// Returns `None` only when `available` is empty.
pub fn select_model<A, P>(available: &[A], preferences: &[P]) -> Option<String>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    find_preferred(available, preferences)
        .or_else(|| available.first())
        .map(|m| m.as_ref().to_string())
}

/// Resolve the model to use for a request.
///
/// A requested model matches any available name containing either the
/// requested name or its short form. Without a request, or when it is not
/// available, falls back to [`select_model`].
pub fn resolve_model<A, P>(
    available: &[A],
    requested: Option<&str>,
    preferences: &[P],
) -> Option<ModelChoice>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    if let Some(requested) = requested.filter(|r| !r.trim().is_empty()) {
        let short = short_model_name(requested);
        let found = available.iter().find(|m| {
            let m = m.as_ref();
            m.contains(short) || m.contains(requested)
        });
        if let Some(name) = found {
            return Some(ModelChoice {
                name: name.as_ref().to_string(),
                selection: Selection::Requested,
            });
        }
        tracing::warn!(
            requested,
            "requested model not available, looking for alternatives"
        );
    }

    if let Some(name) = find_preferred(available, preferences) {
        return Some(ModelChoice {
            name: name.as_ref().to_string(),
            selection: Selection::Preferred,
        });
    }

    available.first().map(|name| ModelChoice {
        name: name.as_ref().to_string(),
        selection: Selection::FirstAvailable,
    })
}

/// Models worth offering to a user: the first match for each preference, or
/// the first `limit` available models when nothing preferred is listed.
pub fn model_options<A, P>(available: &[A], preferences: &[P], limit: usize) -> Vec<String>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    let preferred: Vec<String> = preferences
        .iter()
        .filter_map(|p| {
            available
                .iter()
                .find(|m| m.as_ref().contains(p.as_ref()))
                .map(|m| m.as_ref().to_string())
        })
        .collect();

    if !preferred.is_empty() {
        return preferred;
    }

    available
        .iter()
        .take(limit)
        .map(|m| m.as_ref().to_string())
        .collect()
}

fn find_preferred<'a, A, P>(available: &'a [A], preferences: &[P]) -> Option<&'a A>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    preferences.iter().find_map(|p| {
        available
            .iter()
            .find(|m| m.as_ref().contains(p.as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTED: &[&str] = &[
        "models/embedding-001",
        "models/gemini-1.5-pro-latest",
        "models/gemini-1.5-flash-002",
        "models/text-bison-001",
    ];

    #[test]
    fn short_name_strips_path() {
        assert_eq!(short_model_name("models/gemini-1.5-flash"), "gemini-1.5-flash");
        assert_eq!(short_model_name("gemini-1.5-flash"), "gemini-1.5-flash");
        assert_eq!(short_model_name("a/b/c"), "c");
    }

    #[test]
    fn preference_order_wins_over_list_order() {
        let chosen = select_model(LISTED, DEFAULT_PREFERENCES);
        assert_eq!(chosen.as_deref(), Some("models/gemini-1.5-flash-002"));
    }

    #[test]
    fn falls_back_to_first_available() {
        let available = ["models/gemma-2", "models/other"];
        assert_eq!(
            select_model(&available, DEFAULT_PREFERENCES).as_deref(),
            Some("models/gemma-2")
        );
    }

    #[test]
    fn empty_list_selects_nothing() {
        let available: [&str; 0] = [];
        assert_eq!(select_model(&available, DEFAULT_PREFERENCES), None);
        assert_eq!(resolve_model(&available, Some("gemini-1.5-pro"), DEFAULT_PREFERENCES), None);
    }

    #[test]
    fn requested_model_matches_by_short_name() {
        let choice = resolve_model(LISTED, Some("models/gemini-1.5-pro"), DEFAULT_PREFERENCES)
            .unwrap();
        assert_eq!(choice.name, "models/gemini-1.5-pro-latest");
        assert_eq!(choice.selection, Selection::Requested);
    }

    #[test]
    fn missing_request_falls_back_to_preferences() {
        let choice = resolve_model(LISTED, Some("gemini-ultra"), DEFAULT_PREFERENCES).unwrap();
        assert_eq!(choice.name, "models/gemini-1.5-flash-002");
        assert_eq!(choice.selection, Selection::Preferred);

        let choice = resolve_model(LISTED, None, DEFAULT_PREFERENCES).unwrap();
        assert_eq!(choice.selection, Selection::Preferred);
    }

    #[test]
    fn nothing_preferred_uses_first_listed() {
        let available = vec!["models/gemma-2".to_string()];
        let no_prefs: [&str; 0] = [];
        let choice = resolve_model(&available, None, &no_prefs).unwrap();
        assert_eq!(choice.name, "models/gemma-2");
        assert_eq!(choice.selection, Selection::FirstAvailable);
    }

    #[test]
    fn options_list_preferred_models_in_order() {
        let options = model_options(LISTED, DEFAULT_PREFERENCES, 5);
        assert_eq!(
            options,
            vec![
                "models/gemini-1.5-flash-002",
                "models/gemini-1.5-pro-latest",
                "models/text-bison-001",
            ]
        );
    }

    #[test]
    fn options_without_preferred_take_first_n() {
        let available = ["a", "b", "c", "d", "e", "f"];
        let options = model_options(&available, DEFAULT_PREFERENCES, 5);
        assert_eq!(options, vec!["a", "b", "c", "d", "e"]);
    }
}
