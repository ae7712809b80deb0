//! "Did you mean" suggestions for targets missing from the graph.

use crate::graph::GraphSnapshot;

/// Produces node ids similar to a target that was not found.
pub trait SuggestionProvider: Send + Sync {
    /// Up to a handful of node ids resembling `target`, best first.
    fn suggest(&self, target: &str, graph: &GraphSnapshot) -> Vec<String>;
}

/// Suggests nodes by file name.
///
/// Ranking, best first:
/// 1. same file name (`auth.ts` for `src/auth.ts`)
/// 2. same file stem (`auth.js` for `src/auth.ts`)
/// 3. path contains the stem (`src/auth/index.ts`)
///
/// Ties prefer shorter ids.
#[derive(Debug, Clone, Copy)]
pub struct FileNameSuggester {
    limit: usize,
}

impl Default for FileNameSuggester {
    fn default() -> Self {
        Self { limit: 5 }
    }
}

impl FileNameSuggester {
    /// Create a suggester returning at most `limit` ids.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    }
}

impl SuggestionProvider for FileNameSuggester {
    fn suggest(&self, target: &str, graph: &GraphSnapshot) -> Vec<String> {
        let wanted_name = file_name(target).to_ascii_lowercase();
        let wanted_stem = stem(&wanted_name).to_string();
        if wanted_stem.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(u8, &str)> = graph
            .graph()
            .nodes
            .iter()
            .filter_map(|node| {
                let id = node.id.as_str();
                let lower = id.to_ascii_lowercase();
                let name = file_name(&lower);
                let rank = if name == wanted_name {
                    0
                } else if stem(name) == wanted_stem {
                    1
                } else if lower.contains(&wanted_stem) {
                    2
                } else {
                    return None;
                };
                Some((rank, id))
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.len().cmp(&b.1.len()))
                .then(a.1.cmp(b.1))
        });

        ranked
            .into_iter()
            .take(self.limit)
            .map(|(_, id)| id.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Graph;

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::build(Graph::from_pairs(
            &[
                "src/services/auth.ts",
                "lib/auth.js",
                "src/auth/index.ts",
                "src/main.ts",
                "test/authentication.spec.ts",
            ],
            &[],
        ))
    }

    #[test]
    fn ranks_by_name_then_stem_then_substring() {
        let suggestions = FileNameSuggester::default().suggest("src/auth.ts", &snapshot());

        assert_eq!(
            suggestions,
            vec![
                "src/services/auth.ts",
                "lib/auth.js",
                "src/auth/index.ts",
                "test/authentication.spec.ts",
            ]
        );
    }

    #[test]
    fn respects_limit() {
        let suggestions = FileNameSuggester::new(2).suggest("auth.ts", &snapshot());
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn unrelated_target_has_no_suggestions() {
        assert!(
            FileNameSuggester::default()
                .suggest("src/zzz.ts", &snapshot())
                .is_empty()
        );
    }

    #[test]
    fn stem_ignores_leading_dot() {
        assert_eq!(stem(".env"), ".env");
        assert_eq!(stem("auth.spec.ts"), "auth.spec");
    }
}
