//! Change categories and commit classification
//!
//! The category table is fixed and ordered; a commit belongs to the first
//! category listing its type. Filters decide which categories survive and
//! which commits inside a surviving category are kept.

use chronicle_core::{ChangelogSettings, Language};

use crate::types::ParsedCommit;

/// Related-issue verb for categories that don't set their own
pub const DEFAULT_ISSUE_PREFIX: &str = "addresses";

/// A changelog section definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeCategory {
    /// Commit types grouped under this category
    pub types: &'static [&'static str],
    /// Section label in English
    pub label: &'static str,
    /// Section label in Chinese
    pub label_zh: &'static str,
    /// Gitmoji shortcode
    pub icon: &'static str,
    /// Verb used on related-issue lines
    pub related_issue_prefix: &'static str,
}

impl ChangeCategory {
    const fn new(
        types: &'static [&'static str],
        [label, label_zh]: [&'static str; 2],
        icon: &'static str,
    ) -> Self {
        Self {
            types,
            label,
            label_zh,
            icon,
            related_issue_prefix: DEFAULT_ISSUE_PREFIX,
        }
    }

    const fn with_issue_prefix(mut self, prefix: &'static str) -> Self {
        self.related_issue_prefix = prefix;
        self
    }

    /// Section label for a language
    pub fn label_in(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.label,
            Language::Zh => self.label_zh,
        }
    }

    /// Check if a commit type belongs here
    pub fn matches(&self, commit_type: &str) -> bool {
        self.types.contains(&commit_type)
    }
}

/// Categories in display priority order
pub static CATEGORIES: &[ChangeCategory] = &[
    ChangeCategory::new(&["feat", "feature"], ["New Features", "新特性"], ":sparkles:"),
    ChangeCategory::new(&["fix", "bugfix"], ["Bug Fixes", "`Bug` 修复"], ":bug:")
        .with_issue_prefix("fixes"),
    ChangeCategory::new(&["perf"], ["Performance Improvements", "性能优化"], ":zap:"),
    ChangeCategory::new(&["refactor"], ["Refactors", "重构"], ":recycle:"),
    ChangeCategory::new(&["test", "tests"], ["Tests", "测试"], ":white_check_mark:"),
    ChangeCategory::new(&["build", "ci"], ["Build System", "构建"], ":construction_worker:"),
    ChangeCategory::new(&["doc", "docs"], ["Documentation Changes", "文档"], ":memo:"),
    ChangeCategory::new(&["style"], ["Code Style Changes", "格式"], ":art:"),
    ChangeCategory::new(&["chore"], ["Chores", "变动"], ":wrench:"),
    ChangeCategory::new(&["other"], ["Other Changes", "其他"], ":flying_saucer:"),
];

/// First category listing a commit type
pub fn category_for(commit_type: &str) -> Option<&'static ChangeCategory> {
    CATEGORIES.iter().find(|c| c.matches(commit_type))
}

/// Type and scope filters
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// When non-empty, only these types are kept
    pub restrict_to_types: Vec<String>,
    /// Types left out (ignored while a restriction is active)
    pub exclude_types: Vec<String>,
    /// Scopes left out
    pub exclude_scopes: Vec<String>,
}

impl CategoryFilter {
    /// Build the filter from settings
    pub fn from_settings(settings: &ChangelogSettings) -> Self {
        Self {
            restrict_to_types: settings.restrict_to_types.clone(),
            exclude_types: settings.exclude_types.clone(),
            exclude_scopes: settings.exclude_scopes.clone(),
        }
    }

    fn restricted(&self) -> bool {
        !self.restrict_to_types.is_empty()
    }

    /// Check if a commit type passes the active type filter
    pub fn admits_type(&self, commit_type: &str) -> bool {
        if self.restricted() {
            self.restrict_to_types.iter().any(|t| t == commit_type)
        } else {
            !self.exclude_types.iter().any(|t| t == commit_type)
        }
    }

    /// Check if a scope passes the scope filter
    pub fn admits_scope(&self, scope: Option<&str>) -> bool {
        match scope {
            Some(scope) => !self.exclude_scopes.iter().any(|s| s == scope),
            None => true,
        }
    }

    /// Whether a category keeps its section
    ///
    /// Restricted: at least one of its types is listed. Otherwise: not every
    /// one of its types is excluded.
    pub fn keeps_category(&self, category: &ChangeCategory) -> bool {
        category.types.iter().any(|t| self.admits_type(t))
    }

    /// Categories that survive the filter, in priority order
    pub fn surviving_categories(&self) -> Vec<&'static ChangeCategory> {
        CATEGORIES.iter().filter(|c| self.keeps_category(c)).collect()
    }
}

/// Group commits under the surviving categories
///
/// Commits keep the order they are given in. Categories without any commit
/// are left out.
pub fn classify<'c>(
    commits: &'c [ParsedCommit],
    filter: &CategoryFilter,
) -> Vec<(&'static ChangeCategory, Vec<&'c ParsedCommit>)> {
    filter
        .surviving_categories()
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&ParsedCommit> = commits
                .iter()
                .filter(|c| category_for(&c.commit_type) == Some(category))
                .filter(|c| filter.admits_type(&c.commit_type))
                .filter(|c| filter.admits_scope(c.scope.as_deref()))
                .collect();

            (!members.is_empty()).then_some((category, members))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(commit_type: &str, scope: Option<&str>, subject: &str) -> ParsedCommit {
        ParsedCommit {
            commit_type: commit_type.to_string(),
            scope: scope.map(str::to_string),
            subject: subject.to_string(),
            body: None,
            notes: vec![],
            source: 0,
            from_body: false,
        }
    }

    fn labels(groups: &[(&'static ChangeCategory, Vec<&ParsedCommit>)]) -> Vec<&'static str> {
        groups.iter().map(|(c, _)| c.label).collect()
    }

    #[test]
    fn test_types_belong_to_one_category() {
        for (i, category) in CATEGORIES.iter().enumerate() {
            for t in category.types {
                let owners = CATEGORIES.iter().filter(|c| c.matches(t)).count();
                assert_eq!(owners, 1, "{t} listed in more than one category");
                assert_eq!(category_for(t), Some(&CATEGORIES[i]));
            }
        }
    }

    #[test]
    fn test_labels_by_language() {
        let fix = category_for("fix").unwrap();
        assert_eq!(fix.label_in(Language::En), "Bug Fixes");
        assert_eq!(fix.label_in(Language::Zh), "`Bug` 修复");
        assert_eq!(category_for("chore").unwrap().label_in(Language::Zh), "变动");
    }

    #[test]
    fn test_bug_fixes_prefix() {
        assert_eq!(category_for("fix").unwrap().related_issue_prefix, "fixes");
        assert_eq!(category_for("feat").unwrap().related_issue_prefix, "addresses");
    }

    #[test]
    fn test_priority_order_not_commit_order() {
        let commits = vec![
            commit("fix", None, "b"),
            commit("chore", None, "c"),
            commit("feat", None, "a"),
        ];
        let groups = classify(&commits, &CategoryFilter::default());
        assert_eq!(labels(&groups), vec!["New Features", "Bug Fixes", "Chores"]);
    }

    #[test]
    fn test_each_commit_in_at_most_one_section() {
        let commits = vec![
            commit("feat", None, "a"),
            commit("feature", None, "b"),
            commit("ci", None, "c"),
            commit("build", None, "d"),
            commit("wip", None, "e"),
            commit("other", None, "f"),
        ];
        let groups = classify(&commits, &CategoryFilter::default());

        for c in &commits {
            let count = groups
                .iter()
                .filter(|(_, members)| members.iter().any(|m| std::ptr::eq(*m, c)))
                .count();
            assert!(count <= 1);
        }
        // unknown types are never rendered
        assert!(groups
            .iter()
            .all(|(_, m)| m.iter().all(|c| c.commit_type != "wip")));
    }

    #[test]
    fn test_exclude_types_drops_fully_excluded_categories() {
        let filter = CategoryFilter {
            exclude_types: vec!["build".into(), "ci".into(), "chore".into()],
            ..Default::default()
        };
        let surviving: Vec<&str> = filter.surviving_categories().iter().map(|c| c.label).collect();

        assert!(!surviving.contains(&"Build System"));
        assert!(!surviving.contains(&"Chores"));
        assert!(surviving.contains(&"New Features"));
    }

    #[test]
    fn test_partially_excluded_category_filters_commits() {
        let filter = CategoryFilter {
            exclude_types: vec!["ci".into()],
            ..Default::default()
        };
        let commits = vec![commit("ci", None, "pipeline"), commit("build", None, "cargo")];
        let groups = classify(&commits, &filter);

        assert_eq!(labels(&groups), vec!["Build System"]);
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[0].1[0].subject, "cargo");
    }

    #[test]
    fn test_restrict_wins_over_exclude() {
        let filter = CategoryFilter {
            restrict_to_types: vec!["fix".into()],
            exclude_types: vec!["fix".into()],
            ..Default::default()
        };
        let commits = vec![commit("feat", None, "a"), commit("fix", None, "b")];
        let groups = classify(&commits, &filter);

        assert_eq!(labels(&groups), vec!["Bug Fixes"]);
    }

    #[test]
    fn test_exclude_scopes() {
        let filter = CategoryFilter {
            exclude_scopes: vec!["deps".into()],
            ..Default::default()
        };
        let commits = vec![
            commit("chore", Some("deps"), "bump x"),
            commit("fix", Some("deps"), "pin y"),
            commit("fix", Some("api"), "z"),
        ];
        let groups = classify(&commits, &filter);

        assert_eq!(labels(&groups), vec!["Bug Fixes"]);
        assert_eq!(groups[0].1[0].subject, "z");
    }

    #[test]
    fn test_empty_categories_omitted() {
        let groups = classify(&[], &CategoryFilter::default());
        assert!(groups.is_empty());
    }
}
