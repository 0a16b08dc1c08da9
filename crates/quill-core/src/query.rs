//! Post query composer.
//!
//! Filters are plain values ([`Predicate`]) built from optional user input
//! and combined with [`Predicate::and`] / [`Predicate::or`]. Stores either
//! interpret them directly ([`Predicate::matches`]) or translate them into
//! their native query language.

/// Post fields a predicate can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Title,
    Content,
    /// Name of the post's category, absent for uncategorised posts.
    CategoryName,
}

/// Access to the filterable fields of a post record.
pub trait PostFields {
    fn field(&self, field: PostField) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record.
    Always,
    /// Case-insensitive substring test. `needle` is stored lowercased.
    Contains { field: PostField, needle: String },
    /// Exact, case-sensitive equality.
    Equals { field: PostField, value: String },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn contains(field: PostField, needle: &str) -> Self {
        Self::Contains {
            field,
            needle: needle.to_lowercase(),
        }
    }

    pub fn equals(field: PostField, value: &str) -> Self {
        Self::Equals {
            field,
            value: value.to_string(),
        }
    }

    /// Records matching both. `Always` is the identity.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Self::Always, p) | (p, Self::Always) => p,
            (a, b) => Self::And(Box::new(a), Box::new(b)),
        }
    }

    /// Records matching either. `Always` absorbs.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Self::Always, _) | (_, Self::Always) => Self::Always,
            (a, b) => Self::Or(Box::new(a), Box::new(b)),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    pub fn matches<R: PostFields + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::Always => true,
            Self::Contains { field, needle } => record
                .field(*field)
                .is_some_and(|value| value.to_lowercase().contains(needle.as_str())),
            Self::Equals { field, value } => record.field(*field) == Some(value.as_str()),
            Self::And(a, b) => a.matches(record) && b.matches(record),
            Self::Or(a, b) => a.matches(record) || b.matches(record),
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::Always
    }
}

/// Posts whose title contains `keyword`, ignoring case. No keyword, no filter.
pub fn title_contains(keyword: Option<&str>) -> Predicate {
    match keyword {
        None | Some("") => Predicate::Always,
        Some(keyword) => Predicate::contains(PostField::Title, keyword),
    }
}

/// Posts filed under the category named exactly `category_name`. No name, no filter.
pub fn has_category(category_name: Option<&str>) -> Predicate {
    match category_name {
        None | Some("") => Predicate::Always,
        Some(name) => Predicate::equals(PostField::CategoryName, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        title: &'static str,
        content: &'static str,
        category: Option<&'static str>,
    }

    impl PostFields for Row {
        fn field(&self, field: PostField) -> Option<&str> {
            match field {
                PostField::Title => Some(self.title),
                PostField::Content => Some(self.content),
                PostField::CategoryName => self.category,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                title: "Learn Java Loops",
                content: "Content",
                category: Some("Java"),
            },
            Row {
                title: "Advanced Java Streams",
                content: "Content",
                category: Some("Java"),
            },
            Row {
                title: "Python Basics",
                content: "Content",
                category: Some("Python"),
            },
            Row {
                title: "Untitled Thoughts",
                content: "java everywhere",
                category: None,
            },
        ]
    }

    fn titles(predicate: &Predicate) -> Vec<&'static str> {
        rows()
            .into_iter()
            .filter(|r| predicate.matches(r))
            .map(|r| r.title)
            .collect()
    }

    #[test]
    fn test_title_contains_matches_by_title_only() {
        assert_eq!(
            titles(&title_contains(Some("Java"))),
            vec!["Learn Java Loops", "Advanced Java Streams"]
        );
    }

    #[test]
    fn test_title_contains_ignores_case() {
        assert_eq!(titles(&title_contains(Some("jAVA"))).len(), 2);
        assert_eq!(titles(&title_contains(Some("python basics"))), vec!["Python Basics"]);
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert_eq!(title_contains(None), Predicate::Always);
        assert_eq!(title_contains(Some("")), Predicate::Always);
        assert_eq!(has_category(None), Predicate::Always);
        assert_eq!(has_category(Some("")), Predicate::Always);
        assert_eq!(titles(&has_category(None)).len(), rows().len());
    }

    #[test]
    fn test_has_category_is_exact_and_case_sensitive() {
        assert_eq!(titles(&has_category(Some("Python"))), vec!["Python Basics"]);
        assert!(titles(&has_category(Some("python"))).is_empty());
        assert!(titles(&has_category(Some("Jav"))).is_empty());
    }

    #[test]
    fn test_combined_filters() {
        let predicate = title_contains(Some("Loops")).and(has_category(Some("Java")));
        assert_eq!(titles(&predicate), vec!["Learn Java Loops"]);
    }

    #[test]
    fn test_and_is_commutative_and_associative() {
        let a = || title_contains(Some("a"));
        let b = || has_category(Some("Java"));
        let c = || title_contains(Some("Streams"));

        assert_eq!(titles(&a().and(b())), titles(&b().and(a())));
        assert_eq!(
            titles(&a().and(b()).and(c())),
            titles(&a().and(b().and(c())))
        );
        assert_eq!(titles(&a().and(b()).and(c())), vec!["Advanced Java Streams"]);
    }

    #[test]
    fn test_always_is_identity_for_and() {
        let p = has_category(Some("Java"));
        assert_eq!(p.clone().and(Predicate::Always), p);
        assert_eq!(Predicate::Always.and(p.clone()), p);
    }

    #[test]
    fn test_or_combines_and_always_absorbs() {
        let p = has_category(Some("Python")).or(title_contains(Some("Loops")));
        assert_eq!(titles(&p), vec!["Learn Java Loops", "Python Basics"]);
        assert!(has_category(Some("Java")).or(Predicate::Always).is_always());
    }

    #[test]
    fn test_whitespace_filters_are_not_treated_as_empty() {
        // " " is a real substring filter: only titles containing a space match.
        let predicate = title_contains(Some(" "));
        assert!(!predicate.is_always());
        assert_eq!(titles(&predicate).len(), 4);

        let predicate = has_category(Some(" "));
        assert!(!predicate.is_always());
        assert!(titles(&predicate).is_empty());
    }

    #[test]
    fn test_uncategorised_post_only_matches_through_other_fields() {
        assert!(!titles(&has_category(Some("Java"))).contains(&"Untitled Thoughts"));

        let predicate = has_category(Some("Java")).or(Predicate::contains(PostField::Content, "java"));
        assert_eq!(
            titles(&predicate),
            vec!["Learn Java Loops", "Advanced Java Streams", "Untitled Thoughts"]
        );
    }
}
