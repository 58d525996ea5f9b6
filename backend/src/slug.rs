//! URL-safe identifiers derived from display names.

/// Derive a member slug from a display name.
///
/// Trims, lowercases, collapses whitespace runs into single dashes, then drops
/// every character outside `[a-z0-9-]`. The result is not unique on its own;
/// uniqueness comes from the `(family_group_id, slug)` key in the store.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for ch in name.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }

    slug
}

/// True when `candidate` could have been produced by [`slugify`]
pub fn is_valid_slug(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names() {
        assert_eq!(slugify("Alice"), "alice");
        assert_eq!(slugify("  Bob  "), "bob");
        assert_eq!(slugify("Mary Jane"), "mary-jane");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(slugify("Tía \t  Carmen"), "ta-carmen");
        assert_eq!(slugify("a\u{a0}b"), "a-b");
    }

    #[test]
    fn test_disallowed_characters_are_stripped() {
        assert_eq!(slugify("José"), "jos");
        assert_eq!(slugify("O'Brien!"), "obrien");
        assert_eq!(slugify("R2-D2"), "r2-d2");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_distinct_names_can_collide() {
        assert_eq!(slugify("Ana"), slugify("ANA"));
        assert_eq!(slugify("ana maria"), slugify("Ana  Maria"));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("mary-jane"));
        assert!(is_valid_slug(&slugify("Tío Pepe 2")));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Mary"));
        assert!(!is_valid_slug("a b"));
    }
}
