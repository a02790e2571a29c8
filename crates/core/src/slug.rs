//! Route slugs and collision suffixes.

/// Route slug for a schema: lowercase, spaces become hyphens.
pub fn schema_route(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Route slug for a public form: lowercase, spaces and underscores become hyphens.
pub fn form_route(name: &str) -> String {
    name.to_lowercase().replace([' ', '_'], "-")
}

/// Candidate names for collision avoidance: `base`, then `base{sep}1`,
/// `base{sep}2`, and so on. The iterator never ends; callers stop at the
/// first candidate that is free.
pub fn candidates<'a>(base: &'a str, sep: &'a str) -> impl Iterator<Item = String> + 'a {
    std::iter::once(base.to_string()).chain((1u64..).map(move |n| format!("{}{}{}", base, sep, n)))
}

/// Separator used when suffixing schema names (`"X 1"`).
pub const NAME_SEPARATOR: &str = " ";
/// Separator used when suffixing routes (`"x-1"`).
pub const ROUTE_SEPARATOR: &str = "-";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn schema_route_keeps_underscores() {
        assert_eq!(schema_route("Customer Feedback"), "customer-feedback");
        assert_eq!(schema_route("Site_Visit Log"), "site_visit-log");
    }

    #[test]
    fn form_route_replaces_underscores() {
        assert_eq!(form_route("Site_Visit Log"), "site-visit-log");
    }

    #[test]
    fn first_candidate_is_the_base() {
        let first: Vec<String> = candidates("X", NAME_SEPARATOR).take(3).collect();
        assert_eq!(first, vec!["X", "X 1", "X 2"]);
    }

    #[test]
    fn n_taken_names_resolve_to_suffix_n() {
        for n in 0..6u64 {
            let taken: HashSet<String> = candidates("X", NAME_SEPARATOR).take(n as usize).collect();
            let free = candidates("X", NAME_SEPARATOR)
                .find(|c| !taken.contains(c))
                .unwrap();
            let expected = if n == 0 { "X".to_string() } else { format!("X {}", n) };
            assert_eq!(free, expected);
        }
    }
}
