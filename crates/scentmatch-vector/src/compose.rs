//! Canonical text composition.
//!
//! Both the build path and the query path embed text produced here, so the
//! templates must stay stable across an index's lifetime: changing either
//! one invalidates every stored vector.
//!
//! Notes are joined in the order the catalog enumerates them. No sorting is
//! applied, so builds are only reproducible when that order is fixed.

use scentmatch_core::Item;

/// Compose the embedding text for an item profile.
///
/// `"<name> features notes of <note>, <note>, ..."` followed by a period.
pub fn compose_item_text(name: &str, notes: &[String]) -> String {
    format!("{} features notes of {}.", name, notes.join(", "))
}

/// Compose the embedding text for an [`Item`].
pub fn compose_item(item: &Item) -> String {
    compose_item_text(&item.name, &item.notes)
}

/// Wrap free-form preferences in the query template.
pub fn compose_query_text(preferences: &str) -> String {
    format!("Looking for a fragrance with these qualities: {preferences}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_item_text() {
        let notes = vec!["bergamot".to_string(), "amber".to_string()];
        assert_eq!(
            compose_item_text("Noir", &notes),
            "Noir features notes of bergamot, amber."
        );
    }

    #[test]
    fn test_compose_preserves_note_order() {
        let a = vec!["rose".to_string(), "oud".to_string()];
        let b = vec!["oud".to_string(), "rose".to_string()];
        assert_ne!(compose_item_text("X", &a), compose_item_text("X", &b));
    }

    #[test]
    fn test_compose_without_notes() {
        assert_eq!(compose_item_text("Plain", &[]), "Plain features notes of .");
    }

    #[test]
    fn test_compose_item() {
        let item = scentmatch_core::Item::new(1, "Vetiver", "House").with_notes(["vetiver"]);
        assert_eq!(compose_item(&item), "Vetiver features notes of vetiver.");
    }

    #[test]
    fn test_compose_query_text() {
        assert_eq!(
            compose_query_text("fresh citrus"),
            "Looking for a fragrance with these qualities: fresh citrus"
        );
    }
}
