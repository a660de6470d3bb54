/// Category given to records the user did not categorise.
pub const DEFAULT_CATEGORY: &str = "No Category";

/// The categories offered when tagging, in display order.
pub const CATEGORIES: [&str; 11] = [
    DEFAULT_CATEGORY,
    "Apple Store",
    "Bar",
    "Bookstore",
    "Club",
    "Grocery Store",
    "Historic Building",
    "House",
    "Icecream Vendor",
    "Landmark",
    "Park",
];

/// Returns `true` if `name` is one of [`CATEGORIES`].
#[must_use]
pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category_listed_first() {
        assert_eq!(CATEGORIES[0], DEFAULT_CATEGORY);
        assert!(is_known_category("Park"));
        assert!(!is_known_category("park"));
    }
}
