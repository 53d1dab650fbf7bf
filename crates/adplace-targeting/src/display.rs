//! Taxonomy / page-type display rules

use adplace_core::{DisplayRule, PageContext, TaxonomyFilter};

use crate::Rejection;

pub fn check(rule: &DisplayRule, page: &PageContext) -> Result<(), Rejection> {
    match rule {
        DisplayRule::All { exclude } => {
            if matches_any(exclude, page) {
                Err(Rejection::Excluded)
            } else {
                Ok(())
            }
        }
        // An empty inclusion filter matches nothing
        DisplayRule::Specific { include } => {
            if matches_any(include, page) {
                Ok(())
            } else {
                Err(Rejection::NotIncluded)
            }
        }
    }
}

/// True if the page matches at least one predicate of the filter
fn matches_any(filter: &TaxonomyFilter, page: &PageContext) -> bool {
    let post_type = page
        .post_type
        .as_ref()
        .is_some_and(|t| filter.post_types.contains(t));
    let post_id = page.post_id.is_some_and(|id| filter.post_ids.contains(&id));

    post_type
        || post_id
        || !filter.categories.is_disjoint(&page.categories)
        || !filter.tags.is_disjoint(&page.tags)
        || !filter.page_types.is_disjoint(&page.page_types)
}
