use catalog_core::error::{Error, Result};
use catalog_core::types::SearchFilters;

/// Builds the engine's `filter_by` expression.
///
/// One clause per present filter, in the order collections, tags,
/// price_min, price_max, joined with `&&`. Returns `None` when nothing is
/// restricted so the request carries no filter at all.
///
/// Values are wrapped in backticks, which the engine takes literally. The
/// engine has no escape for a backtick inside such a value, so those are
/// refused.
pub fn build_filter(filters: &SearchFilters) -> Result<Option<String>> {
    let mut clauses = Vec::with_capacity(4);
    if !filters.collections.is_empty() {
        clauses.push(format!(
            "collections:=[{}]",
            quoted("collections", &filters.collections)?
        ));
    }
    if !filters.tags.is_empty() {
        clauses.push(format!("tags:=[{}]", quoted("tags", &filters.tags)?));
    }
    if let Some(min) = filters.price_min {
        clauses.push(format!("price:>={min}"));
    }
    if let Some(max) = filters.price_max {
        clauses.push(format!("price:<={max}"));
    }
    Ok((!clauses.is_empty()).then(|| clauses.join(" && ")))
}

fn quoted(field: &str, values: &[String]) -> Result<String> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if value.contains('`') {
            return Err(Error::InvalidQuery(format!(
                "{field} value {value:?} must not contain a backtick"
            )));
        }
        out.push(format!("`{value}`"));
    }
    Ok(out.join(","))
}
