use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One product as seen by the public catalog: scalar fields plus the
/// pre-resolved category name, primary image and effective stock.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub primary_image_url: Option<String>,
    /// Sum of variant stock, or the product's own stock when it has no variants
    pub stock_quantity: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Category criterion: a concrete category or the "all" sentinel that
/// disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Uuid),
}

/// Available orderings for the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogSort {
    /// Relies on the snapshot already being creation-time descending
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

/// User-supplied filter and sort criteria for one catalog request.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub search: Option<String>,
    pub sort: CatalogSort,
}

/// Computes the derived catalog view: category filter, then text filter,
/// then sort. The filters are independent of each other; the sort runs last
/// so discarded entries are never compared.
pub fn apply(entries: Vec<CatalogEntry>, query: &CatalogQuery) -> Vec<CatalogEntry> {
    let filtered = filter_text(
        filter_category(entries, query.category),
        query.search.as_deref(),
    );
    sort_entries(filtered, query.sort)
}

/// Retains entries matching the category criterion; `All` keeps everything.
pub fn filter_category(entries: Vec<CatalogEntry>, filter: CategoryFilter) -> Vec<CatalogEntry> {
    match filter {
        CategoryFilter::All => entries,
        CategoryFilter::Only(id) => entries
            .into_iter()
            .filter(|e| e.category_id == Some(id))
            .collect(),
    }
}

/// Retains entries whose name or description contains the search text,
/// case-insensitively. Blank text disables the filter.
pub fn filter_text(entries: Vec<CatalogEntry>, search: Option<&str>) -> Vec<CatalogEntry> {
    let needle = match search.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return entries,
    };

    entries
        .into_iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&needle)
                || e.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Orders entries for presentation. `Newest` is a no-op since the snapshot
/// arrives creation-time descending; the other modes use a stable sort.
pub fn sort_entries(mut entries: Vec<CatalogEntry>, sort: CatalogSort) -> Vec<CatalogEntry> {
    match sort {
        CatalogSort::Newest => {}
        CatalogSort::PriceAsc => entries.sort_by(|a, b| a.price.cmp(&b.price)),
        CatalogSort::PriceDesc => entries.sort_by(|a, b| b.price.cmp(&a.price)),
        CatalogSort::Name => {
            entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(name: &str, price: Decimal, category: Option<Uuid>) -> CatalogEntry {
        CatalogEntry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: crate::models::slug::slugify(name),
            description: None,
            price,
            compare_at_price: None,
            category_id: category,
            category_name: None,
            primary_image_url: None,
            stock_quantity: 1,
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    fn fixture(dresses: Uuid, shoes: Uuid) -> Vec<CatalogEntry> {
        vec![
            entry("Vestido Midi", dec!(199.90), Some(dresses)),
            entry("Vestido Curto", dec!(149.90), Some(dresses)),
            entry("Sapato Social", dec!(299.00), Some(shoes)),
            entry("Sandália Rasteira", dec!(89.90), Some(shoes)),
            entry("Vestido Longo", dec!(349.00), Some(dresses)),
        ]
    }

    #[test]
    fn category_all_keeps_everything() {
        let entries = fixture(Uuid::new_v4(), Uuid::new_v4());
        let out = filter_category(entries.clone(), CategoryFilter::All);
        assert_eq!(out, entries);
    }

    #[test]
    fn filters_commute_and_only_shrink() {
        let dresses = Uuid::new_v4();
        let shoes = Uuid::new_v4();
        let entries = fixture(dresses, shoes);

        let by_category_first = filter_text(
            filter_category(entries.clone(), CategoryFilter::Only(dresses)),
            Some("vestido"),
        );
        let by_text_first = filter_category(
            filter_text(entries.clone(), Some("vestido")),
            CategoryFilter::Only(dresses),
        );
        assert_eq!(by_category_first, by_text_first);

        let category_only = filter_category(entries.clone(), CategoryFilter::Only(dresses));
        let text_only = filter_text(entries, Some("vestido"));
        assert!(by_category_first.len() <= category_only.len());
        assert!(by_category_first.len() <= text_only.len());
    }

    #[test]
    fn text_filter_is_case_insensitive_and_checks_description() {
        let mut entries = fixture(Uuid::new_v4(), Uuid::new_v4());
        entries[2].description = Some("Combina com vestido de festa".to_string());

        let out = filter_text(entries, Some("VESTIDO"));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn blank_search_disables_the_filter() {
        let entries = fixture(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(filter_text(entries.clone(), Some("   ")).len(), entries.len());
        assert_eq!(filter_text(entries.clone(), None).len(), entries.len());
    }

    #[test]
    fn newest_preserves_snapshot_order() {
        let entries = fixture(Uuid::new_v4(), Uuid::new_v4());
        let out = sort_entries(entries.clone(), CatalogSort::Newest);
        assert_eq!(out, entries);
    }

    #[test]
    fn price_sorts_are_mirror_images_for_distinct_prices() {
        let entries = fixture(Uuid::new_v4(), Uuid::new_v4());
        let asc = sort_entries(entries.clone(), CatalogSort::PriceAsc);
        let mut desc = sort_entries(entries, CatalogSort::PriceDesc);
        desc.reverse();
        assert_eq!(asc, desc);

        let prices: Vec<_> = asc.iter().map(|e| e.price).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }

    #[test]
    fn name_sort_is_idempotent() {
        let entries = fixture(Uuid::new_v4(), Uuid::new_v4());
        let once = sort_entries(entries, CatalogSort::Name);
        let twice = sort_entries(once.clone(), CatalogSort::Name);
        assert_eq!(once, twice);
    }

    #[test]
    fn composed_query_filters_then_sorts() {
        let dresses = Uuid::new_v4();
        let shoes = Uuid::new_v4();
        let query = CatalogQuery {
            category: CategoryFilter::Only(dresses),
            search: Some("vestido".to_string()),
            sort: CatalogSort::PriceAsc,
        };

        let out = apply(fixture(dresses, shoes), &query);
        let names: Vec<_> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Vestido Curto", "Vestido Midi", "Vestido Longo"]);
    }
}
