//! Property-based tests for the catalog's pure logic: slug derivation, the
//! catalog query pipeline and the immutable image list.

use boutique_api::models::catalog_query::{
    self, CatalogEntry, CatalogSort, CategoryFilter,
};
use boutique_api::models::image_list::{ImageDraft, ImageList};
use boutique_api::models::slug::slugify;
use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn category_id(index: usize) -> Uuid {
    Uuid::from_u128(index as u128 + 1)
}

fn entry(name: String, description: Option<String>, price_cents: i64, category: usize) -> CatalogEntry {
    CatalogEntry {
        id: Uuid::new_v4(),
        name,
        slug: String::new(),
        description,
        price: Decimal::new(price_cents, 2),
        compare_at_price: None,
        category_id: Some(category_id(category)),
        category_name: None,
        primary_image_url: None,
        stock_quantity: 1,
        is_featured: false,
        created_at: Utc::now(),
    }
}

fn entries_strategy() -> impl Strategy<Value = Vec<CatalogEntry>> {
    prop::collection::vec(
        (
            "[a-zA-ZçãéíÓ ]{0,12}",
            prop::option::of("[a-z ]{0,16}"),
            0i64..100_000,
            0usize..3,
        ),
        0..20,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(name, description, cents, category)| entry(name, description, cents, category))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn slugify_is_idempotent(input in any::<String>()) {
        let once = slugify(&input);
        prop_assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_output_is_url_safe(input in any::<String>()) {
        let slug = slugify(&input);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn category_and_text_filters_commute(
        entries in entries_strategy(),
        category in 0usize..3,
        needle in "[a-zA-Z ]{0,6}",
    ) {
        let filter = CategoryFilter::Only(category_id(category));

        let category_first = catalog_query::filter_text(
            catalog_query::filter_category(entries.clone(), filter),
            Some(&needle),
        );
        let text_first = catalog_query::filter_category(
            catalog_query::filter_text(entries.clone(), Some(&needle)),
            filter,
        );
        prop_assert_eq!(&category_first, &text_first);

        // Composition never grows the set beyond either single filter.
        let by_category = catalog_query::filter_category(entries.clone(), filter);
        let by_text = catalog_query::filter_text(entries, Some(&needle));
        prop_assert!(category_first.len() <= by_category.len());
        prop_assert!(category_first.len() <= by_text.len());
    }

    #[test]
    fn price_sorts_mirror_each_other(entries in entries_strategy()) {
        let asc = catalog_query::sort_entries(entries.clone(), CatalogSort::PriceAsc);
        prop_assert!(asc.windows(2).all(|w| w[0].price <= w[1].price));

        let desc = catalog_query::sort_entries(entries, CatalogSort::PriceDesc);
        prop_assert!(desc.windows(2).all(|w| w[0].price >= w[1].price));

        // With distinct prices the two orders are exact mirrors.
        let distinct: Vec<CatalogEntry> = asc
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut e = e.clone();
                e.price = Decimal::new(i as i64, 2);
                e
            })
            .collect();
        let asc2 = catalog_query::sort_entries(distinct.clone(), CatalogSort::PriceAsc);
        let mut desc2 = catalog_query::sort_entries(distinct, CatalogSort::PriceDesc);
        desc2.reverse();
        prop_assert_eq!(asc2, desc2);
    }

    #[test]
    fn name_sort_is_idempotent(entries in entries_strategy()) {
        let once = catalog_query::sort_entries(entries, CatalogSort::Name);
        let twice = catalog_query::sort_entries(once.clone(), CatalogSort::Name);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn newest_sort_never_reorders(entries in entries_strategy()) {
        let out = catalog_query::sort_entries(entries.clone(), CatalogSort::Newest);
        prop_assert_eq!(out, entries);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn image_swap_round_trip_restores_order(
        urls in prop::collection::vec("[a-z]{1,8}\\.jpg", 1..8),
        a_seed in 0usize..8,
        b_seed in 0usize..8,
    ) {
        let drafts: Vec<ImageDraft> = urls
            .into_iter()
            .map(|url| ImageDraft { url, storage_path: None, alt_text: None })
            .collect();
        let list = ImageList::from_drafts(drafts, 16).unwrap();

        let a = a_seed % list.len();
        let b = b_seed % list.len();

        let round_tripped = list
            .with_swapped(a, b)
            .unwrap()
            .with_swapped(b, a)
            .unwrap();
        prop_assert_eq!(round_tripped, list);
    }

    #[test]
    fn image_removal_only_shifts_later_entries(
        urls in prop::collection::vec("[a-z]{1,8}\\.jpg", 1..8),
        index_seed in 0usize..8,
    ) {
        let drafts: Vec<ImageDraft> = urls
            .iter()
            .map(|url| ImageDraft { url: url.clone(), storage_path: None, alt_text: None })
            .collect();
        let list = ImageList::from_drafts(drafts, 16).unwrap();
        let index = index_seed % list.len();

        let removed = list.with_removed(index).unwrap();
        prop_assert_eq!(removed.len(), list.len() - 1);

        let expected: Vec<&str> = urls
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, u)| u.as_str())
            .collect();
        let actual: Vec<&str> = removed.iter().map(|d| d.url.as_str()).collect();
        prop_assert_eq!(actual, expected);
    }
}
