use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// A pending stock-keeping variant as edited in the admin form. Position
/// carries no meaning, unlike images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VariantDraft {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub price_adjustment: Option<Decimal>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Default for VariantDraft {
    fn default() -> Self {
        Self {
            size: None,
            color: None,
            sku: None,
            stock_quantity: 0,
            price_adjustment: None,
            is_available: true,
        }
    }
}

/// A single-field edit against one draft, carrying the raw form text for
/// numeric fields. Invalid numeric input is rejected rather than coerced,
/// the same policy the save path applies to prices.
#[derive(Debug, Clone)]
pub enum VariantField {
    Size(String),
    Color(String),
    Sku(String),
    StockQuantity(String),
    PriceAdjustment(String),
}

/// Immutable collection of variant drafts; every edit returns a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantList {
    drafts: Vec<VariantDraft>,
}

impl VariantList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from complete drafts, rejecting any negative stock
    /// quantity before it can reach the save procedure.
    pub fn from_drafts(drafts: Vec<VariantDraft>) -> Result<Self, ServiceError> {
        for draft in &drafts {
            if draft.stock_quantity < 0 {
                return Err(ServiceError::ValidationError(
                    "Variant stock quantity cannot be negative".to_string(),
                ));
            }
        }
        Ok(Self { drafts })
    }

    /// Returns a new list with a fresh empty draft appended.
    pub fn with_added(&self) -> Self {
        let mut drafts = self.drafts.clone();
        drafts.push(VariantDraft::default());
        Self { drafts }
    }

    /// Returns a new list without the draft at `index`.
    pub fn with_removed(&self, index: usize) -> Result<Self, ServiceError> {
        self.check_index(index)?;
        let mut drafts = self.drafts.clone();
        drafts.remove(index);
        Ok(Self { drafts })
    }

    /// Returns a new list with one field of one draft replaced.
    pub fn with_field(&self, index: usize, field: VariantField) -> Result<Self, ServiceError> {
        self.check_index(index)?;
        let mut drafts = self.drafts.clone();
        let draft = &mut drafts[index];

        match field {
            VariantField::Size(value) => draft.size = normalize_label(value),
            VariantField::Color(value) => draft.color = normalize_label(value),
            VariantField::Sku(value) => draft.sku = normalize_label(value),
            VariantField::StockQuantity(raw) => draft.stock_quantity = parse_stock(&raw)?,
            VariantField::PriceAdjustment(raw) => draft.price_adjustment = parse_adjustment(&raw)?,
        }

        Ok(Self { drafts })
    }

    /// Aggregate stock across all drafts.
    pub fn total_stock(&self) -> i64 {
        self.drafts.iter().map(|d| i64::from(d.stock_quantity)).sum()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantDraft> {
        self.drafts.iter()
    }

    fn check_index(&self, index: usize) -> Result<(), ServiceError> {
        if index >= self.drafts.len() {
            return Err(ServiceError::InvalidInput(format!(
                "Variant index {} out of bounds (list has {} entries)",
                index,
                self.drafts.len()
            )));
        }
        Ok(())
    }
}

fn normalize_label(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_stock(raw: &str) -> Result<i32, ServiceError> {
    let quantity: i32 = raw.trim().parse().map_err(|_| {
        ServiceError::ValidationError(format!("Invalid stock quantity: {:?}", raw))
    })?;
    if quantity < 0 {
        return Err(ServiceError::ValidationError(
            "Stock quantity cannot be negative".to_string(),
        ));
    }
    Ok(quantity)
}

fn parse_adjustment(raw: &str) -> Result<Option<Decimal>, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .map(Some)
        .map_err(|_| ServiceError::ValidationError(format!("Invalid price adjustment: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn added_draft_starts_empty_and_available() {
        let list = VariantList::new().with_added();
        let draft = list.iter().next().unwrap();
        assert_eq!(draft.stock_quantity, 0);
        assert!(draft.price_adjustment.is_none());
        assert!(draft.size.is_none());
        assert!(draft.is_available);
    }

    #[test]
    fn field_updates_parse_numeric_text() {
        let list = VariantList::new()
            .with_added()
            .with_field(0, VariantField::Size("P".into()))
            .unwrap()
            .with_field(0, VariantField::StockQuantity("7".into()))
            .unwrap()
            .with_field(0, VariantField::PriceAdjustment("12.50".into()))
            .unwrap();

        let draft = list.iter().next().unwrap();
        assert_eq!(draft.size.as_deref(), Some("P"));
        assert_eq!(draft.stock_quantity, 7);
        assert_eq!(draft.price_adjustment, Some(dec!(12.50)));
    }

    #[test]
    fn invalid_numeric_input_is_rejected_not_coerced() {
        let list = VariantList::new().with_added();

        let stock = list.with_field(0, VariantField::StockQuantity("abc".into()));
        assert!(matches!(stock, Err(ServiceError::ValidationError(_))));

        let adjustment = list.with_field(0, VariantField::PriceAdjustment("1,2,3".into()));
        assert!(matches!(adjustment, Err(ServiceError::ValidationError(_))));

        // The failed edit did not leak into the draft.
        assert_eq!(list.iter().next().unwrap().stock_quantity, 0);
    }

    #[test]
    fn negative_stock_is_rejected() {
        let list = VariantList::new().with_added();
        assert!(list
            .with_field(0, VariantField::StockQuantity("-3".into()))
            .is_err());

        let draft = VariantDraft {
            stock_quantity: -1,
            ..Default::default()
        };
        assert!(VariantList::from_drafts(vec![draft]).is_err());
    }

    #[test]
    fn blank_labels_normalize_to_none() {
        let list = VariantList::new()
            .with_added()
            .with_field(0, VariantField::Color("   ".into()))
            .unwrap();
        assert!(list.iter().next().unwrap().color.is_none());
    }

    #[test]
    fn remove_has_no_reordering_semantics_beyond_shift() {
        let list = VariantList::new().with_added().with_added().with_added();
        let list = list
            .with_field(1, VariantField::Sku("MID".into()))
            .unwrap()
            .with_removed(0)
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().next().unwrap().sku.as_deref(), Some("MID"));
    }

    #[test]
    fn total_stock_sums_all_drafts() {
        let list = VariantList::from_drafts(vec![
            VariantDraft {
                size: Some("P".into()),
                stock_quantity: 3,
                ..Default::default()
            },
            VariantDraft {
                size: Some("M".into()),
                stock_quantity: 5,
                ..Default::default()
            },
        ])
        .unwrap();
        assert_eq!(list.total_stock(), 8);
    }
}
