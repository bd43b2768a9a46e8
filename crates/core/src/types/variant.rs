//! Variant selectors for products sold in multiple configurations.
//!
//! A product with variants (e.g. sizes) is identified in the cart by the
//! pair (modification type, value). The backend treats a missing type and a
//! missing/empty value as "no variant", and so must every local lookup:
//! at most one cart line may exist per (product, normalized selector) pair.

use serde::{Deserialize, Serialize};

use super::id::ModificationTypeId;

/// The (modification-type, value) pair identifying a purchasable
/// configuration of a product.
///
/// Construction normalizes empty strings to `None`, so two selectors built
/// from `None` and `Some("")` compare equal and produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VariantSelector {
    modification_type_id: Option<ModificationTypeId>,
    value: Option<String>,
}

impl VariantSelector {
    /// Build a normalized selector.
    #[must_use]
    pub fn new(modification_type_id: Option<ModificationTypeId>, value: Option<String>) -> Self {
        Self {
            modification_type_id,
            value: value.filter(|v| !v.is_empty()),
        }
    }

    /// The "no variant" selector.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            modification_type_id: None,
            value: None,
        }
    }

    /// Whether this selector names no variant at all.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.modification_type_id.is_none() && self.value.is_none()
    }

    /// The modification type, if any.
    #[must_use]
    pub const fn modification_type_id(&self) -> Option<ModificationTypeId> {
        self.modification_type_id
    }

    /// The selected value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Uniqueness key matching the backend's cart line key: empty for "no
    /// variant", otherwise `"{type}:{value}"` with absent parts left blank.
    #[must_use]
    pub fn key(&self) -> String {
        if self.is_none() {
            return String::new();
        }
        let type_part = self
            .modification_type_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        format!("{type_part}:{}", self.value.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_normalizes_to_none() {
        let a = VariantSelector::new(None, None);
        let b = VariantSelector::new(None, Some(String::new()));
        assert_eq!(a, b);
        assert!(b.is_none());
        assert_eq!(a.key(), "");
    }

    #[test]
    fn test_key_matches_backend_format() {
        let selector = VariantSelector::new(Some(ModificationTypeId::new(2)), Some("M".into()));
        assert_eq!(selector.key(), "2:M");
    }

    #[test]
    fn test_partial_selector_keys_are_distinct() {
        let type_only = VariantSelector::new(Some(ModificationTypeId::new(2)), None);
        let value_only = VariantSelector::new(None, Some("M".into()));
        assert_eq!(type_only.key(), "2:");
        assert_eq!(value_only.key(), ":M");
        assert_ne!(type_only, value_only);
        assert_ne!(type_only, VariantSelector::none());
    }

    #[test]
    fn test_same_selector_same_key() {
        let a = VariantSelector::new(Some(ModificationTypeId::new(1)), Some("XL".into()));
        let b = VariantSelector::new(Some(ModificationTypeId::new(1)), Some("XL".into()));
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }
}
