// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Identification Strategies
//!
//! Implementations of
//! [`ItemIdentificationStrategy`]: the first-id strategy used as the
//! default everywhere, and the composite strategy for renderings like
//! `"https://idp.example.org (registered by example federation)"`.
//!
//! Both fall back to a configurable placeholder when an item carries no
//! usable identifier, so labels are never empty.

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::Item;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::identification::ItemIdentificationStrategy;

const DEFAULT_PLACEHOLDER: &str = "unidentified";

/// Labels an item with its first [`ItemId`](metadata_pipeline_domain::ItemId)
/// value, or a placeholder.
#[derive(Debug)]
pub struct FirstItemIdStrategy {
    base: ComponentBase,
    no_id_placeholder: String,
}

impl FirstItemIdStrategy {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
            no_id_placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Replaces the placeholder used for items with no identifier.
    pub fn set_no_id_placeholder(&mut self, placeholder: &str) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        if placeholder.is_empty() {
            return Err(PipelineError::invalid_config(
                "placeholder must be non-empty",
            ));
        }
        self.no_id_placeholder = placeholder.to_string();
        Ok(())
    }
}

impl Default for FirstItemIdStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FirstItemIdStrategy {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T> ItemIdentificationStrategy<T> for FirstItemIdStrategy {
    fn identify(&self, item: &Item<T>) -> String {
        item.first_item_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.no_id_placeholder.clone())
    }
}

/// Extracts one identification fragment from an item.
pub type IdentificationExtractor<T> = Box<dyn Fn(&Item<T>) -> Option<String> + Send + Sync>;

/// Renders `basic` alone, or `"basic (extra)"` when an extra fragment is
/// present. The basic fragment falls back to the placeholder; the extra one
/// is simply omitted when absent.
pub struct CompositeItemIdentificationStrategy<T> {
    base: ComponentBase,
    basic: IdentificationExtractor<T>,
    extra: Option<IdentificationExtractor<T>>,
    no_id_placeholder: String,
}

impl<T: 'static> CompositeItemIdentificationStrategy<T> {
    /// Creates a composite over the given basic extractor, with no extra.
    pub fn new(basic: IdentificationExtractor<T>) -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
            basic,
            extra: None,
            no_id_placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// The degenerate composite: basic is the item's first id, no extra.
    pub fn first_id() -> Self {
        Self::new(Box::new(|item: &Item<T>| {
            item.first_item_id().map(|id| id.to_string())
        }))
    }

    /// Sets the extra extractor.
    pub fn set_extra(&mut self, extra: IdentificationExtractor<T>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.extra = Some(extra);
        Ok(())
    }

    /// Replaces the placeholder used when the basic fragment is absent.
    pub fn set_no_id_placeholder(&mut self, placeholder: &str) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        if placeholder.is_empty() {
            return Err(PipelineError::invalid_config(
                "placeholder must be non-empty",
            ));
        }
        self.no_id_placeholder = placeholder.to_string();
        Ok(())
    }
}

impl<T> Component for CompositeItemIdentificationStrategy<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T> ItemIdentificationStrategy<T> for CompositeItemIdentificationStrategy<T> {
    fn identify(&self, item: &Item<T>) -> String {
        let basic = (self.basic)(item).unwrap_or_else(|| self.no_id_placeholder.clone());
        match self.extra.as_ref().and_then(|extract| extract(item)) {
            Some(extra) => format!("{basic} ({extra})"),
            None => basic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata_pipeline_domain::ItemId;

    fn identified(ids: &[&str]) -> Item<String> {
        let mut item = Item::new(String::new());
        for id in ids {
            item.add_item_id(ItemId::new(id).unwrap());
        }
        item
    }

    #[test]
    fn test_first_id_strategy_uses_first_id() {
        let mut strategy = FirstItemIdStrategy::new();
        strategy.initialize().unwrap();
        let item = identified(&["urn:primary", "urn:alt"]);
        assert_eq!(
            ItemIdentificationStrategy::<String>::identify(&strategy, &item),
            "urn:primary"
        );
    }

    #[test]
    fn test_first_id_strategy_falls_back_to_placeholder() {
        let mut strategy = FirstItemIdStrategy::new();
        strategy.initialize().unwrap();
        let item = identified(&[]);
        let label = ItemIdentificationStrategy::<String>::identify(&strategy, &item);
        assert_eq!(label, "unidentified");
        assert!(!label.is_empty());
    }

    #[test]
    fn test_first_id_placeholder_is_configurable() {
        let mut strategy = FirstItemIdStrategy::new();
        strategy.set_no_id_placeholder("<anonymous>").unwrap();
        strategy.initialize().unwrap();
        let item = identified(&[]);
        assert_eq!(
            ItemIdentificationStrategy::<String>::identify(&strategy, &item),
            "<anonymous>"
        );
    }

    #[test]
    fn test_composite_renders_basic_alone_without_extra() {
        let mut strategy = CompositeItemIdentificationStrategy::<String>::first_id();
        strategy.initialize().unwrap();
        let item = identified(&["urn:primary", "urn:alt"]);
        assert_eq!(strategy.identify(&item), "urn:primary");
    }

    #[test]
    fn test_composite_renders_basic_and_extra() {
        let mut strategy = CompositeItemIdentificationStrategy::<String>::first_id();
        strategy
            .set_extra(Box::new(|_item| Some("registrar".to_string())))
            .unwrap();
        strategy.initialize().unwrap();
        let item = identified(&["urn:primary"]);
        assert_eq!(strategy.identify(&item), "urn:primary (registrar)");
    }

    #[test]
    fn test_composite_placeholder_when_basic_absent() {
        let mut strategy = CompositeItemIdentificationStrategy::<String>::first_id();
        strategy.initialize().unwrap();
        let item = identified(&[]);
        assert_eq!(strategy.identify(&item), "unidentified");
    }
}
