//! Product Form Aggregate
//!
//! Seller-side session state for a product with variants: the groups, the
//! product-level defaults and the SKU matrix derived from them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use crate::domain::aggregates::variant_matrix::{self, ProductDefaults, SkuCombination, VariantGroup, VariantOption};
use crate::domain::events::{DomainEvent, VariantEvent};
use crate::domain::value_objects::ImageRef;

#[derive(Clone, Debug)]
pub struct ProductForm {
    groups: Vec<VariantGroup>,
    defaults: ProductDefaults,
    skus: Arc<Vec<SkuCombination>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl ProductForm {
    pub fn new(defaults: ProductDefaults) -> Self {
        let now = Utc::now();
        Self { groups: vec![], defaults, skus: Arc::new(vec![]), created_at: now, updated_at: now, events: vec![] }
    }

    /// Reopens a product loaded for editing. The stored SKUs are merged against
    /// the groups so stale or missing combinations are reconciled up front.
    pub fn restore(groups: Vec<VariantGroup>, defaults: ProductDefaults, skus: Vec<SkuCombination>) -> Self {
        let mut form = Self::new(defaults);
        form.groups = groups;
        form.skus = Arc::new(skus);
        form.recompute();
        form.events.clear();
        form
    }

    pub fn groups(&self) -> &[VariantGroup] { &self.groups }
    pub fn defaults(&self) -> &ProductDefaults { &self.defaults }
    pub fn skus(&self) -> &Arc<Vec<SkuCombination>> { &self.skus }
    pub fn has_variants(&self) -> bool { !self.groups.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn add_group(&mut self, title: &str) -> Result<String, VariantError> {
        let title = require_title(title)?;
        let group = VariantGroup::new(title);
        let id = group.id.clone();
        self.groups.push(group);
        self.raise_event(DomainEvent::Variant(VariantEvent::GroupAdded { group_id: id.clone(), title: title.to_string() }));
        self.recompute();
        Ok(id)
    }

    pub fn rename_group(&mut self, group_id: &str, title: &str) -> Result<(), VariantError> {
        let title = require_title(title)?;
        self.group_mut(group_id)?.title = title.to_string();
        self.recompute();
        Ok(())
    }

    pub fn remove_group(&mut self, group_id: &str) -> Result<(), VariantError> {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != group_id);
        if self.groups.len() == before { return Err(VariantError::GroupNotFound(group_id.to_string())); }
        self.raise_event(DomainEvent::Variant(VariantEvent::GroupRemoved { group_id: group_id.to_string() }));
        self.recompute();
        Ok(())
    }

    pub fn add_option(&mut self, group_id: &str, title: &str) -> Result<String, VariantError> {
        let title = require_title(title)?;
        let option = VariantOption::new(title);
        let id = option.id.clone();
        self.group_mut(group_id)?.options.push(option);
        self.raise_event(DomainEvent::Variant(VariantEvent::OptionAdded { group_id: group_id.to_string(), option_id: id.clone() }));
        self.recompute();
        Ok(id)
    }

    pub fn rename_option(&mut self, group_id: &str, option_id: &str, title: &str) -> Result<(), VariantError> {
        let title = require_title(title)?;
        self.option_mut(group_id, option_id)?.title = title.to_string();
        self.recompute();
        Ok(())
    }

    /// Attaches or clears an option's image. Releasing the old preview is up to the caller.
    pub fn set_option_image(&mut self, group_id: &str, option_id: &str, image: Option<ImageRef>, preview: Option<String>) -> Result<(), VariantError> {
        let option = self.option_mut(group_id, option_id)?;
        option.image = image;
        option.image_preview = preview;
        self.touch();
        Ok(())
    }

    pub fn remove_option(&mut self, group_id: &str, option_id: &str) -> Result<(), VariantError> {
        self.option_mut(group_id, option_id)?;
        self.groups = variant_matrix::remove_option(&self.groups, group_id, option_id);
        self.raise_event(DomainEvent::Variant(VariantEvent::OptionRemoved { group_id: group_id.to_string(), option_id: option_id.to_string() }));
        self.recompute();
        Ok(())
    }

    pub fn set_defaults(&mut self, defaults: ProductDefaults) {
        self.defaults = defaults;
        self.recompute();
    }

    /// Applies a seller edit to one SKU. The SKU's id and option choice cannot
    /// be changed through here.
    pub fn update_sku<F>(&mut self, sku_id: &str, edit: F) -> Result<(), VariantError>
    where
        F: FnOnce(&mut SkuCombination),
    {
        let mut next = (*self.skus).clone();
        let sku = next.iter_mut().find(|s| s.id == sku_id).ok_or_else(|| VariantError::SkuNotFound(sku_id.to_string()))?;
        let (id, option_ids, option_map) = (sku.id.clone(), sku.option_ids.clone(), sku.option_map.clone());
        edit(sku);
        sku.id = id;
        sku.option_ids = option_ids;
        sku.option_map = option_map;
        self.skus = Arc::new(next);
        self.raise_event(DomainEvent::Variant(VariantEvent::SkuUpdated { sku_id: sku_id.to_string() }));
        self.touch();
        Ok(())
    }

    /// Every rule the SKU list breaks, in list order.
    pub fn submission_issues(&self) -> Vec<SkuValidationError> {
        let mut issues = vec![];
        let mut codes: HashMap<&str, &str> = HashMap::new();
        for sku in self.skus.iter() {
            if sku.is_active {
                match sku.price {
                    Some(p) if p > rust_decimal::Decimal::ZERO => {}
                    _ => issues.push(SkuValidationError::MissingPrice { sku_id: sku.id.clone() }),
                }
                if sku.quantity.is_none() { issues.push(SkuValidationError::MissingQuantity { sku_id: sku.id.clone() }); }
            }
            if let (Some(compare), Some(price)) = (sku.compare_price, sku.price) {
                if compare < price { issues.push(SkuValidationError::ComparePriceBelowPrice { sku_id: sku.id.clone() }); }
            }
            if let Some(code) = sku.sku_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                if codes.insert(code, &sku.id).is_some() {
                    issues.push(SkuValidationError::DuplicateSkuCode { code: code.to_string() });
                }
            }
        }
        issues
    }

    pub fn validate_for_submission(&self) -> Result<(), SkuValidationError> {
        match self.submission_issues().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn recompute(&mut self) {
        let next = variant_matrix::generate_combinations(&self.groups, &self.defaults, &self.skus);
        if !Arc::ptr_eq(&next, &self.skus) {
            self.skus = next;
            let sku_count = self.skus.len();
            self.raise_event(DomainEvent::Variant(VariantEvent::MatrixRebuilt { sku_count }));
        }
        self.touch();
    }

    fn group_mut(&mut self, group_id: &str) -> Result<&mut VariantGroup, VariantError> {
        self.groups.iter_mut().find(|g| g.id == group_id).ok_or_else(|| VariantError::GroupNotFound(group_id.to_string()))
    }

    fn option_mut(&mut self, group_id: &str, option_id: &str) -> Result<&mut VariantOption, VariantError> {
        self.group_mut(group_id)?
            .options.iter_mut().find(|o| o.id == option_id)
            .ok_or_else(|| VariantError::OptionNotFound { group_id: group_id.to_string(), option_id: option_id.to_string() })
    }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

fn require_title(title: &str) -> Result<&str, VariantError> {
    let title = title.trim();
    if title.is_empty() { Err(VariantError::EmptyTitle) } else { Ok(title) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    #[error("Variant group not found: {0}")]
    GroupNotFound(String),
    #[error("Option {option_id} not found in group {group_id}")]
    OptionNotFound { group_id: String, option_id: String },
    #[error("SKU not found: {0}")]
    SkuNotFound(String),
    #[error("Title must not be empty")]
    EmptyTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkuValidationError {
    #[error("SKU {sku_id} needs a price above zero")]
    MissingPrice { sku_id: String },
    #[error("SKU {sku_id} needs a stock quantity")]
    MissingQuantity { sku_id: String },
    #[error("SKU {sku_id} compare price is below its price")]
    ComparePriceBelowPrice { sku_id: String },
    #[error("SKU code {code} is used more than once")]
    DuplicateSkuCode { code: String },
}
