//! Variant matrix: cartesian SKU generation with edit-preserving merge

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use crate::domain::value_objects::{ComboKey, ImageRef, WeightUnit};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantOption {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
}

impl VariantOption {
    pub fn new(title: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), title: title.into(), image: None, image_preview: None }
    }
}

/// One axis of variation (Color, Size). Option order is display order only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantGroup {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_options")]
    pub options: Vec<VariantOption>,
}

impl VariantGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), title: title.into(), options: vec![] }
    }
    pub fn option(&self, option_id: &str) -> Option<&VariantOption> { self.options.iter().find(|o| o.id == option_id) }
}

// A non-array `options` value, or an option entry that does not parse, reads as absent.
fn lenient_options<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<VariantOption>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items.into_iter().filter_map(|v| serde_json::from_value(v).ok()).collect(),
        _ => vec![],
    })
}

/// Product-level values a new combination starts from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDefaults {
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub weight_unit: Option<WeightUnit>,
}

/// One sellable cell of the variant matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkuCombination {
    pub id: String,
    pub option_ids: Vec<String>,
    pub option_map: BTreeMap<String, String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub length: Option<Decimal>,
    #[serde(default)]
    pub width: Option<Decimal>,
    #[serde(default)]
    pub height: Option<Decimal>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub weight_unit: Option<WeightUnit>,
    #[serde(default)]
    pub sku_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
    /// Low-stock alert threshold.
    #[serde(default)]
    pub critical_trigger: Option<u32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_refundable: bool,
}

fn default_active() -> bool { true }

impl SkuCombination {
    pub fn key(&self) -> ComboKey { ComboKey::from_option_ids(&self.option_ids) }

    /// "Red / XL" style label following group order.
    pub fn display_title(&self, groups: &[VariantGroup]) -> String {
        groups.iter()
            .filter_map(|g| self.option_map.get(&g.id).and_then(|oid| g.option(oid)).map(|o| o.title.as_str()))
            .collect::<Vec<_>>()
            .join(" / ")
    }

    fn fresh(id: String, option_ids: Vec<String>, option_map: BTreeMap<String, String>, defaults: &ProductDefaults) -> Self {
        Self {
            id, option_ids, option_map,
            price: defaults.price, compare_price: None, quantity: defaults.quantity,
            length: defaults.length, width: defaults.width, height: defaults.height,
            weight: defaults.weight, weight_unit: defaults.weight_unit,
            sku_code: None, image: None, image_preview: None, critical_trigger: None,
            is_active: true, is_refundable: false,
        }
    }

    fn inherit(prev: &SkuCombination, option_ids: Vec<String>, option_map: BTreeMap<String, String>, defaults: &ProductDefaults) -> Self {
        Self {
            id: prev.id.clone(), option_ids, option_map,
            price: prev.price.or(defaults.price),
            compare_price: prev.compare_price,
            quantity: prev.quantity.or(defaults.quantity),
            length: prev.length.or(defaults.length),
            width: prev.width.or(defaults.width),
            height: prev.height.or(defaults.height),
            weight: prev.weight.or(defaults.weight),
            weight_unit: prev.weight_unit.or(defaults.weight_unit),
            sku_code: prev.sku_code.clone(),
            image: prev.image.clone(),
            image_preview: prev.image_preview.clone(),
            critical_trigger: prev.critical_trigger,
            is_active: prev.is_active,
            is_refundable: prev.is_refundable,
        }
    }
}

/// Largest matrix the JSON service will build for one request.
pub const MAX_COMBINATIONS: usize = 10_000;

/// Number of combinations the groups produce. No groups means no SKUs.
pub fn combination_count(groups: &[VariantGroup]) -> usize {
    if groups.is_empty() { return 0; }
    groups.iter().fold(1usize, |acc, g| acc.saturating_mul(g.options.len()))
}

/// Rebuilds the SKU list for `groups`, carrying over everything the seller
/// entered for combinations whose option set already existed in `previous`.
///
/// Returns `previous` itself (same `Arc`) when the rebuilt list has the same
/// ids, prices, quantities and codes at every position.
pub fn generate_combinations(groups: &[VariantGroup], defaults: &ProductDefaults, previous: &Arc<Vec<SkuCombination>>) -> Arc<Vec<SkuCombination>> {
    generate_combinations_with(groups, defaults, previous, || Uuid::new_v4().to_string())
}

/// Same as [`generate_combinations`] with a caller-supplied id source.
pub fn generate_combinations_with<F>(groups: &[VariantGroup], defaults: &ProductDefaults, previous: &Arc<Vec<SkuCombination>>, mut next_id: F) -> Arc<Vec<SkuCombination>>
where
    F: FnMut() -> String,
{
    if groups.is_empty() {
        if previous.is_empty() { return Arc::clone(previous); }
        debug!(cleared = previous.len(), "variant groups removed, clearing sku matrix");
        return Arc::new(vec![]);
    }

    let mut by_key: HashMap<ComboKey, usize> = HashMap::with_capacity(previous.len());
    for (idx, sku) in previous.iter().enumerate() {
        by_key.entry(sku.key()).or_insert(idx);
    }
    let mut claimed = vec![false; previous.len()];

    let built: Vec<SkuCombination> = cartesian(groups).into_iter().map(|picks| {
        let option_ids: Vec<String> = picks.iter().map(|(_, o)| o.id.clone()).collect();
        let option_map: BTreeMap<String, String> = picks.iter().map(|(g, o)| (g.id.clone(), o.id.clone())).collect();
        let key = ComboKey::from_option_ids(&option_ids);
        match by_key.get(&key).copied().filter(|&idx| !claimed[idx]) {
            Some(idx) => {
                claimed[idx] = true;
                SkuCombination::inherit(&previous[idx], option_ids, option_map, defaults)
            }
            None => SkuCombination::fresh(next_id(), option_ids, option_map, defaults),
        }
    }).collect();

    if is_unchanged(&built, previous) {
        debug!(skus = built.len(), "sku matrix unchanged");
        return Arc::clone(previous);
    }
    let kept = claimed.iter().filter(|c| **c).count();
    debug!(skus = built.len(), kept, created = built.len() - kept, "sku matrix rebuilt");
    Arc::new(built)
}

/// Removes one option from one group. A group left without options stays.
pub fn remove_option(groups: &[VariantGroup], group_id: &str, option_id: &str) -> Vec<VariantGroup> {
    groups.iter().map(|g| {
        let mut g = g.clone();
        if g.id == group_id { g.options.retain(|o| o.id != option_id); }
        g
    }).collect()
}

// First group outermost, last group innermost.
fn cartesian(groups: &[VariantGroup]) -> Vec<Vec<(&VariantGroup, &VariantOption)>> {
    groups.iter().fold(vec![vec![]], |acc, group| {
        acc.iter()
            .flat_map(|prefix| group.options.iter().map(move |opt| {
                let mut next = prefix.clone();
                next.push((group, opt));
                next
            }))
            .collect()
    })
}

fn is_unchanged(built: &[SkuCombination], previous: &[SkuCombination]) -> bool {
    built.len() == previous.len()
        && built.iter().zip(previous).all(|(a, b)| a.id == b.id && a.price == b.price && a.quantity == b.quantity && a.sku_code == b.sku_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn group(id: &str, options: &[&str]) -> VariantGroup {
        VariantGroup {
            id: id.into(), title: id.to_uppercase(),
            options: options.iter().map(|o| VariantOption { id: o.to_string(), title: o.to_uppercase(), image: None, image_preview: None }).collect(),
        }
    }

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || { n += 1; format!("sku-{}", n) }
    }

    fn build(groups: &[VariantGroup], defaults: &ProductDefaults, previous: &Arc<Vec<SkuCombination>>) -> Arc<Vec<SkuCombination>> {
        generate_combinations_with(groups, defaults, previous, counter())
    }

    #[test]
    fn test_cartesian_completeness() {
        let groups = vec![group("color", &["red", "blue", "green"]), group("size", &["s", "m"]), group("fit", &["slim", "loose"])];
        let skus = build(&groups, &ProductDefaults::default(), &Arc::new(vec![]));
        assert_eq!(skus.len(), 12);
        assert_eq!(combination_count(&groups), 12);
        let keys: HashSet<ComboKey> = skus.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), 12);
    }

    #[test]
    fn test_first_group_varies_slowest() {
        let groups = vec![group("color", &["red", "blue"]), group("size", &["s", "m"])];
        let skus = build(&groups, &ProductDefaults::default(), &Arc::new(vec![]));
        let ids: Vec<Vec<String>> = skus.iter().map(|s| s.option_ids.clone()).collect();
        assert_eq!(ids, vec![
            vec!["red".to_string(), "s".to_string()],
            vec!["red".to_string(), "m".to_string()],
            vec!["blue".to_string(), "s".to_string()],
            vec!["blue".to_string(), "m".to_string()],
        ]);
        assert_eq!(skus[1].option_map.get("size").map(String::as_str), Some("m"));
        assert_eq!(skus[2].display_title(&groups), "BLUE / S");
    }

    #[test]
    fn test_new_combinations_take_defaults() {
        let defaults = ProductDefaults { price: Some(Decimal::new(2500, 2)), quantity: Some(7), weight_unit: Some(WeightUnit::G), ..Default::default() };
        let skus = build(&[group("color", &["red"])], &defaults, &Arc::new(vec![]));
        assert_eq!(skus[0].price, Some(Decimal::new(2500, 2)));
        assert_eq!(skus[0].quantity, Some(7));
        assert_eq!(skus[0].weight_unit, Some(WeightUnit::G));
        assert!(skus[0].is_active);
        assert!(!skus[0].is_refundable);
        assert!(skus[0].image.is_none());
    }

    #[test]
    fn test_unchanged_groups_return_same_list() {
        let groups = vec![group("color", &["red", "blue"]), group("size", &["s"])];
        let first = build(&groups, &ProductDefaults::default(), &Arc::new(vec![]));
        let second = build(&groups, &ProductDefaults::default(), &first);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_edits_survive_option_rename() {
        let mut groups = vec![group("color", &["red", "blue"]), group("size", &["s", "m"])];
        let first = build(&groups, &ProductDefaults::default(), &Arc::new(vec![]));
        let mut edited = (*first).clone();
        let target = edited.iter_mut().find(|s| s.key() == ComboKey::from_option_ids(&["blue", "m"])).unwrap();
        target.price = Some(Decimal::new(9999, 2));
        target.sku_code = Some("TEE-BLU-M".into());
        target.is_refundable = true;
        let target_id = target.id.clone();
        let edited = Arc::new(edited);

        groups[1].options[0].title = "Small".into();
        let next = build(&groups, &ProductDefaults::default(), &edited);
        let sku = next.iter().find(|s| s.id == target_id).unwrap();
        assert_eq!(sku.price, Some(Decimal::new(9999, 2)));
        assert_eq!(sku.sku_code.as_deref(), Some("TEE-BLU-M"));
        assert!(sku.is_refundable);
    }

    #[test]
    fn test_reordering_keeps_ids() {
        let groups = vec![group("color", &["red", "blue"]), group("size", &["s", "m"])];
        let first = build(&groups, &ProductDefaults::default(), &Arc::new(vec![]));
        let reordered = vec![groups[1].clone(), groups[0].clone()];
        let next = build(&reordered, &ProductDefaults::default(), &first);
        assert!(!Arc::ptr_eq(&first, &next));
        let before: HashMap<ComboKey, String> = first.iter().map(|s| (s.key(), s.id.clone())).collect();
        for sku in next.iter() {
            assert_eq!(before.get(&sku.key()), Some(&sku.id));
        }
    }

    #[test]
    fn test_unset_fields_fall_back_to_defaults() {
        let groups = vec![group("color", &["red"])];
        let first = build(&groups, &ProductDefaults::default(), &Arc::new(vec![]));
        assert_eq!(first[0].price, None);
        let defaults = ProductDefaults { price: Some(Decimal::new(15, 0)), ..Default::default() };
        let next = build(&groups, &defaults, &first);
        assert_eq!(next[0].id, first[0].id);
        assert_eq!(next[0].price, Some(Decimal::new(15, 0)));
    }

    #[test]
    fn test_empty_groups_clear_matrix() {
        let first = build(&[group("color", &["red", "blue"])], &ProductDefaults::default(), &Arc::new(vec![]));
        assert_eq!(first.len(), 2);
        assert!(build(&[], &ProductDefaults::default(), &first).is_empty());
    }

    #[test]
    fn test_group_without_options_yields_nothing() {
        let groups = vec![group("color", &["red", "blue"]), group("size", &[])];
        assert!(build(&groups, &ProductDefaults::default(), &Arc::new(vec![])).is_empty());
        assert_eq!(combination_count(&groups), 0);
    }

    #[test]
    fn test_combination_count_saturates() {
        let wide: Vec<VariantGroup> = (0..40).map(|i| {
            let ids: Vec<String> = (0..20).map(|o| format!("g{}-o{}", i, o)).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            group(&format!("g{}", i), &refs)
        }).collect();
        assert_eq!(combination_count(&wide), usize::MAX);
        assert!(combination_count(&wide) > MAX_COMBINATIONS);
    }

    #[test]
    fn test_single_option_group_is_identity() {
        let base = vec![group("color", &["red", "blue"])];
        let with_single = vec![group("color", &["red", "blue"]), group("material", &["cotton"])];
        let a = build(&base, &ProductDefaults::default(), &Arc::new(vec![]));
        let b = build(&with_single, &ProductDefaults::default(), &Arc::new(vec![]));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_added_group_starts_from_defaults() {
        let defaults = ProductDefaults { price: Some(Decimal::new(10, 0)), ..Default::default() };
        let first = build(&[group("color", &["red"])], &defaults, &Arc::new(vec![]));
        let mut edited = (*first).clone();
        edited[0].price = Some(Decimal::new(42, 0));
        let next = build(&[group("color", &["red"]), group("size", &["s", "m"])], &defaults, &Arc::new(edited));
        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|s| s.price == Some(Decimal::new(10, 0)) && s.id != first[0].id));
    }

    #[test]
    fn test_duplicate_keys_claim_previous_once() {
        let first = build(&[group("a", &["x"]), group("b", &["y"])], &ProductDefaults::default(), &Arc::new(vec![]));
        // [x, y] and [y, x] share a key.
        let crossed = vec![group("a", &["x", "y"]), group("b", &["y", "x"])];
        let mut n = 0;
        let next = generate_combinations_with(&crossed, &ProductDefaults::default(), &first, || { n += 1; format!("new-{}", n) });
        assert_eq!(next.len(), 4);
        assert_eq!(next[0].id, first[0].id);
        assert_ne!(next[3].id, first[0].id);
    }

    #[test]
    fn test_remove_option_keeps_empty_group() {
        let groups = vec![group("color", &["red"]), group("size", &["s", "m"])];
        let next = remove_option(&groups, "color", "red");
        assert_eq!(next.len(), 2);
        assert!(next[0].options.is_empty());
        assert_eq!(remove_option(&groups, "size", "xl"), groups);
    }

    #[test]
    fn test_malformed_options_read_as_empty() {
        let g: VariantGroup = serde_json::from_str(r#"{"id":"g1","title":"Color","options":"oops"}"#).unwrap();
        assert!(g.options.is_empty());
        let g: VariantGroup = serde_json::from_str(r#"{"id":"g1","title":"Color","options":[{"id":"r","title":"Red"},42]}"#).unwrap();
        assert_eq!(g.options.len(), 1);
        let g: VariantGroup = serde_json::from_str(r#"{"id":"g1","title":"Color"}"#).unwrap();
        assert!(g.options.is_empty());
    }
}
