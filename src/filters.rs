//! Admin-defined filters shown in the buyer's sidebar.
//!
//! The configuration lives under a single store key and is seeded with four
//! defaults the first time it is read.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::model::{Product, ProductCategory, Timestamp};
use crate::store::{new_id, FilterConfigRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    Dropdown,
    MultiSelect,
    Range,
    Rating,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterDataSource {
    ProductCategory,
    ProductBrand,
    Custom,
    ProductField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: OptionValue,
}

impl FilterOption {
    fn text(s: &str) -> Self {
        Self {
            label: s.to_string(),
            value: OptionValue::Text(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFilter {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub data_source: FilterDataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FilterOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    pub is_active: bool,
    pub order: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A filter as submitted by an admin, before it gets an id.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDraft {
    pub name: String,
    pub filter_type: FilterType,
    pub data_source: FilterDataSource,
    pub product_field: Option<String>,
    pub options: Option<Vec<FilterOption>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub default_value: Option<Value>,
    pub is_active: bool,
    pub order: u32,
}

impl FilterDraft {
    pub fn new(name: &str, filter_type: FilterType, data_source: FilterDataSource) -> Self {
        Self {
            name: name.to_string(),
            filter_type,
            data_source,
            product_field: None,
            options: None,
            min: None,
            max: None,
            step: None,
            default_value: None,
            is_active: true,
            order: 0,
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.product_field = Some(field.to_string());
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_options(mut self, options: Vec<FilterOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    fn into_filter(self, id: String, now: Timestamp) -> DynamicFilter {
        DynamicFilter {
            id,
            name: self.name,
            filter_type: self.filter_type,
            data_source: self.data_source,
            product_field: self.product_field,
            options: self.options,
            min: self.min,
            max: self.max,
            step: self.step,
            default_value: self.default_value,
            is_active: self.is_active,
            order: self.order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub name: Option<String>,
    pub filter_type: Option<FilterType>,
    pub data_source: Option<FilterDataSource>,
    pub product_field: Option<String>,
    pub options: Option<Vec<FilterOption>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub default_value: Option<Value>,
    pub is_active: Option<bool>,
    pub order: Option<u32>,
}

impl FilterPatch {
    fn apply(self, filter: &mut DynamicFilter, now: Timestamp) {
        if let Some(v) = self.name {
            filter.name = v;
        }
        if let Some(v) = self.filter_type {
            filter.filter_type = v;
        }
        if let Some(v) = self.data_source {
            filter.data_source = v;
        }
        if self.product_field.is_some() {
            filter.product_field = self.product_field;
        }
        if self.options.is_some() {
            filter.options = self.options;
        }
        if self.min.is_some() {
            filter.min = self.min;
        }
        if self.max.is_some() {
            filter.max = self.max;
        }
        if self.step.is_some() {
            filter.step = self.step;
        }
        if self.default_value.is_some() {
            filter.default_value = self.default_value;
        }
        if let Some(v) = self.is_active {
            filter.is_active = v;
        }
        if let Some(v) = self.order {
            filter.order = v;
        }
        filter.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfiguration {
    pub filters: Vec<DynamicFilter>,
    pub last_updated: Timestamp,
}

impl FilterConfiguration {
    pub fn defaults(now: Timestamp) -> Self {
        let drafts = [
            FilterDraft::new("Category", FilterType::Dropdown, FilterDataSource::ProductCategory)
                .with_field("category")
                .with_order(1),
            FilterDraft::new("Price Range", FilterType::Range, FilterDataSource::ProductField)
                .with_field("price")
                .with_bounds(0.0, 1000.0, 10.0)
                .with_default(json!({ "min": 0, "max": 1000 }))
                .with_order(2),
            FilterDraft::new("Minimum Rating", FilterType::Rating, FilterDataSource::ProductField)
                .with_field("rating")
                .with_bounds(0.0, 5.0, 0.5)
                .with_default(json!(0))
                .with_order(3),
            FilterDraft::new("Brand", FilterType::MultiSelect, FilterDataSource::ProductBrand)
                .with_field("brand")
                .with_order(4),
        ];
        Self {
            filters: drafts
                .into_iter()
                .map(|d| d.into_filter(new_id(), now))
                .collect(),
            last_updated: now,
        }
    }

    pub fn filter(&self, id: &str) -> Option<&DynamicFilter> {
        self.filters.iter().find(|f| f.id == id)
    }

    /// Active filters in display order.
    pub fn active(&self) -> Vec<&DynamicFilter> {
        let mut out: Vec<&DynamicFilter> = self.filters.iter().filter(|f| f.is_active).collect();
        out.sort_by_key(|f| f.order);
        out
    }
}

/// Stored configuration, seeding the defaults if none exists yet.
pub fn configuration<R: FilterConfigRepository>(repo: &mut R, now: Timestamp) -> Result<FilterConfiguration> {
    if let Some(config) = repo.filter_configuration()? {
        return Ok(config);
    }
    let config = FilterConfiguration::defaults(now);
    repo.save_filter_configuration(&config)?;
    log(
        Level::Info,
        Domain::Admin,
        "filters_seeded",
        obj(&[("count", v_num(config.filters.len() as f64))]),
    );
    Ok(config)
}

pub fn active_filters<R: FilterConfigRepository>(repo: &mut R, now: Timestamp) -> Result<Vec<DynamicFilter>> {
    let config = configuration(repo, now)?;
    Ok(config.active().into_iter().cloned().collect())
}

pub fn add_filter<R: FilterConfigRepository>(
    repo: &mut R,
    draft: FilterDraft,
    now: Timestamp,
) -> Result<DynamicFilter> {
    let mut config = configuration(repo, now)?;
    let filter = draft.into_filter(new_id(), now);
    config.filters.push(filter.clone());
    commit(repo, config, now, "filter_added", &filter.id)?;
    Ok(filter)
}

/// Returns false when no filter has the id; nothing is written then.
pub fn update_filter<R: FilterConfigRepository>(
    repo: &mut R,
    id: &str,
    patch: FilterPatch,
    now: Timestamp,
) -> Result<bool> {
    let mut config = configuration(repo, now)?;
    let Some(filter) = config.filters.iter_mut().find(|f| f.id == id) else {
        return Ok(false);
    };
    patch.apply(filter, now);
    commit(repo, config, now, "filter_updated", id)?;
    Ok(true)
}

pub fn delete_filter<R: FilterConfigRepository>(repo: &mut R, id: &str, now: Timestamp) -> Result<bool> {
    let mut config = configuration(repo, now)?;
    let before = config.filters.len();
    config.filters.retain(|f| f.id != id);
    let removed = config.filters.len() != before;
    commit(repo, config, now, "filter_deleted", id)?;
    Ok(removed)
}

/// Flip `is_active`. Returns the new state, `None` for an unknown id.
pub fn toggle_filter<R: FilterConfigRepository>(repo: &mut R, id: &str, now: Timestamp) -> Result<Option<bool>> {
    let mut config = configuration(repo, now)?;
    let Some(filter) = config.filters.iter_mut().find(|f| f.id == id) else {
        return Ok(None);
    };
    filter.is_active = !filter.is_active;
    filter.updated_at = now;
    let state = filter.is_active;
    commit(repo, config, now, "filter_toggled", id)?;
    Ok(Some(state))
}

/// Assign `order = position + 1` following `ids`. Unknown ids are skipped and
/// filters not listed keep their order.
pub fn reorder_filters<R: FilterConfigRepository>(repo: &mut R, ids: &[&str], now: Timestamp) -> Result<()> {
    let mut config = configuration(repo, now)?;
    for (index, id) in ids.iter().enumerate() {
        if let Some(filter) = config.filters.iter_mut().find(|f| f.id == *id) {
            filter.order = index as u32 + 1;
            filter.updated_at = now;
        }
    }
    commit(repo, config, now, "filters_reordered", "")
}

pub fn reset_filters<R: FilterConfigRepository>(repo: &mut R, now: Timestamp) -> Result<FilterConfiguration> {
    repo.remove_filter_configuration()?;
    configuration(repo, now)
}

/// Choices for a filter given the current catalog.
pub fn filter_options(filter: &DynamicFilter, products: &[Product]) -> Vec<FilterOption> {
    match filter.data_source {
        FilterDataSource::ProductCategory => ProductCategory::ALL
            .iter()
            .map(|c| FilterOption::text(c.label()))
            .collect(),
        FilterDataSource::ProductBrand => {
            let mut seen: Vec<&str> = Vec::new();
            for p in products {
                if !seen.contains(&p.brand.as_str()) {
                    seen.push(&p.brand);
                }
            }
            seen.into_iter().map(FilterOption::text).collect()
        }
        FilterDataSource::Custom => filter.options.clone().unwrap_or_default(),
        FilterDataSource::ProductField => Vec::new(),
    }
}

fn commit<R: FilterConfigRepository>(
    repo: &mut R,
    mut config: FilterConfiguration,
    now: Timestamp,
    event: &str,
    filter_id: &str,
) -> Result<()> {
    config.last_updated = now;
    repo.save_filter_configuration(&config)?;
    log(
        Level::Info,
        Domain::Admin,
        event,
        obj(&[
            ("filter_id", v_str(filter_id)),
            ("count", v_num(config.filters.len() as f64)),
        ]),
    );
    Ok(())
}
