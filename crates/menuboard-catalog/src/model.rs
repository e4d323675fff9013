//! Catalog entity types and their creation/update payloads.
//!
//! Wire format is camelCase JSON so that a UI collaborator can exchange the
//! same records it renders.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::identity::{ItemId, MenuId, ModifierId};
use crate::CatalogError;

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// A price as supplied by the caller: a number, or a numeric string such as
/// `"3.50"`.
///
/// Strings are coerced on read; anything unparsable reads as NaN and is
/// ignored by the [`PriceResolver`](crate::price::PriceResolver).
///
/// JSON has no NaN or infinity, so non-finite amounts are written as their
/// text form (`"NaN"`, `"inf"`) and a `null` price reads back as NaN.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WirePrice")]
pub enum Price {
    Amount(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePrice {
    Amount(f64),
    Text(String),
    Null(()),
}

impl From<WirePrice> for Price {
    fn from(wire: WirePrice) -> Self {
        match wire {
            WirePrice::Amount(value) => Price::Amount(value),
            WirePrice::Text(text) => Price::Text(text),
            WirePrice::Null(()) => Price::Amount(f64::NAN),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Amount(value) if value.is_finite() => serializer.serialize_f64(*value),
            Price::Amount(value) => serializer.serialize_str(&value.to_string()),
            Price::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl Price {
    /// Numeric value of this price, NaN if it cannot be parsed.
    pub fn value(&self) -> f64 {
        match self {
            Price::Amount(value) => *value,
            Price::Text(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::Amount(value)
    }
}

impl From<&str> for Price {
    fn from(text: &str) -> Self {
        Price::Text(text.to_owned())
    }
}

/// One priced variant of an item or modifier (e.g. "Small", "Large").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOption {
    pub id: String,
    /// Display name; empty for a single default price.
    #[serde(default)]
    pub name: String,
    pub price: Price,
}

impl PriceOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: impl Into<Price>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.into(),
        }
    }

    /// A single unnamed default price.
    pub fn single(price: impl Into<Price>) -> Self {
        Self::new("default", "", price)
    }
}

// ---------------------------------------------------------------------------
// VisibilitySettings
// ---------------------------------------------------------------------------

/// A recurring window during which a scheduled item is shown.
///
/// Times are UTC wall-clock. When `end <= start` the window wraps past
/// midnight into the following day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityWindow {
    pub days: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// When an item is shown to customers.
///
/// Independent of the operational `is_available` / `is_sold_out` flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum VisibilitySettings {
    AlwaysVisible,
    /// Hidden until explicitly changed.
    Hidden,
    /// Hidden until the given instant, visible afterwards.
    HiddenUntil { until: DateTime<Utc> },
    /// Visible only inside one of the windows.
    Scheduled { windows: Vec<VisibilityWindow> },
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A sellable menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The menu this item is filed under.
    pub category: MenuId,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_available: bool,
    pub is_sold_out: bool,
    pub is_featured: bool,
    pub price_options: Vec<PriceOption>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub display_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_minutes: Option<u32>,
    #[serde(default)]
    pub ingredient_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_category: Option<String>,
    #[serde(default)]
    pub recommended: Vec<ItemId>,
    #[serde(default)]
    pub modifiers: Vec<ModifierId>,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilitySettings>,
}

impl Item {
    /// Whether the item can be ordered right now (available and not sold out).
    pub fn is_orderable(&self) -> bool {
        self.is_available && !self.is_sold_out
    }
}

/// Payload for creating an item. The id and timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub category: MenuId,
    pub images: Vec<String>,
    pub is_available: bool,
    pub is_sold_out: bool,
    pub is_featured: bool,
    pub price_options: Vec<PriceOption>,
    pub labels: Vec<String>,
    pub display_options: Vec<String>,
    pub size: Option<f64>,
    pub unit: Option<String>,
    pub preparation_minutes: Option<u32>,
    pub ingredient_warnings: Vec<String>,
    pub tax_category: Option<String>,
    pub recommended: Vec<ItemId>,
    pub modifiers: Vec<ModifierId>,
    pub visibility: Option<VisibilitySettings>,
}

impl NewItem {
    /// An available item with only the required fields set.
    pub fn new(name: impl Into<String>, category: MenuId, price_options: Vec<PriceOption>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category,
            images: Vec::new(),
            is_available: true,
            is_sold_out: false,
            is_featured: false,
            price_options,
            labels: Vec::new(),
            display_options: Vec::new(),
            size: None,
            unit: None,
            preparation_minutes: None,
            ingredient_warnings: Vec::new(),
            tax_category: None,
            recommended: Vec::new(),
            modifiers: Vec::new(),
            visibility: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilitySettings) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    /// Check the required fields. Does not check that the category exists.
    pub fn validate(&self) -> Result<(), CatalogError> {
        validate_name("name", &self.name)?;
        validate_size(self.size)?;
        validate_price_options(&self.price_options)
    }

    /// Materialize the item under the given id.
    pub fn into_item(self, id: ItemId, now: DateTime<Utc>) -> Item {
        Item {
            id,
            name: self.name.trim().to_owned(),
            description: self.description,
            category: self.category,
            images: self.images,
            is_available: self.is_available,
            is_sold_out: self.is_sold_out,
            is_featured: self.is_featured,
            price_options: self.price_options,
            labels: self.labels,
            display_options: self.display_options,
            size: self.size,
            unit: self.unit,
            preparation_minutes: self.preparation_minutes,
            ingredient_warnings: self.ingredient_warnings,
            tax_category: self.tax_category,
            recommended: self.recommended,
            modifiers: self.modifiers,
            last_modified: now,
            visibility: self.visibility,
        }
    }
}

/// Partial update of an item. `None` leaves the field as it was; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<MenuId>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
    pub is_sold_out: Option<bool>,
    pub is_featured: Option<bool>,
    pub price_options: Option<Vec<PriceOption>>,
    pub labels: Option<Vec<String>>,
    pub display_options: Option<Vec<String>>,
    pub size: Option<Option<f64>>,
    pub unit: Option<Option<String>>,
    pub preparation_minutes: Option<Option<u32>>,
    pub ingredient_warnings: Option<Vec<String>>,
    pub tax_category: Option<Option<String>>,
    pub recommended: Option<Vec<ItemId>>,
    pub modifiers: Option<Vec<ModifierId>>,
    pub visibility: Option<Option<VisibilitySettings>>,
}

impl ItemPatch {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(options) = &self.price_options {
            validate_price_options(options)?;
        }
        if let Some(size) = self.size {
            validate_size(size)?;
        }
        Ok(())
    }

    /// Merge the set fields into `item`. The id is never touched.
    pub fn apply_to(self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            item.name = name.trim().to_owned();
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(images) = self.images {
            item.images = images;
        }
        if let Some(flag) = self.is_available {
            item.is_available = flag;
        }
        if let Some(flag) = self.is_sold_out {
            item.is_sold_out = flag;
        }
        if let Some(flag) = self.is_featured {
            item.is_featured = flag;
        }
        if let Some(options) = self.price_options {
            item.price_options = options;
        }
        if let Some(labels) = self.labels {
            item.labels = labels;
        }
        if let Some(display_options) = self.display_options {
            item.display_options = display_options;
        }
        if let Some(size) = self.size {
            item.size = size;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if let Some(minutes) = self.preparation_minutes {
            item.preparation_minutes = minutes;
        }
        if let Some(warnings) = self.ingredient_warnings {
            item.ingredient_warnings = warnings;
        }
        if let Some(tax_category) = self.tax_category {
            item.tax_category = tax_category;
        }
        if let Some(recommended) = self.recommended {
            item.recommended = recommended;
        }
        if let Some(modifiers) = self.modifiers {
            item.modifiers = modifiers;
        }
        if let Some(visibility) = self.visibility {
            item.visibility = visibility;
        }
        item.last_modified = now;
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

/// Lifecycle status of a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    Active,
    Inactive,
    #[default]
    Draft,
}

/// A named grouping of items. Menus are also the categories items are filed
/// under; the item count is derived from the collection, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    pub status: MenuStatus,
    pub last_modified: DateTime<Utc>,
}

impl Menu {
    pub fn new(
        id: MenuId,
        name: impl Into<String>,
        status: MenuStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            last_modified: now,
        }
    }
}

/// Partial update of a menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPatch {
    pub name: Option<String>,
    pub status: Option<MenuStatus>,
}

impl MenuPatch {
    pub fn validate(&self) -> Result<(), CatalogError> {
        match &self.name {
            Some(name) => validate_name("name", name),
            None => Ok(()),
        }
    }

    pub fn apply_to(self, menu: &mut Menu, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            menu.name = name.trim().to_owned();
        }
        if let Some(status) = self.status {
            menu.status = status;
        }
        menu.last_modified = now;
    }
}

// ---------------------------------------------------------------------------
// ModifierGroup
// ---------------------------------------------------------------------------

/// A reusable set of add-ons or choices (e.g. "Milk", "Extra shot").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierGroup {
    pub id: ModifierId,
    pub name: String,
    pub options: Vec<PriceOption>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u32>,
    pub last_modified: DateTime<Utc>,
}

/// Payload for creating a modifier group.
#[derive(Debug, Clone, PartialEq)]
pub struct NewModifier {
    pub name: String,
    pub options: Vec<PriceOption>,
    pub required: bool,
    pub max_selections: Option<u32>,
}

impl NewModifier {
    pub fn new(name: impl Into<String>, options: Vec<PriceOption>) -> Self {
        Self {
            name: name.into(),
            options,
            required: false,
            max_selections: None,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        validate_name("name", &self.name)?;
        if self.options.is_empty() {
            return Err(CatalogError::validation(
                "options",
                "at least one modifier option is required",
            ));
        }
        validate_non_negative(&self.options)?;
        if self.max_selections == Some(0) {
            return Err(CatalogError::validation(
                "maxSelections",
                "must allow at least one selection",
            ));
        }
        Ok(())
    }

    pub fn into_modifier(self, id: ModifierId, now: DateTime<Utc>) -> ModifierGroup {
        ModifierGroup {
            id,
            name: self.name.trim().to_owned(),
            options: self.options,
            required: self.required,
            max_selections: self.max_selections,
            last_modified: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// A name is required and must contain something besides whitespace.
pub fn validate_name(field: &'static str, name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// At least one option, and no option with a finite negative price.
pub fn validate_price_options(options: &[PriceOption]) -> Result<(), CatalogError> {
    if options.is_empty() {
        return Err(CatalogError::validation(
            "priceOptions",
            "at least one price option is required",
        ));
    }
    validate_non_negative(options)
}

/// A portion size, when given, must be a finite number.
fn validate_size(size: Option<f64>) -> Result<(), CatalogError> {
    match size {
        Some(size) if !size.is_finite() => Err(CatalogError::validation(
            "size",
            "size must be a finite number",
        )),
        _ => Ok(()),
    }
}

fn validate_non_negative(options: &[PriceOption]) -> Result<(), CatalogError> {
    match options
        .iter()
        .find(|option| option.price.value().is_finite() && option.price.value() < 0.0)
    {
        Some(option) => Err(CatalogError::validation(
            "priceOptions",
            format!("price of option '{}' must not be negative", option.id),
        )),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
