//! # Project Data Structures
//!
//! The `Project` struct is the aggregate root for one booth estimate:
//! dimensions, named groups of priced line items, transport selection,
//! rate snapshots, and proposal metadata. Projects serialize to JSON in
//! the same shape the archive persists.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── id ("" while the draft is unsaved)
//! ├── dimensions: Dimensions (meters)
//! ├── groups: Vec<ProjectGroup> (always at least one)
//! │   └── items: Vec<LineItem> (ordered, order drives rendering)
//! └── proposal metadata (dates, terms, layout options)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use quote_core::config::AppConfig;
//! use quote_core::project::Project;
//!
//! let project = Project::new_draft(&AppConfig::default());
//! assert!(project.is_draft());
//! assert_eq!(project.groups.len(), 1);
//!
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("\"projectType\": \"single\""));
//! ```

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{section_color, Material, CUSTOM_MATERIAL_ID, DEFAULT_TRANSPORT_ID};
use crate::config::AppConfig;
use crate::errors::{EstimateError, EstimateResult};

/// Name given to the group every new draft starts with
pub const DEFAULT_GROUP_NAME: &str = "Main Module";

/// Today's date in the `%Y-%m-%d` form proposal dates use
pub fn today_ymd() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Booth pricing mode: one module or a multi-module bundle.
///
/// A `Single` project always has exactly one group; a `Bundle` may grow
/// more. Serialized lowercase to match the persisted archive shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Single,
    Bundle,
}

impl Default for ProjectType {
    fn default() -> Self {
        ProjectType::Single
    }
}

/// Booth dimensions in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub l: f64,
    pub w: f64,
    pub h: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions { l: 3.0, w: 3.0, h: 2.5 }
    }
}

impl Dimensions {
    /// Validate that all three dimensions are positive.
    pub fn validate(&self) -> EstimateResult<()> {
        for (field, value) in [("l", self.l), ("w", self.w), ("h", self.h)] {
            if value <= 0.0 {
                return Err(EstimateError::invalid_input(
                    field,
                    value.to_string(),
                    "Booth dimensions must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Footprint area in square meters
    pub fn floor_area_m2(&self) -> f64 {
        self.l * self.w
    }
}

/// One priced row inside a group.
///
/// `unit_price` is decoupled from the material's catalog price once the
/// item is added; `total` is the stored derived value
/// `quantity * unit_price * (1 + waste_factor)`, recomputed on every
/// quantity or price edit with the waste factor resolved from the
/// *current* catalog (0 when the material id no longer resolves).
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "0b9cde6e-...",
///   "materialId": "m1",
///   "name": "MDF 18mm",
///   "quantity": 3,
///   "unit": "Sheet",
///   "unitPrice": 850,
///   "total": 2932.5,
///   "category": "Wood"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    /// Catalog reference, or `"custom"` for ad-hoc items
    pub material_id: String,
    /// Display name, editable independently of the material name
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    /// Derived: `quantity * unit_price * (1 + waste_factor)`
    pub total: f64,
    /// Category copied at insertion time, not re-synced afterwards
    pub category: String,
    /// Optional single reference image (opaque data URI or URL)
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl LineItem {
    /// Build a line item from a catalog material. Quantity defaults
    /// to 1 and the total prices in the material's waste factor.
    pub fn from_material(material: &Material) -> Self {
        let quantity = 1.0;
        LineItem {
            id: Uuid::new_v4().to_string(),
            material_id: material.id.clone(),
            name: material.name.clone(),
            quantity,
            unit: material.unit.clone(),
            unit_price: material.price,
            total: quantity * material.price * (1.0 + material.waste_factor),
            category: material.category.clone(),
            image_ref: None,
        }
    }

    /// Build an ad-hoc item with no catalog backing: price 0, waste 0.
    pub fn custom(
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            material_id: CUSTOM_MATERIAL_ID.to_string(),
            name: name.into(),
            quantity,
            unit: unit.into(),
            unit_price: 0.0,
            total: 0.0,
            category: category.into(),
            image_ref: None,
        }
    }

    /// Recompute the stored total from current quantity and price.
    ///
    /// `waste_factor` must be resolved from the current catalog by the
    /// caller (0 for unresolved material ids).
    pub fn recompute_total(&mut self, waste_factor: f64) {
        self.total = self.quantity * self.unit_price * (1.0 + waste_factor);
    }
}

/// A named, colored bucket of line items: one booth module.
///
/// Item order is meaningful and preserved through to document
/// rendering. `image_refs` hold zero or more reference visuals shown
/// beside the module's item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGroup {
    pub id: String,
    pub name: String,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub image_refs: Vec<String>,
    /// Section accent color for headers
    #[serde(default)]
    pub header_color: Option<String>,
}

impl ProjectGroup {
    /// Create an empty group with the given name and accent.
    pub fn new(name: impl Into<String>, header_color: &str) -> Self {
        ProjectGroup {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            items: Vec::new(),
            image_refs: Vec::new(),
            header_color: Some(header_color.to_string()),
        }
    }

    /// Sum of item totals. An empty group contributes 0.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(|item| item.total).sum()
    }

    /// Find a line item by id.
    pub fn find_item(&self, item_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Find a line item by id, mutably.
    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

/// The aggregate root: one booth estimate / archived template.
///
/// An empty `id` denotes an unsaved draft; committing to the archive
/// assigns one. `markup` and `overhead` are rate snapshots stamped from
/// the config at save time so archived documents reprice consistently.
///
/// ## JSON Example (abbreviated)
///
/// ```json
/// {
///   "id": "",
///   "name": "Tech Expo Stand",
///   "clientName": "Acme GmbH",
///   "projectType": "bundle",
///   "dimensions": { "l": 6.0, "w": 3.0, "h": 3.0 },
///   "groups": [ { "id": "...", "name": "Main Module", "items": [] } ],
///   "selectedTransport": "t1",
///   "markup": 0.25,
///   "overhead": 0.1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Empty string while the draft is unsaved
    pub id: String,
    pub name: String,
    pub client_name: String,
    pub project_type: ProjectType,
    pub dimensions: Dimensions,
    pub groups: Vec<ProjectGroup>,

    /// Legacy labor fields, always 0 in saves; kept so archived
    /// files round-trip unchanged
    #[serde(default)]
    pub labor_days: f64,
    #[serde(default)]
    pub accommodation_per_day: f64,

    /// Transport rule id; unresolved ids price transport at 0
    pub selected_transport: String,

    /// Profit margin snapshot (decimal rate)
    pub markup: f64,
    /// Overhead rate snapshot (decimal rate)
    pub overhead: f64,

    // === Proposal metadata ===
    #[serde(default)]
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub proposal_date: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub validity_period: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub custom_logo: Option<String>,
    #[serde(default)]
    pub fit_to_page: Option<bool>,
    #[serde(default)]
    pub scale_percent: Option<f64>,
    #[serde(default)]
    pub valid_until: Option<String>,
}

impl Project {
    /// Create a pristine unsaved draft: single 3x3x2.5 booth, one
    /// empty "Main Module" group, default transport, rates snapshotted
    /// from the config.
    pub fn new_draft(config: &AppConfig) -> Self {
        Project {
            id: String::new(),
            name: String::new(),
            client_name: String::new(),
            project_type: ProjectType::Single,
            dimensions: Dimensions::default(),
            groups: vec![ProjectGroup::new(DEFAULT_GROUP_NAME, section_color(0))],
            labor_days: 0.0,
            accommodation_per_day: 0.0,
            selected_transport: DEFAULT_TRANSPORT_ID.to_string(),
            markup: config.default_markup,
            overhead: config.default_overhead,
            proposal_id: None,
            proposal_date: Some(today_ymd()),
            payment_terms: None,
            validity_period: None,
            notes: None,
            primary_color: None,
            custom_logo: None,
            fit_to_page: None,
            scale_percent: None,
            valid_until: None,
        }
    }

    /// Whether this project has never been committed to the archive.
    pub fn is_draft(&self) -> bool {
        self.id.is_empty()
    }

    /// Sum of all group subtotals.
    pub fn material_subtotal(&self) -> f64 {
        self.groups.iter().map(|g| g.subtotal()).sum()
    }

    /// Find a group by id.
    pub fn find_group(&self, group_id: &str) -> Option<&ProjectGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Find a group by id, mutably.
    pub fn find_group_mut(&mut self, group_id: &str) -> Option<&mut ProjectGroup> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    /// Duplicate an archived project as a fresh unsaved draft: cleared
    /// id and client, " (Copy)" name suffix, today's date, no proposal
    /// number. Groups and items are carried over as-is.
    pub fn duplicate_as_draft(&self) -> Project {
        let mut copy = self.clone();
        copy.id = String::new();
        copy.client_name = String::new();
        copy.name = format!("{} (Copy)", self.name);
        copy.proposal_date = Some(today_ymd());
        copy.proposal_id = None;
        copy
    }

    /// Validate structural invariants: positive dimensions and the
    /// minimum of one group.
    pub fn validate(&self) -> EstimateResult<()> {
        self.dimensions.validate()?;
        if self.groups.is_empty() {
            return Err(EstimateError::invalid_input(
                "groups",
                "[]",
                "A project must have at least one group",
            ));
        }
        Ok(())
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new_draft(&AppConfig::default())
    }
}
