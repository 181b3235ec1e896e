//! # Material Catalog & Reference Data
//!
//! Static reference data for booth estimation: the material library,
//! transport pricing rules, and the accent palettes used for category
//! badges and booth-module headers in documents.
//!
//! Materials are immutable reference data from the line items' point of
//! view: items copy name/unit/price/category at insertion and only the
//! waste factor is re-resolved from the catalog on later edits.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::catalog::MaterialCatalog;
//!
//! let catalog = MaterialCatalog::seeded();
//!
//! let mdf = catalog.find("m1").unwrap();
//! assert_eq!(mdf.name, "MDF 18mm");
//! assert_eq!(mdf.price, 850.0);
//!
//! // Waste factor lookups default to 0 on a miss (custom items)
//! assert_eq!(catalog.waste_factor_for("m1"), 0.15);
//! assert_eq!(catalog.waste_factor_for("custom"), 0.0);
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Sentinel material id for ad-hoc items that reference no catalog entry
pub const CUSTOM_MATERIAL_ID: &str = "custom";

/// Transport rule selected for new drafts
pub const DEFAULT_TRANSPORT_ID: &str = "t1";

/// A catalog entry: one purchasable material with unit economics.
///
/// `waste_factor` is the fractional overage baked into line totals
/// (0.15 means 15% extra material is priced in).
///
/// ## JSON Example
///
/// ```json
/// { "id": "m1", "name": "MDF 18mm", "category": "Wood",
///   "unit": "Sheet", "price": 850, "wasteFactor": 0.15 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    /// Free-form category key, used for palette lookups and grouping
    pub category: String,
    /// Display unit (e.g. "Sheet", "m2", "Pcs")
    pub unit: String,
    /// Cost per unit before waste, EGP
    pub price: f64,
    /// Fractional overage applied multiplicatively (>= 0)
    pub waste_factor: f64,
}

/// A flat transport pricing rule.
///
/// Transport cost is `base_price + loading_fee`; an unresolved rule id
/// prices transport at zero rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRule {
    pub id: String,
    /// Truck class label (e.g. "Quarter", "Half")
    #[serde(rename = "type")]
    pub kind: String,
    pub base_price: f64,
    pub loading_fee: f64,
}

impl TransportRule {
    /// Full cost of this rule: base price plus loading fee
    pub fn total_cost(&self) -> f64 {
        self.base_price + self.loading_fee
    }
}

fn mat(id: &str, name: &str, category: &str, unit: &str, price: f64, waste_factor: f64) -> Material {
    Material {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        price,
        waste_factor,
    }
}

/// Built-in material library (Egyptian market defaults)
pub static SEED_MATERIALS: Lazy<Vec<Material>> = Lazy::new(|| {
    vec![
        mat("m1", "MDF 18mm", "Wood", "Sheet", 850.0, 0.15),
        mat("m2", "MDF 12mm", "Wood", "Sheet", 600.0, 0.15),
        mat("m3", "Muski Wood", "Wood", "m3", 15500.0, 0.10),
        mat("m4", "Formica Standard", "Finishing", "m2", 420.0, 0.05),
        mat("m5", "Plastic Paint", "Finishing", "m2", 85.0, 0.05),
        mat("m6", "Banner Frontlit", "Printing", "m2", 110.0, 0.08),
        mat("m7", "Vinyl Sticker", "Printing", "m2", 190.0, 0.08),
        mat("m8", "LED Spotlight", "Lighting", "Pcs", 475.0, 0.0),
        mat("m9", "LED Strip", "Lighting", "m", 150.0, 0.02),
    ]
});

/// Built-in transport rules (truck classes)
pub static SEED_TRANSPORT: Lazy<Vec<TransportRule>> = Lazy::new(|| {
    vec![
        TransportRule {
            id: "t1".to_string(),
            kind: "Quarter".to_string(),
            base_price: 1000.0,
            loading_fee: 400.0,
        },
        TransportRule {
            id: "t2".to_string(),
            kind: "Half".to_string(),
            base_price: 1800.0,
            loading_fee: 600.0,
        },
    ]
});

/// Resolve a transport rule by id from the built-in rules.
pub fn find_transport(id: &str) -> Option<&'static TransportRule> {
    SEED_TRANSPORT.iter().find(|rule| rule.id == id)
}

// === Category & Section Palettes ===

/// Accent style descriptor for a material category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    /// Hex accent color for category badges and row markers
    pub accent: &'static str,
}

/// Style returned for category keys with no palette entry
pub const FALLBACK_CATEGORY_STYLE: CategoryStyle = CategoryStyle { accent: "#6366f1" };

static CATEGORY_STYLES: Lazy<HashMap<&'static str, CategoryStyle>> = Lazy::new(|| {
    HashMap::from([
        ("Wood", CategoryStyle { accent: "#92400e" }),
        ("Finishing", CategoryStyle { accent: "#065f46" }),
        ("Printing", CategoryStyle { accent: "#1e40af" }),
        ("Metal", CategoryStyle { accent: "#334155" }),
        ("Lighting", CategoryStyle { accent: "#ea580c" }),
        ("Tools", CategoryStyle { accent: "#be123c" }),
        ("Custom", CategoryStyle { accent: "#4338ca" }),
        ("AI Recommendation", CategoryStyle { accent: "#0891b2" }),
    ])
});

/// Look up the accent style for a category key, falling back for
/// unknown keys rather than failing.
pub fn category_style(category: &str) -> CategoryStyle {
    CATEGORY_STYLES
        .get(category)
        .copied()
        .unwrap_or(FALLBACK_CATEGORY_STYLE)
}

/// Accent palette cycled for booth-module section headers
pub const SECTION_COLORS: [&str; 10] = [
    "#2563eb", "#7c3aed", "#db2777", "#dc2626", "#ea580c", "#d97706", "#65a30d", "#059669",
    "#0891b2", "#475569",
];

/// Section accent for the group at `index`, cycling the palette.
pub fn section_color(index: usize) -> &'static str {
    SECTION_COLORS[index % SECTION_COLORS.len()]
}

// === Persisted Catalog ===

/// The persisted material library: materials, the category list, and
/// per-category accent overrides chosen by catalog management.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCatalog {
    pub materials: Vec<Material>,
    pub categories: Vec<String>,
    /// Category accent overrides; absent keys fall back to the built-in palette
    #[serde(default)]
    pub category_colors: HashMap<String, String>,
}

impl MaterialCatalog {
    /// Catalog pre-loaded with the built-in material library.
    pub fn seeded() -> Self {
        let materials = SEED_MATERIALS.clone();
        let mut categories = Vec::new();
        for m in &materials {
            if !categories.contains(&m.category) {
                categories.push(m.category.clone());
            }
        }
        MaterialCatalog {
            materials,
            categories,
            category_colors: HashMap::new(),
        }
    }

    /// Find a material by id.
    pub fn find(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Waste factor for a material id, resolved against the current
    /// catalog. Unknown ids (custom items) resolve to 0.
    pub fn waste_factor_for(&self, material_id: &str) -> f64 {
        self.find(material_id).map(|m| m.waste_factor).unwrap_or(0.0)
    }

    /// Materials belonging to one category, in catalog order.
    pub fn materials_in(&self, category: &str) -> Vec<&Material> {
        self.materials.iter().filter(|m| m.category == category).collect()
    }

    /// Accent color for a category, honoring persisted overrides before
    /// the built-in palette.
    pub fn category_accent(&self, category: &str) -> String {
        self.category_colors
            .get(category)
            .cloned()
            .unwrap_or_else(|| category_style(category).accent.to_string())
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        MaterialCatalog::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_materials() {
        assert_eq!(SEED_MATERIALS.len(), 9);

        let mdf = &SEED_MATERIALS[0];
        assert_eq!(mdf.id, "m1");
        assert_eq!(mdf.name, "MDF 18mm");
        assert_eq!(mdf.category, "Wood");
        assert_eq!(mdf.price, 850.0);
        assert_eq!(mdf.waste_factor, 0.15);

        let led = &SEED_MATERIALS[8];
        assert_eq!(led.id, "m9");
        assert_eq!(led.unit, "m");
    }

    #[test]
    fn test_transport_cost() {
        let quarter = find_transport("t1").unwrap();
        assert_eq!(quarter.total_cost(), 1400.0);

        let half = find_transport("t2").unwrap();
        assert_eq!(half.total_cost(), 2400.0);

        assert!(find_transport("t99").is_none());
    }

    #[test]
    fn test_waste_factor_lookup() {
        let catalog = MaterialCatalog::seeded();
        assert_eq!(catalog.waste_factor_for("m1"), 0.15);
        assert_eq!(catalog.waste_factor_for("m8"), 0.0);
        // Misses normalize to zero, never error
        assert_eq!(catalog.waste_factor_for(CUSTOM_MATERIAL_ID), 0.0);
        assert_eq!(catalog.waste_factor_for("deleted-id"), 0.0);
    }

    #[test]
    fn test_seeded_categories() {
        let catalog = MaterialCatalog::seeded();
        assert_eq!(catalog.categories, vec!["Wood", "Finishing", "Printing", "Lighting"]);
        assert_eq!(catalog.materials_in("Wood").len(), 3);
        assert_eq!(catalog.materials_in("Metal").len(), 0);
    }

    #[test]
    fn test_category_style_fallback() {
        assert_eq!(category_style("Wood").accent, "#92400e");
        assert_eq!(category_style("AI Recommendation").accent, "#0891b2");
        assert_eq!(category_style("Upholstery"), FALLBACK_CATEGORY_STYLE);
    }

    #[test]
    fn test_category_accent_override() {
        let mut catalog = MaterialCatalog::seeded();
        assert_eq!(catalog.category_accent("Wood"), "#92400e");

        catalog
            .category_colors
            .insert("Wood".to_string(), "#123456".to_string());
        assert_eq!(catalog.category_accent("Wood"), "#123456");
    }

    #[test]
    fn test_section_color_cycles() {
        assert_eq!(section_color(0), "#2563eb");
        assert_eq!(section_color(9), "#475569");
        assert_eq!(section_color(10), "#2563eb");
        assert_eq!(section_color(23), section_color(3));
    }

    #[test]
    fn test_material_serialization() {
        let mdf = &SEED_MATERIALS[0];
        let json = serde_json::to_string(mdf).unwrap();
        assert!(json.contains("\"wasteFactor\":0.15"));

        let roundtrip: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(*mdf, roundtrip);
    }

    #[test]
    fn test_transport_serialization() {
        let rule = &SEED_TRANSPORT[0];
        let json = serde_json::to_string(rule).unwrap();
        assert!(json.contains("\"type\":\"Quarter\""));
        assert!(json.contains("\"basePrice\":1000.0"));

        let roundtrip: TransportRule = serde_json::from_str(&json).unwrap();
        assert_eq!(*rule, roundtrip);
    }
}
