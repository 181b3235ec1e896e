//! # Project Store
//!
//! Owns the canonical in-memory `Project` and applies structural edits
//! while holding the data-model invariants: at least one group at all
//! times, quantities and prices clamped to zero, item totals recomputed
//! on every edit from the current material library.
//!
//! The store also owns the session's persistence lifecycle:
//! - while the project is an unsaved draft (empty id), every mutation
//!   autosaves into the draft slot (failures are logged, not raised)
//! - `commit` upserts into the archive by id and clears the draft slot
//! - `reset` returns to a pristine draft and clears the draft slot
//!
//! The in-editor project always carries the config's current overhead
//! and markup rates; archived records keep the rates stamped at their
//! last commit.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::storage::MemoryStorage;
//! use quote_core::store::ProjectStore;
//!
//! let mut store = ProjectStore::open(MemoryStorage::new());
//! let group_id = store.project().groups[0].id.clone();
//! store.add_item_from_catalog(&group_id, "m1").unwrap();
//! assert_eq!(store.totals().material_subtotal, 977.5);
//! ```

use chrono::Utc;
use log::{debug, warn};

use crate::catalog::{section_color, MaterialCatalog};
use crate::config::AppConfig;
use crate::errors::{EstimateError, EstimateResult};
use crate::pricing::{compute_totals, CostTotals};
use crate::project::{LineItem, Project, ProjectGroup, ProjectType};
use crate::storage::Storage;
use crate::suggest::CandidateItem;

/// Name fallback applied when committing a nameless project
const UNNAMED_PROJECT: &str = "Unnamed Project";

/// Category assigned to line items created from AI suggestions
pub const SUGGESTION_CATEGORY: &str = "AI Recommendation";

/// One editing session over a storage backend.
pub struct ProjectStore<S: Storage> {
    storage: S,
    config: AppConfig,
    catalog: MaterialCatalog,
    archive: Vec<Project>,
    project: Project,
}

impl<S: Storage> ProjectStore<S> {
    /// Open a session: load config, library, and archive, and resume
    /// the autosaved draft if one exists. Corrupt collections fall
    /// back to their defaults with a warning rather than failing the
    /// session.
    pub fn open(storage: S) -> Self {
        let config = match storage.load_config() {
            Ok(Some(config)) => config,
            Ok(None) => AppConfig::default(),
            Err(e) => {
                warn!("Discarding unreadable config, using defaults: {}", e);
                AppConfig::default()
            }
        };

        let catalog = match storage.load_catalog() {
            Ok(Some(catalog)) => catalog,
            Ok(None) => MaterialCatalog::seeded(),
            Err(e) => {
                warn!("Discarding unreadable material library, reseeding: {}", e);
                MaterialCatalog::seeded()
            }
        };

        let archive = match storage.load_archive() {
            Ok(archive) => archive,
            Err(e) => {
                warn!("Discarding unreadable archive: {}", e);
                Vec::new()
            }
        };

        let project = match storage.load_draft() {
            Ok(Some(draft)) => draft,
            Ok(None) => Project::new_draft(&config),
            Err(e) => {
                warn!("Discarding unreadable draft: {}", e);
                Project::new_draft(&config)
            }
        };

        ProjectStore { storage, config, catalog, archive, project }
    }

    // === Read surface ===

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// Archived projects, in commit order
    pub fn archive(&self) -> &[Project] {
        &self.archive
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Price the current project under the current config.
    pub fn totals(&self) -> CostTotals {
        compute_totals(&self.project, &self.config)
    }

    // === Project metadata ===

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project.name = name.into();
        self.autosave_draft();
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.project.client_name = name.into();
        self.autosave_draft();
    }

    pub fn set_project_type(&mut self, project_type: ProjectType) {
        self.project.project_type = project_type;
        self.autosave_draft();
    }

    pub fn set_dimensions(&mut self, l: f64, w: f64, h: f64) {
        self.project.dimensions.l = l;
        self.project.dimensions.w = w;
        self.project.dimensions.h = h;
        self.autosave_draft();
    }

    pub fn set_transport(&mut self, transport_id: impl Into<String>) {
        self.project.selected_transport = transport_id.into();
        self.autosave_draft();
    }

    pub fn set_proposal_date(&mut self, date: impl Into<String>) {
        self.project.proposal_date = Some(date.into());
        self.autosave_draft();
    }

    pub fn set_proposal_id(&mut self, proposal_id: impl Into<String>) {
        self.project.proposal_id = Some(proposal_id.into());
        self.autosave_draft();
    }

    pub fn set_valid_until(&mut self, valid_until: impl Into<String>) {
        self.project.valid_until = Some(valid_until.into());
        self.autosave_draft();
    }

    pub fn set_primary_color(&mut self, color: impl Into<String>) {
        self.project.primary_color = Some(color.into());
        self.autosave_draft();
    }

    pub fn set_fit_to_page(&mut self, fit: bool) {
        self.project.fit_to_page = Some(fit);
        self.autosave_draft();
    }

    pub fn set_scale_percent(&mut self, percent: f64) {
        self.project.scale_percent = Some(percent);
        self.autosave_draft();
    }

    // === Group operations ===

    /// Append an empty group with an auto-assigned accent, returning
    /// its id. Accents cycle through the section palette so sibling
    /// groups stay visually distinct.
    pub fn add_group(&mut self) -> String {
        let ordinal = self.project.groups.len();
        let name = format!("New Component {}", ordinal + 1);
        let group = ProjectGroup::new(name, section_color(ordinal));
        let id = group.id.clone();
        self.project.groups.push(group);
        debug!("added group {}", id);
        self.autosave_draft();
        id
    }

    /// Remove a group and everything in it. Removing the last
    /// remaining group is a silent no-op.
    pub fn remove_group(&mut self, group_id: &str) -> EstimateResult<()> {
        if self.project.groups.len() <= 1 {
            return Ok(());
        }
        if self.project.find_group(group_id).is_none() {
            return Err(EstimateError::group_not_found(group_id));
        }
        self.project.groups.retain(|g| g.id != group_id);
        debug!("removed group {}", group_id);
        self.autosave_draft();
        Ok(())
    }

    pub fn rename_group(&mut self, group_id: &str, name: impl Into<String>) -> EstimateResult<()> {
        let group = self.require_group(group_id)?;
        group.name = name.into();
        self.autosave_draft();
        Ok(())
    }

    pub fn set_group_color(&mut self, group_id: &str, color: impl Into<String>) -> EstimateResult<()> {
        let group = self.require_group(group_id)?;
        group.header_color = Some(color.into());
        self.autosave_draft();
        Ok(())
    }

    // === Item operations ===

    /// Add one item from the material library, returning the new item
    /// id. Quantity defaults to 1 and the total prices in the
    /// material's waste factor.
    pub fn add_item_from_catalog(
        &mut self,
        group_id: &str,
        material_id: &str,
    ) -> EstimateResult<String> {
        let material = self.catalog.find(material_id).cloned().ok_or_else(|| {
            EstimateError::invalid_input(
                "materialId",
                material_id,
                "No such material in the library",
            )
        })?;

        let group = self.require_group(group_id)?;
        let item = LineItem::from_material(&material);
        let id = item.id.clone();
        group.items.push(item);
        debug!("added item {} to group {}", id, group_id);
        self.autosave_draft();
        Ok(id)
    }

    /// Add an ad-hoc item (no library backing, price 0), returning the
    /// new item id.
    pub fn add_custom_item(
        &mut self,
        group_id: &str,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> EstimateResult<String> {
        let group = self.require_group(group_id)?;
        let item = LineItem::custom(name, quantity, unit, "Custom");
        let id = item.id.clone();
        group.items.push(item);
        debug!("added custom item {} to group {}", id, group_id);
        self.autosave_draft();
        Ok(id)
    }

    /// Add every selected material as its own line item, in library
    /// order regardless of selection order. Unknown ids are skipped.
    /// Returns the number of items added.
    pub fn add_items_bulk(&mut self, group_id: &str, material_ids: &[String]) -> EstimateResult<usize> {
        let selected: Vec<LineItem> = self
            .catalog
            .materials
            .iter()
            .filter(|m| material_ids.iter().any(|id| id == &m.id))
            .map(LineItem::from_material)
            .collect();

        let group = self.require_group(group_id)?;
        let added = selected.len();
        group.items.extend(selected);
        debug!("added {} items to group {}", added, group_id);
        self.autosave_draft();
        Ok(added)
    }

    /// Set an item's quantity, clamped to >= 0, and recompute its
    /// total with the waste factor the library currently holds for
    /// its material.
    pub fn update_item_quantity(
        &mut self,
        group_id: &str,
        item_id: &str,
        quantity: f64,
    ) -> EstimateResult<()> {
        let group = self
            .project
            .find_group_mut(group_id)
            .ok_or_else(|| EstimateError::group_not_found(group_id))?;
        let item = group
            .find_item_mut(item_id)
            .ok_or_else(|| EstimateError::item_not_found(group_id, item_id))?;

        item.quantity = quantity.max(0.0);
        let waste = self.catalog.waste_factor_for(&item.material_id);
        item.recompute_total(waste);
        self.autosave_draft();
        Ok(())
    }

    /// Set an item's unit price, clamped to >= 0, and recompute its
    /// total with the current waste factor.
    pub fn update_item_price(
        &mut self,
        group_id: &str,
        item_id: &str,
        price: f64,
    ) -> EstimateResult<()> {
        let group = self
            .project
            .find_group_mut(group_id)
            .ok_or_else(|| EstimateError::group_not_found(group_id))?;
        let item = group
            .find_item_mut(item_id)
            .ok_or_else(|| EstimateError::item_not_found(group_id, item_id))?;

        item.unit_price = price.max(0.0);
        let waste = self.catalog.waste_factor_for(&item.material_id);
        item.recompute_total(waste);
        self.autosave_draft();
        Ok(())
    }

    /// Rename an item without touching its total or category.
    pub fn update_item_name(
        &mut self,
        group_id: &str,
        item_id: &str,
        name: impl Into<String>,
    ) -> EstimateResult<()> {
        let item = self.require_item(group_id, item_id)?;
        item.name = name.into();
        self.autosave_draft();
        Ok(())
    }

    pub fn remove_item(&mut self, group_id: &str, item_id: &str) -> EstimateResult<()> {
        let group = self.require_group(group_id)?;
        if group.find_item(item_id).is_none() {
            return Err(EstimateError::item_not_found(group_id, item_id));
        }
        group.items.retain(|item| item.id != item_id);
        debug!("removed item {} from group {}", item_id, group_id);
        self.autosave_draft();
        Ok(())
    }

    // === Reference images ===

    /// Append a reference image to a group's visual panel.
    pub fn add_group_image(&mut self, group_id: &str, image_data: impl Into<String>) -> EstimateResult<()> {
        let group = self.require_group(group_id)?;
        group.image_refs.push(image_data.into());
        self.autosave_draft();
        Ok(())
    }

    /// Remove a reference image by index. Out-of-range indexes are
    /// ignored.
    pub fn remove_group_image(&mut self, group_id: &str, index: usize) -> EstimateResult<()> {
        let group = self.require_group(group_id)?;
        if index < group.image_refs.len() {
            group.image_refs.remove(index);
            self.autosave_draft();
        }
        Ok(())
    }

    /// Attach or replace the single thumbnail on one line item.
    pub fn set_item_image(
        &mut self,
        group_id: &str,
        item_id: &str,
        image_data: impl Into<String>,
    ) -> EstimateResult<()> {
        let item = self.require_item(group_id, item_id)?;
        item.image_ref = Some(image_data.into());
        self.autosave_draft();
        Ok(())
    }

    // === Suggestions ===

    /// Append AI candidate items to a group: price 0, quantity from
    /// the candidate, category "AI Recommendation". Returns the number
    /// of items added (an empty candidate list adds nothing).
    pub fn apply_suggestions(
        &mut self,
        group_id: &str,
        candidates: &[CandidateItem],
    ) -> EstimateResult<usize> {
        let group = self.require_group(group_id)?;
        for candidate in candidates {
            group.items.push(LineItem::custom(
                candidate.name.clone(),
                candidate.quantity,
                candidate.unit.clone(),
                SUGGESTION_CATEGORY,
            ));
        }
        if !candidates.is_empty() {
            debug!("applied {} suggestions to group {}", candidates.len(), group_id);
            self.autosave_draft();
        }
        Ok(candidates.len())
    }

    // === Lifecycle ===

    /// Commit the current project to the archive and clear the draft
    /// slot. Assigns an id on first commit; later commits replace the
    /// matching archive entry (upsert by id, never a duplicate).
    ///
    /// Commit stamps the config's current rates and document defaults
    /// into the record so archived proposals reprice consistently.
    pub fn commit(&mut self) -> EstimateResult<String> {
        if self.project.name.is_empty() {
            self.project.name = UNNAMED_PROJECT.to_string();
        }
        if self.project.is_draft() {
            self.project.id = Utc::now().timestamp_millis().to_string();
        }

        self.project.labor_days = 0.0;
        self.project.accommodation_per_day = 0.0;
        self.project.markup = self.config.default_markup;
        self.project.overhead = self.config.default_overhead;
        self.project.payment_terms = Some(self.config.default_payment_terms.clone());
        self.project.validity_period = Some(self.config.default_validity_period.clone());
        self.project.notes = Some(self.config.default_terms.clone());
        self.project.valid_until = None;

        let id = self.project.id.clone();
        match self.archive.iter_mut().find(|p| p.id == id) {
            Some(entry) => *entry = self.project.clone(),
            None => self.archive.push(self.project.clone()),
        }

        self.storage.save_archive(&self.archive)?;
        self.storage.clear_draft()?;
        debug!("committed project {} ({})", id, self.project.name);
        Ok(id)
    }

    /// Discard the current project for a pristine draft and clear the
    /// draft slot.
    pub fn reset(&mut self) -> EstimateResult<()> {
        self.project = Project::new_draft(&self.config);
        self.storage.clear_draft()
    }

    /// Load an archived project into the editor. The record keeps its
    /// archive id, so later edits do not autosave as a draft; the
    /// editing copy picks up the config's current rates.
    pub fn open_archived(&mut self, project_id: &str) -> EstimateResult<()> {
        let found = self
            .archive
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| EstimateError::project_not_found(project_id))?;
        self.project = found.clone();
        self.project.markup = self.config.default_markup;
        self.project.overhead = self.config.default_overhead;
        debug!("opened archived project {}", project_id);
        Ok(())
    }

    /// Start a fresh draft from an archived project: cleared id and
    /// client, " (Copy)" name suffix, today's date, no proposal
    /// number.
    pub fn new_project_from(&mut self, project_id: &str) -> EstimateResult<()> {
        let found = self
            .archive
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| EstimateError::project_not_found(project_id))?;
        self.project = found.duplicate_as_draft();
        self.project.markup = self.config.default_markup;
        self.project.overhead = self.config.default_overhead;
        self.autosave_draft();
        Ok(())
    }

    /// Permanently remove an archived project.
    pub fn delete_archived(&mut self, project_id: &str) -> EstimateResult<()> {
        let before = self.archive.len();
        self.archive.retain(|p| p.id != project_id);
        if self.archive.len() == before {
            return Err(EstimateError::project_not_found(project_id));
        }
        debug!("deleted archived project {}", project_id);
        self.storage.save_archive(&self.archive)
    }

    // === Config and library ===

    /// Replace and persist the config. The in-editor project picks up
    /// the new default rates immediately.
    pub fn update_config(&mut self, config: AppConfig) -> EstimateResult<()> {
        self.config = config;
        self.project.markup = self.config.default_markup;
        self.project.overhead = self.config.default_overhead;
        self.storage.save_config(&self.config)?;
        self.autosave_draft();
        Ok(())
    }

    /// Replace and persist the material library. Existing item totals
    /// are untouched; the next quantity or price edit reprices against
    /// the new waste factors.
    pub fn update_catalog(&mut self, catalog: MaterialCatalog) -> EstimateResult<()> {
        self.catalog = catalog;
        self.storage.save_catalog(&self.catalog)
    }

    // === Internals ===

    fn require_group(&mut self, group_id: &str) -> EstimateResult<&mut ProjectGroup> {
        self.project
            .find_group_mut(group_id)
            .ok_or_else(|| EstimateError::group_not_found(group_id))
    }

    fn require_item(&mut self, group_id: &str, item_id: &str) -> EstimateResult<&mut LineItem> {
        self.project
            .find_group_mut(group_id)
            .ok_or_else(|| EstimateError::group_not_found(group_id))?
            .find_item_mut(item_id)
            .ok_or_else(|| EstimateError::item_not_found(group_id, item_id))
    }

    /// Persist the draft slot after a mutation while unsaved. Autosave
    /// failures must not fail the edit itself.
    fn autosave_draft(&mut self) {
        if self.project.is_draft() {
            if let Err(e) = self.storage.save_draft(&self.project) {
                warn!("Draft autosave failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const EPS: f64 = 1e-9;

    fn open_store() -> ProjectStore<MemoryStorage> {
        ProjectStore::open(MemoryStorage::new())
    }

    fn first_group_id(store: &ProjectStore<MemoryStorage>) -> String {
        store.project().groups[0].id.clone()
    }

    #[test]
    fn test_open_with_empty_storage() {
        let store = open_store();
        assert!(store.project().is_draft());
        assert_eq!(store.project().groups.len(), 1);
        assert_eq!(store.catalog().materials.len(), 9);
        assert!(store.archive().is_empty());
    }

    #[test]
    fn test_open_resumes_draft() {
        let mut storage = MemoryStorage::new();
        let mut draft = Project::default();
        draft.client_name = "Acme GmbH".to_string();
        storage.save_draft(&draft).unwrap();

        let store = ProjectStore::open(storage);
        assert_eq!(store.project().client_name, "Acme GmbH");
    }

    #[test]
    fn test_add_group_cycles_palette() {
        let mut store = open_store();
        store.set_project_type(ProjectType::Bundle);

        let second = store.add_group();
        let third = store.add_group();

        let groups = &store.project().groups;
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].id, second);
        assert_eq!(groups[1].name, "New Component 2");
        assert_eq!(groups[1].header_color.as_deref(), Some("#7c3aed"));
        assert_eq!(groups[2].id, third);
        assert_eq!(groups[2].name, "New Component 3");
        assert_eq!(groups[2].header_color.as_deref(), Some("#db2777"));
    }

    #[test]
    fn test_remove_last_group_is_a_noop() {
        let mut store = open_store();
        let group_id = first_group_id(&store);

        store.remove_group(&group_id).unwrap();
        assert_eq!(store.project().groups.len(), 1);
    }

    #[test]
    fn test_remove_group() {
        let mut store = open_store();
        store.set_project_type(ProjectType::Bundle);
        let second = store.add_group();

        store.remove_group(&second).unwrap();
        assert_eq!(store.project().groups.len(), 1);

        // Back at one group: even an unknown id is the silent no-op
        assert!(store.remove_group("nope").is_ok());

        store.add_group();
        let err = store.remove_group("nope").unwrap_err();
        assert_eq!(err.error_code(), "GROUP_NOT_FOUND");
    }

    #[test]
    fn test_min_group_invariant_over_sequences() {
        let mut store = open_store();
        store.set_project_type(ProjectType::Bundle);
        let ids: Vec<String> = (0..3).map(|_| store.add_group()).collect();

        for id in ids.iter().chain(std::iter::once(&first_group_id(&store))) {
            let _ = store.remove_group(id);
        }
        assert!(!store.project().groups.is_empty());
    }

    #[test]
    fn test_add_item_from_catalog() {
        let mut store = open_store();
        let group_id = first_group_id(&store);

        let item_id = store.add_item_from_catalog(&group_id, "m1").unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        assert_eq!(item.name, "MDF 18mm");
        assert_eq!(item.quantity, 1.0);
        assert!((item.total - 977.5).abs() < EPS);

        let err = store.add_item_from_catalog(&group_id, "m99").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = store.add_item_from_catalog("nope", "m1").unwrap_err();
        assert_eq!(err.error_code(), "GROUP_NOT_FOUND");
    }

    #[test]
    fn test_bulk_add_follows_library_order() {
        let mut store = open_store();
        let group_id = first_group_id(&store);

        // Selection order reversed relative to the library
        let selection = vec!["m4".to_string(), "m1".to_string(), "m99".to_string()];
        let added = store.add_items_bulk(&group_id, &selection).unwrap();
        assert_eq!(added, 2);

        let items = &store.project().groups[0].items;
        assert_eq!(items[0].material_id, "m1");
        assert_eq!(items[1].material_id, "m4");
    }

    #[test]
    fn test_bulk_items_are_independent() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        store
            .add_items_bulk(&group_id, &["m1".to_string(), "m1".to_string()])
            .unwrap();

        // Duplicate selection adds once per library entry
        assert_eq!(store.project().groups[0].items.len(), 1);

        store
            .add_items_bulk(&group_id, &["m2".to_string()])
            .unwrap();
        let first = store.project().groups[0].items[0].id.clone();
        store.update_item_quantity(&group_id, &first, 5.0).unwrap();

        let items = &store.project().groups[0].items;
        assert_eq!(items[0].quantity, 5.0);
        assert_eq!(items[1].quantity, 1.0);
    }

    #[test]
    fn test_quantity_and_price_clamping() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        let item_id = store.add_item_from_catalog(&group_id, "m1").unwrap();

        store.update_item_quantity(&group_id, &item_id, -3.0).unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        assert_eq!(item.quantity, 0.0);
        assert_eq!(item.total, 0.0);

        store.update_item_quantity(&group_id, &item_id, 3.0).unwrap();
        store.update_item_price(&group_id, &item_id, -10.0).unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.total, 0.0);

        store.update_item_price(&group_id, &item_id, 850.0).unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        // 3 * 850 * 1.15
        assert!((item.total - 2932.5).abs() < EPS);
    }

    #[test]
    fn test_waste_resolves_from_current_library() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        let item_id = store.add_item_from_catalog(&group_id, "m1").unwrap();

        // Drop m1 from the library, then reprice
        let mut catalog = store.catalog().clone();
        catalog.materials.retain(|m| m.id != "m1");
        store.update_catalog(catalog).unwrap();

        store.update_item_quantity(&group_id, &item_id, 2.0).unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        // Waste factor now unresolved -> 0
        assert!((item.total - 1700.0).abs() < EPS);
    }

    #[test]
    fn test_rename_item_keeps_total_and_category() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        let item_id = store.add_item_from_catalog(&group_id, "m1").unwrap();

        store
            .update_item_name(&group_id, &item_id, "Back Wall Panel")
            .unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        assert_eq!(item.name, "Back Wall Panel");
        assert_eq!(item.category, "Wood");
        assert!((item.total - 977.5).abs() < EPS);
    }

    #[test]
    fn test_remove_item() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        let item_id = store.add_item_from_catalog(&group_id, "m1").unwrap();

        store.remove_item(&group_id, &item_id).unwrap();
        assert!(store.project().groups[0].items.is_empty());

        let err = store.remove_item(&group_id, &item_id).unwrap_err();
        assert_eq!(err.error_code(), "ITEM_NOT_FOUND");
    }

    #[test]
    fn test_group_images() {
        let mut store = open_store();
        let group_id = first_group_id(&store);

        store.add_group_image(&group_id, "data:image/png;base64,AAA").unwrap();
        store.add_group_image(&group_id, "data:image/png;base64,BBB").unwrap();
        assert_eq!(store.project().groups[0].image_refs.len(), 2);

        store.remove_group_image(&group_id, 0).unwrap();
        assert_eq!(store.project().groups[0].image_refs[0], "data:image/png;base64,BBB");

        // Out of range is ignored
        store.remove_group_image(&group_id, 5).unwrap();
        assert_eq!(store.project().groups[0].image_refs.len(), 1);
    }

    #[test]
    fn test_item_image_attach_and_replace() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        let item_id = store.add_item_from_catalog(&group_id, "m1").unwrap();

        store.set_item_image(&group_id, &item_id, "ref-a").unwrap();
        store.set_item_image(&group_id, &item_id, "ref-b").unwrap();
        let item = store.project().groups[0].find_item(&item_id).unwrap();
        assert_eq!(item.image_ref.as_deref(), Some("ref-b"));
    }

    #[test]
    fn test_apply_suggestions() {
        let mut store = open_store();
        let group_id = first_group_id(&store);

        let candidates = vec![
            CandidateItem {
                name: "Honeycomb Back Wall".to_string(),
                quantity: 4.0,
                unit: "panel".to_string(),
                reason: Some("Covers the 3m back span".to_string()),
            },
            CandidateItem {
                name: "LED Strip".to_string(),
                quantity: 12.0,
                unit: "m".to_string(),
                reason: None,
            },
        ];

        let added = store.apply_suggestions(&group_id, &candidates).unwrap();
        assert_eq!(added, 2);

        let items = &store.project().groups[0].items;
        assert_eq!(items[0].category, SUGGESTION_CATEGORY);
        assert_eq!(items[0].quantity, 4.0);
        assert_eq!(items[0].unit_price, 0.0);
        assert_eq!(items[1].name, "LED Strip");

        // A failed suggestion run surfaces as an empty candidate list
        let added = store.apply_suggestions(&group_id, &[]).unwrap();
        assert_eq!(added, 0);
        assert_eq!(store.project().groups[0].items.len(), 2);
    }

    #[test]
    fn test_draft_autosave_on_mutation() {
        let mut store = open_store();
        assert!(!store.storage().has_draft());

        store.set_client_name("Acme GmbH");
        assert!(store.storage().has_draft());
    }

    #[test]
    fn test_commit_assigns_id_and_stamps_defaults() {
        let mut store = open_store();
        let group_id = first_group_id(&store);
        store.add_item_from_catalog(&group_id, "m1").unwrap();

        let id = store.commit().unwrap();
        assert!(!id.is_empty());
        assert!(!store.project().is_draft());
        assert_eq!(store.project().name, "Unnamed Project");
        assert_eq!(store.project().markup, 0.25);
        assert_eq!(store.project().overhead, 0.10);
        assert_eq!(
            store.project().payment_terms.as_deref(),
            Some("50% Down Payment, 50% on Delivery")
        );
        assert_eq!(store.archive().len(), 1);
        // Draft slot is cleared by the commit
        assert!(!store.storage().has_draft());
    }

    #[test]
    fn test_commit_upserts_by_id() {
        let mut store = open_store();
        store.set_project_name("Tech Expo Stand");
        let id = store.commit().unwrap();

        store.set_client_name("Acme GmbH");
        let second_id = store.commit().unwrap();

        assert_eq!(id, second_id);
        assert_eq!(store.archive().len(), 1);
        assert_eq!(store.archive()[0].client_name, "Acme GmbH");
    }

    #[test]
    fn test_reset_returns_to_pristine_draft() {
        let mut store = open_store();
        store.set_client_name("Acme GmbH");
        assert!(store.storage().has_draft());

        store.reset().unwrap();
        assert!(store.project().is_draft());
        assert_eq!(store.project().client_name, "");
        assert_eq!(store.project().groups.len(), 1);
        assert!(!store.storage().has_draft());
    }

    #[test]
    fn test_open_archived() {
        let mut store = open_store();
        store.set_project_name("Tech Expo Stand");
        let id = store.commit().unwrap();
        store.reset().unwrap();

        store.open_archived(&id).unwrap();
        assert_eq!(store.project().name, "Tech Expo Stand");
        assert!(!store.project().is_draft());

        // Edits to an archived project do not autosave as a draft
        store.set_client_name("Acme GmbH");
        assert!(!store.storage().has_draft());

        let err = store.open_archived("nope").unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_new_project_from_archived() {
        let mut store = open_store();
        store.set_project_name("Tech Expo Stand");
        store.set_client_name("Acme GmbH");
        let id = store.commit().unwrap();

        store.new_project_from(&id).unwrap();
        assert!(store.project().is_draft());
        assert_eq!(store.project().name, "Tech Expo Stand (Copy)");
        assert_eq!(store.project().client_name, "");
        assert!(store.project().proposal_id.is_none());
        assert!(store.storage().has_draft());
    }

    #[test]
    fn test_delete_archived() {
        let mut store = open_store();
        let id = store.commit().unwrap();

        store.delete_archived(&id).unwrap();
        assert!(store.archive().is_empty());

        let err = store.delete_archived(&id).unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_update_config_restamps_editor_rates() {
        let mut store = open_store();
        let mut config = store.config().clone();
        config.default_markup = 0.30;
        store.update_config(config).unwrap();

        assert_eq!(store.project().markup, 0.30);
        let group_id = first_group_id(&store);
        store.add_item_from_catalog(&group_id, "m1").unwrap();
        let totals = store.totals();
        // Profit now uses the updated rate
        let expected = (totals.direct_costs + totals.overhead_amount) * 0.30;
        assert!((totals.profit_amount - expected).abs() < EPS);
    }
}
