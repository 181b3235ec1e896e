//! # quote_core - Exhibition Booth Cost Estimation Engine
//!
//! `quote_core` is the computational heart of ExhibiPrice, pricing
//! exhibition-booth projects from a material catalog and producing
//! client-ready quotation documents. All inputs and outputs are
//! JSON-serializable, so project files round-trip cleanly between the
//! CLI, the store on disk, and external tooling.
//!
//! ## Design Philosophy
//!
//! - **Pure Pricing**: Cost totals are a pure function of project and config
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Invariant-Preserving Store**: Mutations keep projects valid and drafts saved
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_core::config::AppConfig;
//! use quote_core::pricing::compute_totals;
//! use quote_core::project::Project;
//!
//! let config = AppConfig::default();
//! let project = Project::new_draft(&config);
//!
//! // Price the (empty) draft: transport and VAT still apply
//! let totals = compute_totals(&project, &config);
//! println!("grand total: {:.2} EGP", totals.grand_total);
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Projects, component groups, and line items
//! - [`catalog`] - Material library, transport rules, and palettes
//! - [`pricing`] - The cost chain from materials to grand total
//! - [`store`] - In-memory working state over persistent storage
//! - [`storage`] - Persistence backends with atomic saves and locking
//! - [`proposal`] - Quotation document composition and pagination
//! - [`pdf`] - PDF export via Typst
//! - [`suggest`] - Material suggestions from the Gemini API
//! - [`config`] - Application configuration
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod config;
pub mod errors;
pub mod pdf;
pub mod pricing;
pub mod project;
pub mod proposal;
pub mod storage;
pub mod store;
pub mod suggest;

// Re-export commonly used types at crate root for convenience
pub use config::AppConfig;
pub use errors::{EstimateError, EstimateResult};
pub use pricing::{compute_totals, CostTotals};
pub use project::{LineItem, Project, ProjectGroup};
pub use store::ProjectStore;
