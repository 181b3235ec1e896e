//! # Page Planning
//!
//! Turns a composed document's natural size into a deterministic page
//! plan for A4 portrait output.
//!
//! The document renders at a fixed 210mm width; the manual zoom is
//! applied uniformly to both axes first. In fit-to-page mode the
//! content is rescaled by `min(210/w, 297/h)` onto exactly one page,
//! compressed vertically if needed, never truncated. Otherwise the
//! tall strip is sliced into successive 297mm segments, one page per
//! segment, with the last page holding the shorter remainder. Every
//! page centers the content horizontally.

use serde::Serialize;

use crate::project::Project;

/// A4 portrait page width in millimeters
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 portrait page height in millimeters
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Manual zoom bounds, in percent
pub const MIN_SCALE_PERCENT: f64 = 10.0;
pub const MAX_SCALE_PERCENT: f64 = 200.0;

/// Layout controls for one export run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub fit_to_page: bool,
    /// Manual zoom; values outside 10-200 are clamped before use
    pub scale_percent: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { fit_to_page: false, scale_percent: 100.0 }
    }
}

impl ExportOptions {
    /// Read the layout preferences saved on a project, with the
    /// defaults (no fit, 100%) for unset fields.
    pub fn from_project(project: &Project) -> Self {
        ExportOptions {
            fit_to_page: project.fit_to_page.unwrap_or(false),
            scale_percent: project.scale_percent.unwrap_or(100.0),
        }
    }
}

/// One page's slice of the rendered content strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSlice {
    /// Vertical offset into the rendered content, in mm
    pub source_top_mm: f64,
    /// Visible height on this page, at most the page height
    pub height_mm: f64,
}

/// Complete page plan for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePlan {
    /// Rendered content width after all scaling, in mm
    pub content_width_mm: f64,
    /// Rendered content height after all scaling, in mm
    pub content_height_mm: f64,
    /// Horizontal offset centering the content on the page
    pub left_offset_mm: f64,
    /// Whether fit-to-page collapsed the document onto one page
    pub fitted: bool,
    pub pages: Vec<PageSlice>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn clamp_scale(percent: f64) -> f64 {
    percent.clamp(MIN_SCALE_PERCENT, MAX_SCALE_PERCENT)
}

/// Plan pages for content of the given natural height at 210mm width.
///
/// No content is ever dropped: outside fit mode the slice heights sum
/// to the full scaled height, and in fit mode the whole strip lands on
/// the single page.
pub fn paginate(natural_height_mm: f64, options: &ExportOptions) -> PagePlan {
    let manual = clamp_scale(options.scale_percent) / 100.0;
    let mut width = PAGE_WIDTH_MM * manual;
    let mut height = natural_height_mm * manual;

    if options.fit_to_page {
        // Applied unconditionally: with a manual downscale in effect
        // this can enlarge short content back toward the page bounds.
        let fit = (PAGE_WIDTH_MM / width).min(PAGE_HEIGHT_MM / height);
        if fit.is_finite() {
            width *= fit;
            height *= fit;
        }

        return PagePlan {
            content_width_mm: width,
            content_height_mm: height,
            left_offset_mm: (PAGE_WIDTH_MM - width) / 2.0,
            fitted: true,
            pages: vec![PageSlice { source_top_mm: 0.0, height_mm: height }],
        };
    }

    let mut pages = Vec::new();
    let mut top = 0.0;
    while top < height {
        pages.push(PageSlice {
            source_top_mm: top,
            height_mm: (height - top).min(PAGE_HEIGHT_MM),
        });
        top += PAGE_HEIGHT_MM;
    }
    // Degenerate content still yields one page
    if pages.is_empty() {
        pages.push(PageSlice { source_top_mm: 0.0, height_mm: height });
    }

    PagePlan {
        content_width_mm: width,
        content_height_mm: height,
        left_offset_mm: (PAGE_WIDTH_MM - width) / 2.0,
        fitted: false,
        pages,
    }
}
