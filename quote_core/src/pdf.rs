//! # Proposal PDF Export
//!
//! Renders a composed quotation document to PDF using Typst.
//!
//! ## Architecture
//!
//! - Typst fragments are embedded as string constants
//! - Document data is injected via token replacement before compilation
//! - The compositor's page plan drives slicing, scaling, and centering
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! The document body is rendered once as a fixed-width sheet; each
//! planned page shows a clipped window into that sheet, so page breaks
//! fall at exact millimetre offsets rather than at block boundaries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::config::AppConfig;
//! use quote_core::pdf::write_proposal;
//! use quote_core::project::Project;
//! use quote_core::proposal::paginate::ExportOptions;
//!
//! let project = Project::default();
//! let config = AppConfig::default();
//! let options = ExportOptions::from_project(&project);
//! let path = write_proposal(&project, &config, &options, std::path::Path::new(".")).unwrap();
//! println!("saved {}", path.display());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::config::AppConfig;
use crate::errors::{EstimateError, EstimateResult};
use crate::project::Project;
use crate::proposal::paginate::{
    paginate, ExportOptions, PagePlan, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use crate::proposal::{
    compose, format_money, format_quantity, format_whole, BrandMark, CostBox, HeaderBlock,
    ImagePanel, ProposalDocument, RecipientBlock, SectionBlock, TermsBlock, CLOSING_BLOCK_MM,
    DEFAULT_ACCENT, FOOTER_MM, HEADER_HEIGHT_MM, ITEM_ROW_MM, PANEL_CELL_MM, PANEL_TITLE_MM,
    RECIPIENT_HEIGHT_MM, SECTION_GAP_MM, SECTION_HEADER_MM, SUBTOTAL_ROW_MM, TABLE_HEADER_ROW_MM,
};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    /// Font book
    book: LazyHash<FontBook>,
    /// Available fonts
    fonts: Vec<Font>,
    /// Library (standard functions)
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    /// Bundled fonts from typst-assets. Logo and reference images are
    /// browser-side resources the offline compiler cannot fetch, so the
    /// renderer never needs more than text faces.
    fn load_fonts() -> Vec<Font> {
        let mut fonts = Vec::new();

        for font_bytes in typst_assets::fonts() {
            let buffer = Bytes::new(font_bytes.to_vec());
            for font in Font::iter(buffer) {
                fonts.push(font);
            }
        }

        fonts
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Typst Templates
// ============================================================================

/// Document preamble: page geometry, default face, flush block stacking
const PAGE_SETUP: &str = r##"#set page(width: {{PAGE_WIDTH}}, height: {{PAGE_HEIGHT}}, margin: 0mm)
#set text(font: "Libertinus Serif", size: 9pt)
#set block(spacing: 0mm)
#let accent = rgb("{{ACCENT}}")
"##;

/// Letterhead band: brand mark, contact lines, watermark, metadata table
const HEADER_TEMPLATE: &str = r##"  #block(width: 100%, height: {{HEIGHT}}, clip: true, fill: luma(254))[
    #block(width: 100%, height: 2.5mm, fill: accent)
    #pad(x: 10mm, top: 3.5mm)[
      #grid(
        columns: (1fr, 62mm),
        column-gutter: 6mm,
        [
          #grid(
            columns: (auto, 1fr),
            column-gutter: 4mm,
            align: (horizon, horizon),
            box(width: 12mm, height: 12mm, fill: accent, radius: 2mm)[
              #align(center + horizon)[#text(fill: white, size: 15pt, weight: "bold")[{{BRAND_INITIAL}}]]
            ],
            [
              #text(size: 14pt, weight: "bold")[{{APP_NAME}}] \
              #text(size: 7.5pt, fill: accent, tracking: 0.8pt)[{{TAGLINE}}]
            ],
          )
          #v(2.5mm)
          #text(size: 7.5pt, fill: luma(90))[
            {{ADDRESS}} \
            Website: {{WEBSITE}} \
            Phone: {{PHONE}}
          ]
        ],
        [
          #align(right)[#text(size: 24pt, weight: "bold", fill: luma(228), tracking: 2.5pt)[{{WATERMARK}}]]
          #v(1.5mm)
          #table(
            columns: (auto, 1fr),
            stroke: 0.5pt + luma(200),
            inset: 1.6mm,
            align: (left + horizon, right + horizon),
            [#text(size: 7pt, weight: "bold")[DATE]], [#text(size: 7pt)[{{DATE}}]],
            [#text(size: 7pt, weight: "bold")[QUOTE \#]], [#text(size: 7pt)[{{QUOTE_NUMBER}}]],
            [#text(size: 7pt, weight: "bold")[CUSTOMER ID]], [#text(size: 7pt)[{{CUSTOMER_ID}}]],
            [#text(size: 7pt, weight: "bold")[VALID UNTIL]], [#text(size: 7pt)[{{VALID_UNTIL}}]],
          )
        ],
      )
    ]
  ]
"##;

/// Addressee banner and identification lines
const RECIPIENT_TEMPLATE: &str = r##"  #block(width: 100%, height: {{HEIGHT}}, clip: true)[
    #block(width: 100%, height: 8mm, fill: accent, inset: (x: 10mm))[
      #align(horizon)[#text(fill: white, size: 9pt, weight: "bold", tracking: 1pt)[{{HEADING}}]]
    ]
    #pad(x: 10mm, top: 3mm)[
      #text(size: 11pt, weight: "bold")[{{CLIENT_LINE}}] \
      #text(size: 9pt, fill: luma(60))[{{PROJECT_LINE}}] \
      #text(size: 8pt, fill: luma(120))[{{ADDR1}}] \
      #text(size: 8pt, fill: luma(120))[{{ADDR2}}]
    ]
  ]
"##;

/// One group section: ordinal badge, name, then the priced table (and
/// reference panel when present)
const SECTION_TEMPLATE: &str = r##"  #block(width: 100%, height: {{HEIGHT}}, clip: true, inset: (x: 10mm))[
    #block(width: 100%, height: {{HEADER_HEIGHT}})[
      #align(horizon)[
        #grid(
          columns: (auto, 1fr),
          column-gutter: 3mm,
          align: (horizon, horizon),
          box(width: 7mm, height: 7mm, fill: accent, radius: 1.5mm)[
            #align(center + horizon)[#text(fill: white, size: 10pt, weight: "bold")[{{ORDINAL}}]]
          ],
          text(size: 11pt, weight: "bold")[{{SECTION_NAME}}],
        )
      ]
    ]
    #block(width: 100%, height: {{BODY_HEIGHT}}, clip: true)[
{{BODY}}
    ]
  ]
"##;

const SECTION_TABLE_TEMPLATE: &str = r##"#table(
  columns: (1fr, 24mm, 12mm, 26mm),
  rows: ({{ROWS_TRACK}}),
  inset: (x: 2mm, y: 0mm),
  align: (left + horizon, right + horizon, center + horizon, right + horizon),
  stroke: (bottom: 0.5pt + luma(210)),
  fill: (x, y) => if y == 0 { accent } else if y == {{LAST_ROW}} { luma(240) } else if calc.odd(y) { luma(250) } else { white },
{{CELLS}})
"##;

const PANEL_TEMPLATE: &str = r##"#block(width: 100%, height: {{TITLE_HEIGHT}})[
  #align(horizon)[#text(size: 8pt, weight: "bold", fill: accent, tracking: 1pt)[{{PANEL_TITLE}}]]
]
#grid(
  columns: (1fr, 1fr),
  column-gutter: 2mm,
  row-gutter: 2mm,
{{CELLS}})
"##;

/// Terms with signature area on the left, cost summary box on the right
const CLOSING_TEMPLATE: &str = r##"  #block(width: 100%, height: {{HEIGHT}}, clip: true, inset: (x: 10mm, top: 4mm))[
    #grid(
      columns: (1.3fr, 1fr),
      column-gutter: 8mm,
      [
        #text(size: 10pt, weight: "bold", fill: accent, tracking: 1pt)[{{TERMS_HEADING}}]
        #v(2.5mm)
{{CLAUSES}}
        #v(6mm)
        #text(size: 8pt, weight: "bold")[{{SIGNATURE_CAPTION}}]
        #v(11mm)
        #line(length: 75%, stroke: 0.5pt + luma(120))
        #v(1.5mm)
        #grid(
          columns: (1fr, 1fr),
          [#text(size: 6.5pt, fill: luma(120), tracking: 0.5pt)[{{SIGNATURE_LEFT}}]],
          [#align(right)[#text(size: 6.5pt, fill: luma(120), tracking: 0.5pt)[{{SIGNATURE_RIGHT}}]]],
        )
      ],
      [
        #block(width: 100%, fill: luma(251), stroke: 0.5pt + luma(212), radius: 2mm, inset: 4mm)[
{{COST_ROWS}}
          #v(2mm)
          #block(width: 100%, fill: accent, radius: 1.5mm, inset: 3mm)[
            #text(fill: white, size: 7.5pt, weight: "bold", tracking: 0.8pt)[{{TOTAL_LABEL}}] \
            #align(right)[#text(fill: white, size: 14pt, weight: "bold")[{{GRAND_TOTAL}} {{CURRENCY}}]]
          ]
        ]
      ],
    )
  ]
"##;

const FOOTER_TEMPLATE: &str = r##"  #block(width: 100%, height: {{HEIGHT}}, clip: true, inset: (x: 10mm))[
    #v(3mm)
    #line(length: 100%, stroke: 0.5pt + luma(205))
    #v(2.5mm)
    #grid(
      columns: (1fr, 1fr),
      [#text(size: 7pt, fill: luma(130))[{{FOOTER_LEFT}}]],
      [#align(right)[#text(size: 7pt, fill: luma(130))[{{FOOTER_RIGHT}}]]],
    )
  ]
"##;

/// One output page: a page-sized window clipped out of the sheet at the
/// planned offset, with the planned scale applied
const PAGE_TEMPLATE: &str = r##"#block(width: {{PAGE_WIDTH}}, height: {{PAGE_HEIGHT}}, clip: true)[
  #place(top + left, dx: {{DX}}, dy: -{{DY}})[
    #scale(x: {{SCALE}}%, y: {{SCALE}}%, origin: top + left, reflow: true)[#sheet]
  ]
]
"##;

// ============================================================================
// Source Assembly
// ============================================================================

fn mm(value: f64) -> String {
    format!("{:.3}mm", value)
}

/// Validate a user-supplied accent so a malformed color cannot break
/// compilation.
fn accent_hex(color: &str) -> String {
    match color.strip_prefix('#') {
        Some(hex)
            if (hex.len() == 3 || hex.len() == 6)
                && hex.chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            color.to_string()
        }
        _ => DEFAULT_ACCENT.to_string(),
    }
}

fn header_typst(header: &HeaderBlock) -> String {
    let initial = match &header.brand {
        BrandMark::Initial(initial) => initial.clone(),
        // Raster logos live in the browser store; the offline renderer
        // falls back to a lettermark
        BrandMark::Image(_) => header.app_name.chars().take(1).collect(),
    };

    HEADER_TEMPLATE
        .replace("{{HEIGHT}}", &mm(HEADER_HEIGHT_MM))
        .replace("{{BRAND_INITIAL}}", &escape_typst(&initial.to_uppercase()))
        .replace("{{APP_NAME}}", &escape_typst(&header.app_name))
        .replace("{{TAGLINE}}", &escape_typst(&header.tagline.to_uppercase()))
        .replace("{{ADDRESS}}", &escape_typst(&header.address))
        .replace("{{WEBSITE}}", &escape_typst(&header.website))
        .replace("{{PHONE}}", &escape_typst(&header.phone))
        .replace("{{WATERMARK}}", &escape_typst(&header.watermark))
        .replace("{{DATE}}", &escape_typst(&header.date))
        .replace("{{QUOTE_NUMBER}}", &escape_typst(&header.quote_number))
        .replace("{{CUSTOMER_ID}}", &escape_typst(&header.customer_id))
        .replace("{{VALID_UNTIL}}", &escape_typst(&header.valid_until))
}

fn recipient_typst(recipient: &RecipientBlock) -> String {
    RECIPIENT_TEMPLATE
        .replace("{{HEIGHT}}", &mm(RECIPIENT_HEIGHT_MM))
        .replace("{{HEADING}}", &escape_typst(&recipient.heading))
        .replace("{{CLIENT_LINE}}", &escape_typst(&recipient.client_line))
        .replace("{{PROJECT_LINE}}", &escape_typst(&recipient.project_line))
        .replace("{{ADDR1}}", &escape_typst(&recipient.address_lines[0]))
        .replace("{{ADDR2}}", &escape_typst(&recipient.address_lines[1]))
}

fn section_typst(section: &SectionBlock) -> String {
    let body_height = section.height_mm() - SECTION_HEADER_MM - SECTION_GAP_MM;
    let table = items_table_typst(section);

    let body = match &section.image_panel {
        Some(panel) => format!(
            "#grid(\n  columns: (1fr, 58mm),\n  column-gutter: 4mm,\n  [\n{}\n  ],\n  [\n{}\n  ],\n)",
            table,
            image_panel_typst(panel)
        ),
        None => table,
    };

    SECTION_TEMPLATE
        .replace("{{HEIGHT}}", &mm(section.height_mm()))
        .replace("{{HEADER_HEIGHT}}", &mm(SECTION_HEADER_MM))
        .replace("{{ORDINAL}}", &section.ordinal.to_string())
        .replace("{{SECTION_NAME}}", &escape_typst(&section.name.to_uppercase()))
        .replace("{{BODY_HEIGHT}}", &mm(body_height))
        .replace("{{BODY}}", &body)
}

fn items_table_typst(section: &SectionBlock) -> String {
    let mut rows_track = Vec::with_capacity(section.rows.len() + 2);
    rows_track.push(mm(TABLE_HEADER_ROW_MM));
    for _ in &section.rows {
        rows_track.push(mm(ITEM_ROW_MM));
    }
    rows_track.push(mm(SUBTOTAL_ROW_MM));

    let mut cells = String::new();
    cells.push_str(
        "  [#text(size: 7.5pt, fill: white, weight: \"bold\")[DESCRIPTION OF PRODUCTION ASSET]], \
         [#text(size: 7.5pt, fill: white, weight: \"bold\")[UNIT PRICE]], \
         [#text(size: 7.5pt, fill: white, weight: \"bold\")[QTY]], \
         [#text(size: 7.5pt, fill: white, weight: \"bold\")[TOTAL]],\n",
    );
    for row in &section.rows {
        let marker = if row.thumbnail.is_some() {
            "#box(width: 4.5mm, height: 4.5mm, fill: luma(235), stroke: 0.5pt + luma(200), radius: 0.5mm) "
        } else {
            ""
        };
        cells.push_str(&format!(
            "  [{}#text(size: 8pt)[{}]], [#text(size: 8pt)[{}]], [#text(size: 8pt)[{}]], [#text(size: 8pt, weight: \"bold\")[{}]],\n",
            marker,
            escape_typst(&row.description),
            format_money(row.unit_price),
            format_quantity(row.quantity),
            format_money(row.total),
        ));
    }
    cells.push_str(&format!(
        "  [#text(size: 8pt, weight: \"bold\")[Section Subtotal]], [], [], [#text(size: 8pt, weight: \"bold\")[{}]],\n",
        format_money(section.subtotal),
    ));

    SECTION_TABLE_TEMPLATE
        .replace("{{ROWS_TRACK}}", &rows_track.join(", "))
        .replace("{{LAST_ROW}}", &(section.rows.len() + 1).to_string())
        .replace("{{CELLS}}", &cells)
}

fn image_panel_typst(panel: &ImagePanel) -> String {
    let mut cells = String::new();
    for index in 0..panel.refs.len() {
        cells.push_str(&format!(
            "  box(width: 100%, height: {}, fill: luma(246), stroke: 0.5pt + luma(205), radius: 1mm)[#align(center + horizon)[#text(size: 7pt, fill: luma(120))[{}]]],\n",
            mm(PANEL_CELL_MM - 2.0),
            escape_typst(&ImagePanel::label(index)),
        ));
    }

    PANEL_TEMPLATE
        .replace("{{TITLE_HEIGHT}}", &mm(PANEL_TITLE_MM))
        .replace("{{PANEL_TITLE}}", &escape_typst(&panel.title))
        .replace("{{CELLS}}", &cells)
}

fn closing_typst(terms: &TermsBlock, cost_box: &CostBox) -> String {
    let mut clauses = String::new();
    for (index, clause) in terms.clauses.iter().enumerate() {
        clauses.push_str(&format!(
            "        #grid(columns: (7mm, 1fr), column-gutter: 1.5mm, [#text(size: 7.5pt, weight: \"bold\", fill: accent)[{:02}]], [#text(size: 7.5pt, fill: luma(70))[{}]])\n        #v(1.5mm)\n",
            index + 1,
            escape_typst(clause),
        ));
    }

    let mut cost_rows = String::new();
    for (label, value) in [
        ("Subtotal Assets", cost_box.assets),
        ("Logistic Support", cost_box.logistics),
        ("Internal Overheads", cost_box.internal_overheads),
    ] {
        cost_rows.push_str(&format!(
            "          #grid(columns: (1fr, auto), [#text(size: 8pt, fill: luma(80))[{}]], [#text(size: 8pt)[{}]])\n          #v(1.5mm)\n",
            label,
            format_money(value),
        ));
    }
    cost_rows.push_str(&format!(
        "          #grid(columns: (1fr, auto), [#text(size: 8pt, fill: luma(80))[{}]], [#text(size: 8pt)[{}]])\n          #v(2mm)\n          #line(length: 100%, stroke: 0.5pt + luma(200))\n",
        escape_typst(&cost_box.vat_label),
        format_money(cost_box.vat_amount),
    ));

    CLOSING_TEMPLATE
        .replace("{{HEIGHT}}", &mm(CLOSING_BLOCK_MM))
        .replace("{{TERMS_HEADING}}", &escape_typst(&terms.heading))
        .replace("{{CLAUSES}}", &clauses)
        .replace("{{SIGNATURE_CAPTION}}", &escape_typst(&terms.signature_caption))
        .replace("{{SIGNATURE_LEFT}}", &escape_typst(&terms.signature_left))
        .replace("{{SIGNATURE_RIGHT}}", &escape_typst(&terms.signature_right))
        .replace("{{COST_ROWS}}", &cost_rows)
        .replace("{{TOTAL_LABEL}}", &escape_typst(&cost_box.total_label.to_uppercase()))
        .replace("{{GRAND_TOTAL}}", &format_whole(cost_box.grand_total))
        .replace("{{CURRENCY}}", &escape_typst(&cost_box.currency))
}

fn footer_typst(document: &ProposalDocument) -> String {
    FOOTER_TEMPLATE
        .replace("{{HEIGHT}}", &mm(FOOTER_MM))
        .replace("{{FOOTER_LEFT}}", &escape_typst(&document.footer_left))
        .replace("{{FOOTER_RIGHT}}", &escape_typst(&document.footer_right))
}

/// Assemble the complete Typst source: preamble, the sheet binding,
/// then one clipped window per planned page.
fn build_source(document: &ProposalDocument, plan: &PagePlan) -> String {
    let mut source = PAGE_SETUP
        .replace("{{PAGE_WIDTH}}", &mm(PAGE_WIDTH_MM))
        .replace("{{PAGE_HEIGHT}}", &mm(PAGE_HEIGHT_MM))
        .replace("{{ACCENT}}", &accent_hex(&document.accent_color));

    source.push_str("\n#let sheet = [\n");
    source.push_str(&header_typst(&document.header));
    source.push_str(&recipient_typst(&document.recipient));
    for section in &document.sections {
        source.push_str(&section_typst(section));
    }
    source.push_str(&closing_typst(&document.terms, &document.cost_box));
    source.push_str(&footer_typst(document));
    source.push_str("]\n\n");

    let scale = plan.content_width_mm / PAGE_WIDTH_MM * 100.0;
    let pages: Vec<String> = plan
        .pages
        .iter()
        .map(|slice| {
            PAGE_TEMPLATE
                .replace("{{PAGE_WIDTH}}", &mm(PAGE_WIDTH_MM))
                .replace("{{PAGE_HEIGHT}}", &mm(PAGE_HEIGHT_MM))
                .replace("{{DX}}", &mm(plan.left_offset_mm))
                .replace("{{DY}}", &mm(slice.source_top_mm))
                .replace("{{SCALE}}", &format!("{:.4}", scale))
        })
        .collect();
    source.push_str(&pages.join("#pagebreak()\n"));

    source
}

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Compile a composed document against a page plan and return PDF bytes.
pub fn render_document(document: &ProposalDocument, plan: &PagePlan) -> EstimateResult<Vec<u8>> {
    let source = build_source(document, plan);
    let world = PdfWorld::new(source);

    let warned = typst::compile(&world);

    let compiled = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        let joined = error_msgs.join("; ");
        log::error!("proposal compilation failed: {}", joined);
        EstimateError::pdf_generation(format!("Typst compilation failed: {}", joined))
    })?;

    let pdf_bytes = typst_pdf::pdf(&compiled, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        let joined = error_msgs.join("; ");
        log::error!("pdf rendering failed: {}", joined);
        EstimateError::pdf_generation(format!("PDF rendering failed: {}", joined))
    })?;

    Ok(pdf_bytes)
}

/// Render a project's quotation to PDF bytes.
///
/// Composes the document, plans pages from its natural height and the
/// export options, and compiles the result.
pub fn export_proposal(
    project: &Project,
    config: &AppConfig,
    options: &ExportOptions,
) -> EstimateResult<Vec<u8>> {
    let document = compose(project, config);
    let plan = paginate(document.natural_height_mm(), options);
    render_document(&document, &plan)
}

/// Render a project's quotation and save it under `dir`, returning the
/// full path of the written file.
pub fn write_proposal(
    project: &Project,
    config: &AppConfig,
    options: &ExportOptions,
    dir: &Path,
) -> EstimateResult<PathBuf> {
    let document = compose(project, config);
    let plan = paginate(document.natural_height_mm(), options);
    let bytes = render_document(&document, &plan)?;

    let path = dir.join(document.pdf_file_name(project));
    fs::write(&path, &bytes).map_err(|e| {
        EstimateError::storage_error("write", path.display().to_string(), e.to_string())
    })?;

    Ok(path)
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
