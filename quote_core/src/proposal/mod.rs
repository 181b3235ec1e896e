//! # Proposal Compositor
//!
//! Lays a priced project out as a quotation document: a fixed block
//! sequence of header, recipient, one section per group, terms with
//! signature area, the cost summary box, and a footer line. The
//! composed model is pure data; rendering and pagination consume it.
//!
//! Composition is deterministic: the same project and config always
//! produce the same document, including the derived fallback strings
//! (placeholder quote number, customer id from the client name, the
//! validity fallback).
//!
//! ## Block Order
//!
//! ```text
//! header      brand mark, company contact, metadata table
//! recipient   client and project identification
//! sections    per group: items table + optional reference visuals
//! terms       numbered clauses + acceptance signature
//! cost box    assets / logistics / overheads / VAT / grand total
//! footer      verification line + copyright
//! ```

pub mod paginate;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::config::AppConfig;
use crate::pricing::compute_totals;
use crate::project::{Project, ProjectGroup};

/// Accent used when the project carries no primary color
pub const DEFAULT_ACCENT: &str = "#34548a";
/// Currency every amount is quoted in
pub const CURRENCY: &str = "EGP";

const TAGLINE: &str = "Official Quotation Document";
const WATERMARK: &str = "QUOTE";
const FALLBACK_QUOTE_NUMBER: &str = "[123456]";
const FALLBACK_VALID_UNTIL: &str = "30 Days from issue";

// Deterministic layout metrics, in mm at 210mm page width. The
// renderer emits blocks at exactly these heights, so the natural
// height the page planner slices matches the rendered document.
pub(crate) const HEADER_HEIGHT_MM: f64 = 58.0;
pub(crate) const RECIPIENT_HEIGHT_MM: f64 = 34.0;
pub(crate) const SECTION_HEADER_MM: f64 = 13.0;
pub(crate) const TABLE_HEADER_ROW_MM: f64 = 9.0;
pub(crate) const ITEM_ROW_MM: f64 = 8.0;
pub(crate) const SUBTOTAL_ROW_MM: f64 = 9.0;
pub(crate) const SECTION_GAP_MM: f64 = 12.0;
pub(crate) const PANEL_TITLE_MM: f64 = 9.0;
pub(crate) const PANEL_CELL_MM: f64 = 24.0;
pub(crate) const CLOSING_BLOCK_MM: f64 = 104.0;
pub(crate) const FOOTER_MM: f64 = 18.0;

/// Brand presentation in the header: an image reference, or a short
/// initial rendered as a lettermark.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum BrandMark {
    Image(String),
    Initial(String),
}

/// Top-of-document block: identity, contact, and the metadata table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBlock {
    pub brand: BrandMark,
    pub app_name: String,
    pub tagline: String,
    pub address: String,
    pub website: String,
    pub phone: String,
    pub watermark: String,
    pub date: String,
    pub quote_number: String,
    pub customer_id: String,
    pub valid_until: String,
}

/// Who the quotation is addressed to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientBlock {
    pub heading: String,
    pub client_line: String,
    pub project_line: String,
    pub address_lines: [String; 2],
}

/// One priced row in a section table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub description: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub total: f64,
    pub thumbnail: Option<String>,
}

/// Reference-visual grid beside a section's table. Only present when
/// the group actually has images.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePanel {
    pub title: String,
    pub refs: Vec<String>,
}

impl ImagePanel {
    /// Cell label for the image at `index`
    pub fn label(index: usize) -> String {
        format!("REF #{}", index + 1)
    }
}

/// One group rendered as a numbered section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBlock {
    /// 1-based position badge
    pub ordinal: usize,
    pub name: String,
    pub rows: Vec<ItemRow>,
    pub subtotal: f64,
    pub image_panel: Option<ImagePanel>,
}

impl SectionBlock {
    pub(crate) fn height_mm(&self) -> f64 {
        let table = TABLE_HEADER_ROW_MM + self.rows.len() as f64 * ITEM_ROW_MM + SUBTOTAL_ROW_MM;
        let panel = match &self.image_panel {
            Some(panel) => {
                let grid_rows = (panel.refs.len() + 1) / 2;
                PANEL_TITLE_MM + grid_rows as f64 * PANEL_CELL_MM
            }
            None => 0.0,
        };
        SECTION_HEADER_MM + table.max(panel) + SECTION_GAP_MM
    }
}

/// Numbered conditions plus the acceptance signature area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsBlock {
    pub heading: String,
    pub clauses: Vec<String>,
    pub signature_caption: String,
    pub signature_left: String,
    pub signature_right: String,
}

/// The emphasized cost summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBox {
    pub assets: f64,
    pub logistics: f64,
    /// Overhead and profit presented as one line
    pub internal_overheads: f64,
    pub vat_label: String,
    pub vat_amount: f64,
    pub total_label: String,
    pub grand_total: f64,
    pub currency: String,
}

/// The fully composed quotation document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDocument {
    pub accent_color: String,
    pub header: HeaderBlock,
    pub recipient: RecipientBlock,
    pub sections: Vec<SectionBlock>,
    pub terms: TermsBlock,
    pub cost_box: CostBox,
    pub footer_left: String,
    pub footer_right: String,
}

impl ProposalDocument {
    /// Natural rendered height at 210mm width, before any scaling.
    pub fn natural_height_mm(&self) -> f64 {
        HEADER_HEIGHT_MM
            + RECIPIENT_HEIGHT_MM
            + self.sections.iter().map(SectionBlock::height_mm).sum::<f64>()
            + CLOSING_BLOCK_MM
            + FOOTER_MM
    }

    /// File name the exported PDF is saved under
    pub fn pdf_file_name(&self, project: &Project) -> String {
        let name = non_empty(Some(project.name.as_str())).unwrap_or("Pro");
        format!("Quotation_{}_{}.pdf", name, self.header.quote_number)
    }
}

/// Compose the document for a priced project.
pub fn compose(project: &Project, config: &AppConfig) -> ProposalDocument {
    let totals = compute_totals(project, config);
    let accent = non_empty(project.primary_color.as_deref())
        .unwrap_or(DEFAULT_ACCENT)
        .to_string();

    let header = HeaderBlock {
        brand: brand_mark(project, config),
        app_name: config.app_name.clone(),
        tagline: TAGLINE.to_string(),
        address: fallback(&config.company_address, "[Street Address, City, ST ZIP]"),
        website: fallback(&config.company_website, "somedomain.com"),
        phone: fallback(&config.company_phone, "[000-000-0000]"),
        watermark: WATERMARK.to_string(),
        date: display_date(project.proposal_date.as_deref()),
        quote_number: non_empty(project.proposal_id.as_deref())
            .unwrap_or(FALLBACK_QUOTE_NUMBER)
            .to_string(),
        customer_id: customer_id(&project.client_name),
        valid_until: non_empty(project.valid_until.as_deref())
            .unwrap_or(FALLBACK_VALID_UNTIL)
            .to_string(),
    };

    let recipient = RecipientBlock {
        heading: "CUSTOMER RECIPIENT".to_string(),
        client_line: format!(
            "[{}]",
            non_empty(Some(project.client_name.as_str())).unwrap_or("Name")
        )
        .to_uppercase(),
        project_line: fallback(&project.name, "[Project Description]"),
        address_lines: [
            "[Official Billing Address Line 1]".to_string(),
            "[City, State, Zip Code]".to_string(),
        ],
    };

    let sections = project
        .groups
        .iter()
        .enumerate()
        .map(|(idx, group)| section_for(idx, group))
        .collect();

    let payment_terms = non_empty(project.payment_terms.as_deref())
        .unwrap_or(&config.default_payment_terms);
    let validity = non_empty(project.validity_period.as_deref())
        .unwrap_or(&config.default_validity_period);

    let terms = TermsBlock {
        heading: "TERMS AND CONDITIONS".to_string(),
        clauses: vec![
            "Acceptance of this quote constitutes a formal contract for production and logistics."
                .to_string(),
            format!("Payment terms: {}.", payment_terms),
            format!("Quote validity: {}.", validity),
            format!(
                "All production assets remain intellectual property of {} until full payment settlement.",
                config.app_name
            ),
        ],
        signature_caption: "Official Customer Acceptance Signature:".to_string(),
        signature_left: "AUTHORIZED RECIPIENT REPRESENTATIVE".to_string(),
        signature_right: "SIGNATURE DATE".to_string(),
    };

    let cost_box = CostBox {
        assets: totals.material_subtotal,
        logistics: totals.transport_cost,
        internal_overheads: totals.profit_amount + totals.overhead_amount,
        vat_label: format!("VAT TAX ({:.1}%)", config.vat_rate * 100.0),
        vat_amount: totals.vat_amount,
        total_label: "Total Investment Portfolio".to_string(),
        grand_total: totals.grand_total,
        currency: CURRENCY.to_string(),
    };

    ProposalDocument {
        accent_color: accent,
        header,
        recipient,
        sections,
        terms,
        cost_box,
        footer_left: "Electronically Verified Corporate Node".to_string(),
        footer_right: format!("© {} {} Egypt Region", Local::now().year(), config.app_name),
    }
}

fn section_for(idx: usize, group: &ProjectGroup) -> SectionBlock {
    let rows = group
        .items
        .iter()
        .map(|item| ItemRow {
            description: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            total: item.total,
            thumbnail: item.image_ref.clone(),
        })
        .collect();

    let image_panel = if group.image_refs.is_empty() {
        None
    } else {
        Some(ImagePanel {
            title: "REF VISUALS".to_string(),
            refs: group.image_refs.clone(),
        })
    };

    SectionBlock {
        ordinal: idx + 1,
        name: group.name.clone(),
        rows,
        subtotal: group.subtotal(),
        image_panel,
    }
}

fn brand_mark(project: &Project, config: &AppConfig) -> BrandMark {
    if let Some(logo) = non_empty(project.custom_logo.as_deref()) {
        return BrandMark::Image(logo.to_string());
    }
    // An icon longer than a couple of characters is a reference, not
    // a lettermark
    if config.app_icon.chars().count() > 2 {
        BrandMark::Image(config.app_icon.clone())
    } else {
        BrandMark::Initial(config.app_icon.clone())
    }
}

fn customer_id(client_name: &str) -> String {
    let prefix: String = client_name.chars().take(3).collect::<String>().to_uppercase();
    if prefix.is_empty() {
        "[123]".to_string()
    } else {
        format!("[{}]", prefix)
    }
}

fn display_date(proposal_date: Option<&str>) -> String {
    let date = non_empty(proposal_date)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive());
    date.format("%-m/%-d/%Y").to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn fallback(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

// === Display formatting ===

/// Format an amount with thousands separators and two decimals.
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Format an amount rounded to whole units with thousands separators.
pub fn format_whole(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(rounded.abs() as u64))
}

/// Quantities print without a trailing `.0`
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SEED_MATERIALS;
    use crate::project::LineItem;

    const EPS: f64 = 1e-9;

    fn sample_project() -> Project {
        let mut project = Project::default();
        project.name = "Tech Expo Stand".to_string();
        project.client_name = "Acme GmbH".to_string();
        project.proposal_date = Some("2024-03-05".to_string());
        let mut item = LineItem::from_material(&SEED_MATERIALS[0]);
        item.quantity = 3.0;
        item.recompute_total(0.15);
        project.groups[0].items.push(item);
        project
    }

    #[test]
    fn test_block_order_and_fixed_strings() {
        let document = compose(&sample_project(), &AppConfig::default());

        assert_eq!(document.header.tagline, "Official Quotation Document");
        assert_eq!(document.header.watermark, "QUOTE");
        assert_eq!(document.recipient.heading, "CUSTOMER RECIPIENT");
        assert_eq!(document.sections.len(), 1);
        assert_eq!(document.terms.heading, "TERMS AND CONDITIONS");
        assert_eq!(document.terms.clauses.len(), 4);
        assert_eq!(document.cost_box.total_label, "Total Investment Portfolio");
        assert_eq!(document.footer_left, "Electronically Verified Corporate Node");
        assert!(document.footer_right.contains("ExhibiPrice Egypt Region"));
    }

    #[test]
    fn test_derived_strings() {
        let document = compose(&sample_project(), &AppConfig::default());

        assert_eq!(document.header.quote_number, "[123456]");
        assert_eq!(document.header.customer_id, "[ACM]");
        assert_eq!(document.header.valid_until, "30 Days from issue");
        assert_eq!(document.header.date, "3/5/2024");
        assert_eq!(document.recipient.client_line, "[ACME GMBH]");
        assert_eq!(document.accent_color, "#34548a");
    }

    #[test]
    fn test_derived_string_overrides() {
        let mut project = sample_project();
        project.proposal_id = Some("Q-2024-017".to_string());
        project.valid_until = Some("2024-04-05".to_string());
        project.primary_color = Some("#0f766e".to_string());

        let document = compose(&project, &AppConfig::default());
        assert_eq!(document.header.quote_number, "Q-2024-017");
        assert_eq!(document.header.valid_until, "2024-04-05");
        assert_eq!(document.accent_color, "#0f766e");
    }

    #[test]
    fn test_empty_client_placeholders() {
        let mut project = sample_project();
        project.client_name = String::new();
        project.name = String::new();

        let document = compose(&project, &AppConfig::default());
        assert_eq!(document.header.customer_id, "[123]");
        assert_eq!(document.recipient.client_line, "[NAME]");
        assert_eq!(document.recipient.project_line, "[Project Description]");
    }

    #[test]
    fn test_short_client_name_id() {
        let mut project = sample_project();
        project.client_name = "Ab".to_string();
        let document = compose(&project, &AppConfig::default());
        assert_eq!(document.header.customer_id, "[AB]");
    }

    #[test]
    fn test_terms_resolution_prefers_project() {
        let config = AppConfig::default();
        let mut project = sample_project();
        let document = compose(&project, &config);
        assert_eq!(
            document.terms.clauses[1],
            "Payment terms: 50% Down Payment, 50% on Delivery."
        );
        assert_eq!(document.terms.clauses[2], "Quote validity: 15 Days.");

        project.payment_terms = Some("100% upfront".to_string());
        let document = compose(&project, &config);
        assert_eq!(document.terms.clauses[1], "Payment terms: 100% upfront.");
    }

    #[test]
    fn test_cost_box_combines_overheads() {
        let document = compose(&sample_project(), &AppConfig::default());
        let totals = compute_totals(&sample_project(), &AppConfig::default());

        assert!((document.cost_box.assets - totals.material_subtotal).abs() < EPS);
        assert!((document.cost_box.logistics - 1400.0).abs() < EPS);
        assert!(
            (document.cost_box.internal_overheads
                - (totals.profit_amount + totals.overhead_amount))
                .abs()
                < EPS
        );
        assert_eq!(document.cost_box.vat_label, "VAT TAX (14.0%)");
        assert_eq!(document.cost_box.currency, "EGP");
    }

    #[test]
    fn test_empty_group_section() {
        let project = Project::default();
        let document = compose(&project, &AppConfig::default());

        let section = &document.sections[0];
        assert_eq!(section.ordinal, 1);
        assert_eq!(section.name, "Main Module");
        assert!(section.rows.is_empty());
        assert_eq!(section.subtotal, 0.0);
        assert!(section.image_panel.is_none());
    }

    #[test]
    fn test_image_panel_only_when_refs_exist() {
        let mut project = sample_project();
        let document = compose(&project, &AppConfig::default());
        assert!(document.sections[0].image_panel.is_none());

        project.groups[0].image_refs.push("ref-a".to_string());
        project.groups[0].image_refs.push("ref-b".to_string());
        project.groups[0].image_refs.push("ref-c".to_string());
        let document = compose(&project, &AppConfig::default());

        let panel = document.sections[0].image_panel.as_ref().unwrap();
        assert_eq!(panel.title, "REF VISUALS");
        assert_eq!(panel.refs.len(), 3);
        assert_eq!(ImagePanel::label(0), "REF #1");
        assert_eq!(ImagePanel::label(2), "REF #3");
    }

    #[test]
    fn test_brand_mark_resolution() {
        let mut config = AppConfig::default();
        let mut project = sample_project();

        // Single letter renders as a lettermark
        let document = compose(&project, &config);
        assert_eq!(document.header.brand, BrandMark::Initial("E".to_string()));

        // A long icon value is treated as an image reference
        config.app_icon = "data:image/png;base64,AAAA".to_string();
        let document = compose(&project, &config);
        assert!(matches!(document.header.brand, BrandMark::Image(_)));

        // A custom logo wins over both
        project.custom_logo = Some("logo-ref".to_string());
        let document = compose(&project, &config);
        assert_eq!(document.header.brand, BrandMark::Image("logo-ref".to_string()));
    }

    #[test]
    fn test_natural_height_grows_with_content() {
        let mut project = sample_project();
        let short = compose(&project, &AppConfig::default()).natural_height_mm();

        for _ in 0..20 {
            project.groups[0]
                .items
                .push(LineItem::from_material(&SEED_MATERIALS[1]));
        }
        let tall = compose(&project, &AppConfig::default()).natural_height_mm();
        assert!(tall > short);
        // 20 extra rows at 8mm each
        assert!((tall - short - 160.0).abs() < EPS);
    }

    #[test]
    fn test_pdf_file_name() {
        let project = sample_project();
        let document = compose(&project, &AppConfig::default());
        assert_eq!(
            document.pdf_file_name(&project),
            "Quotation_Tech Expo Stand_[123456].pdf"
        );

        let mut unnamed = project.clone();
        unnamed.name = String::new();
        let document = compose(&unnamed, &AppConfig::default());
        assert_eq!(document.pdf_file_name(&unnamed), "Quotation_Pro_[123456].pdf");
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(format_money(2932.5), "2,932.50");
        assert_eq!(format_money(17869.5), "17,869.50");
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(1234567.891), "1,234,567.89");
        assert_eq!(format_money(-240.0), "-240.00");

        assert_eq!(format_whole(17869.5), "17,870");
        assert_eq!(format_whole(999.4), "999");

        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.5), "2.5");
    }
}
