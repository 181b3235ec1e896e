//! # ExhibiPrice CLI Application
//!
//! Terminal front end for the booth estimator: edit the working
//! project, price it, pull material suggestions, and export the
//! quotation PDF.
//!
//! The store directory defaults to `./exhibiprice_store` and can be
//! overridden with `EXHIBIPRICE_HOME`. Suggestions need a Gemini key
//! in `GEMINI_API_KEY` (or `API_KEY`).

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use quote_core::catalog::SEED_TRANSPORT;
use quote_core::errors::EstimateError;
use quote_core::pdf::write_proposal;
use quote_core::pricing::cost_breakdown;
use quote_core::project::ProjectType;
use quote_core::proposal::paginate::ExportOptions;
use quote_core::proposal::{compose, format_money, format_quantity, format_whole, ProposalDocument};
use quote_core::storage::JsonStorage;
use quote_core::store::ProjectStore;
use quote_core::suggest::{GeminiSuggester, MaterialSuggester, DEFAULT_EVENT_TYPE};

type Store = ProjectStore<JsonStorage>;

const BANNER: &str = "═══════════════════════════════════════════════";

fn prompt_line(prompt: &str, default: &str) -> String {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default.to_string();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default.to_string();
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_line(prompt, "").parse().unwrap_or(default)
}

fn report_error(e: &EstimateError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn store_dir() -> PathBuf {
    env::var_os("EXHIBIPRICE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("exhibiprice_store"))
}

fn main() -> ExitCode {
    env_logger::init();

    println!("ExhibiPrice CLI - Exhibition Booth Estimator");
    println!("============================================");
    println!();

    let dir = store_dir();
    let user = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string());

    let storage = match JsonStorage::open(&dir, &user) {
        Ok(storage) => storage,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("store opened at {}", dir.display());

    let mut store = ProjectStore::open(storage);

    loop {
        println!();
        print_status(&store);
        println!("  1) Project details     5) Suggest materials");
        println!("  2) Groups & items      6) Export proposal PDF");
        println!("  3) Material library    7) Archive");
        println!("  4) Cost totals         8) Settings");
        println!("  9) New draft           0) Quit");

        match prompt_line("Choice: ", "0").as_str() {
            "1" => edit_details(&mut store),
            "2" => edit_groups(&mut store),
            "3" => show_library(&store),
            "4" => show_totals(&store),
            "5" => run_suggestions(&mut store),
            "6" => export_pdf(&store),
            "7" => archive_menu(&mut store),
            "8" => settings_menu(&mut store),
            "9" => match store.reset() {
                Ok(()) => println!("Started a new draft."),
                Err(e) => report_error(&e),
            },
            "0" | "q" => break,
            other => println!("Unknown choice: {}", other),
        }
    }

    ExitCode::SUCCESS
}

fn print_status(store: &Store) {
    let project = store.project();
    let name = if project.name.is_empty() {
        "(untitled draft)"
    } else {
        project.name.as_str()
    };
    let totals = store.totals();
    println!(
        "── {} | client: {} | {} group(s) | total {} EGP ──",
        name,
        if project.client_name.is_empty() {
            "-"
        } else {
            project.client_name.as_str()
        },
        project.groups.len(),
        format_money(totals.grand_total),
    );
}

// === Project details ===

fn edit_details(store: &mut Store) {
    let current = store.project().clone();

    let name = prompt_line(&format!("Project name [{}]: ", current.name), &current.name);
    store.set_project_name(name);

    let client = prompt_line(
        &format!("Client name [{}]: ", current.client_name),
        &current.client_name,
    );
    store.set_client_name(client);

    let type_label = match current.project_type {
        ProjectType::Single => "single",
        ProjectType::Bundle => "bundle",
    };
    let project_type = prompt_line(&format!("Type (single/bundle) [{}]: ", type_label), type_label);
    store.set_project_type(match project_type.as_str() {
        "bundle" => ProjectType::Bundle,
        _ => ProjectType::Single,
    });

    let l = prompt_f64(
        &format!("Booth length m [{}]: ", current.dimensions.l),
        current.dimensions.l,
    );
    let w = prompt_f64(
        &format!("Booth width m [{}]: ", current.dimensions.w),
        current.dimensions.w,
    );
    let h = prompt_f64(
        &format!("Booth height m [{}]: ", current.dimensions.h),
        current.dimensions.h,
    );
    store.set_dimensions(l, w, h);
    if let Err(e) = store.project().validate() {
        eprintln!("Warning: {}", e);
    }

    println!("Transport options:");
    for rule in SEED_TRANSPORT.iter() {
        println!(
            "  {:<4} {:<10} {:>10} (base {} + loading {})",
            rule.id,
            rule.kind,
            format_money(rule.total_cost()),
            format_money(rule.base_price),
            format_money(rule.loading_fee),
        );
    }
    let transport = prompt_line(
        &format!("Transport rule id [{}]: ", current.selected_transport),
        &current.selected_transport,
    );
    store.set_transport(transport);

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let date_default = current.proposal_date.unwrap_or(today);
    let date = prompt_line(
        &format!("Proposal date YYYY-MM-DD [{}]: ", date_default),
        &date_default,
    );
    store.set_proposal_date(date);

    let id_default = current.proposal_id.unwrap_or_default();
    let proposal_id = prompt_line(&format!("Quote number [{}]: ", id_default), &id_default);
    if !proposal_id.is_empty() {
        store.set_proposal_id(proposal_id);
    }
}

// === Groups and items ===

fn print_groups(store: &Store) {
    for (gi, group) in store.project().groups.iter().enumerate() {
        println!(
            "  {}) {} - {}",
            gi + 1,
            group.name,
            format_money(group.subtotal())
        );
        for (ii, item) in group.items.iter().enumerate() {
            println!(
                "     {}.{}) {:<30} {:>6} {:<6} x {:>10} = {:>12}",
                gi + 1,
                ii + 1,
                item.name,
                format_quantity(item.quantity),
                item.unit,
                format_money(item.unit_price),
                format_money(item.total),
            );
        }
    }
}

fn pick_group(store: &Store) -> Option<String> {
    let groups = &store.project().groups;
    if groups.len() == 1 {
        return groups.first().map(|g| g.id.clone());
    }
    for (i, group) in groups.iter().enumerate() {
        println!("  {}) {} ({} items)", i + 1, group.name, group.items.len());
    }
    let choice = prompt_line("Group #: ", "1");
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 => groups.get(n - 1).map(|g| g.id.clone()),
        _ => {
            println!("No such group.");
            None
        }
    }
}

fn pick_item(store: &Store, group_id: &str) -> Option<String> {
    let group = store.project().groups.iter().find(|g| g.id == group_id)?;
    if group.items.is_empty() {
        println!("Group has no items.");
        return None;
    }
    for (i, item) in group.items.iter().enumerate() {
        println!("  {}) {}", i + 1, item.name);
    }
    let choice = prompt_line("Item #: ", "1");
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 => group.items.get(n - 1).map(|item| item.id.clone()),
        _ => {
            println!("No such item.");
            None
        }
    }
}

fn edit_groups(store: &mut Store) {
    loop {
        println!();
        print_groups(store);
        println!("  1) Add group        5) Add custom item");
        println!("  2) Rename group     6) Bulk add from library");
        println!("  3) Remove group     7) Set item quantity");
        println!("  4) Add from library 8) Set item price");
        println!("  r) Remove item      0) Back");

        let choice = prompt_line("Choice: ", "0");
        let result = match choice.as_str() {
            "1" => {
                let id = store.add_group();
                let name = store
                    .project()
                    .groups
                    .iter()
                    .find(|g| g.id == id)
                    .map(|g| g.name.clone())
                    .unwrap_or_default();
                println!("Added {}.", name);
                Ok(())
            }
            "2" => match pick_group(store) {
                Some(group_id) => {
                    let name = prompt_line("New name: ", "");
                    if name.is_empty() {
                        Ok(())
                    } else {
                        store.rename_group(&group_id, name)
                    }
                }
                None => Ok(()),
            },
            "3" => match pick_group(store) {
                Some(group_id) => store.remove_group(&group_id),
                None => Ok(()),
            },
            "4" => match pick_group(store) {
                Some(group_id) => {
                    let material_id = prompt_line("Material id (see library): ", "");
                    store.add_item_from_catalog(&group_id, &material_id).map(|_| ())
                }
                None => Ok(()),
            },
            "5" => match pick_group(store) {
                Some(group_id) => {
                    let name = prompt_line("Item name: ", "Custom Item");
                    let quantity = prompt_f64("Quantity [1]: ", 1.0);
                    let unit = prompt_line("Unit [pcs]: ", "pcs");
                    store.add_custom_item(&group_id, name, quantity, unit).map(|_| ())
                }
                None => Ok(()),
            },
            "6" => match pick_group(store) {
                Some(group_id) => {
                    let raw = prompt_line("Material ids, comma separated (e.g. m1,m4): ", "");
                    let ids: Vec<String> = raw
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    store.add_items_bulk(&group_id, &ids).map(|added| {
                        println!("Added {} item(s).", added);
                    })
                }
                None => Ok(()),
            },
            "7" => match pick_group(store) {
                Some(group_id) => match pick_item(store, &group_id) {
                    Some(item_id) => {
                        let quantity = prompt_f64("Quantity: ", 1.0);
                        store.update_item_quantity(&group_id, &item_id, quantity)
                    }
                    None => Ok(()),
                },
                None => Ok(()),
            },
            "8" => match pick_group(store) {
                Some(group_id) => match pick_item(store, &group_id) {
                    Some(item_id) => {
                        let price = prompt_f64("Unit price: ", 0.0);
                        store.update_item_price(&group_id, &item_id, price)
                    }
                    None => Ok(()),
                },
                None => Ok(()),
            },
            "r" => match pick_group(store) {
                Some(group_id) => match pick_item(store, &group_id) {
                    Some(item_id) => store.remove_item(&group_id, &item_id),
                    None => Ok(()),
                },
                None => Ok(()),
            },
            "0" => break,
            other => {
                println!("Unknown choice: {}", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            report_error(&e);
        }
    }
}

// === Library ===

fn show_library(store: &Store) {
    println!("{}", BANNER);
    println!("  MATERIAL LIBRARY");
    println!("{}", BANNER);
    println!(
        "  {:<5} {:<32} {:<8} {:>10} {:>6}  {}",
        "ID", "NAME", "UNIT", "PRICE", "WASTE", "CATEGORY"
    );
    for material in &store.catalog().materials {
        println!(
            "  {:<5} {:<32} {:<8} {:>10} {:>5.0}%  {}",
            material.id,
            material.name,
            material.unit,
            format_money(material.price),
            material.waste_factor * 100.0,
            material.category,
        );
    }
}

// === Totals ===

fn show_totals(store: &Store) {
    let project = store.project();
    let config = store.config();
    let totals = store.totals();

    println!("{}", BANNER);
    println!("  COST SUMMARY");
    println!("{}", BANNER);
    println!("  Materials:          {:>14}", format_money(totals.material_subtotal));
    println!("  Transport:          {:>14}", format_money(totals.transport_cost));
    println!("  Direct costs:       {:>14}", format_money(totals.direct_costs));
    println!(
        "  Overhead ({:>3.0}%):     {:>14}",
        project.overhead * 100.0,
        format_money(totals.overhead_amount)
    );
    println!(
        "  Profit ({:>3.0}%):       {:>14}",
        project.markup * 100.0,
        format_money(totals.profit_amount)
    );
    println!("  Before VAT:         {:>14}", format_money(totals.subtotal_before_vat));
    println!(
        "  VAT ({:>3.0}%):          {:>14}",
        config.vat_rate * 100.0,
        format_money(totals.vat_amount)
    );
    println!("{}", BANNER);
    println!("  GRAND TOTAL:        {:>14} EGP", format_money(totals.grand_total));
    println!("{}", BANNER);

    println!();
    println!("  Breakdown:");
    for segment in cost_breakdown(&totals) {
        println!(
            "    {:<10} {:>12} ({:>5.1}%)",
            segment.label,
            format_whole(segment.value),
            segment.percentage
        );
    }

    println!();
    println!("JSON Output (for LLM/API use):");
    if let Ok(json) = serde_json::to_string_pretty(&totals) {
        println!("{}", json);
    }
}

// === Suggestions ===

fn run_suggestions(store: &mut Store) {
    let api_key = match env::var("GEMINI_API_KEY").or_else(|_| env::var("API_KEY")) {
        Ok(key) if !key.is_empty() => key,
        _ => {
            println!("Set GEMINI_API_KEY to enable material suggestions.");
            return;
        }
    };

    let dimensions = store.project().dimensions;
    println!(
        "Requesting suggestions for {}m x {}m x {}m...",
        dimensions.l, dimensions.w, dimensions.h
    );

    let suggester = GeminiSuggester::new(api_key);
    let candidates = match suggester.suggest(&dimensions, DEFAULT_EVENT_TYPE) {
        Ok(candidates) => candidates,
        Err(e) => {
            log::warn!("suggestion request failed: {}", e);
            eprintln!("Suggestion service unavailable: {}", e);
            Vec::new()
        }
    };

    if candidates.is_empty() {
        println!("No suggestions returned.");
        return;
    }

    for (i, candidate) in candidates.iter().enumerate() {
        let reason = candidate
            .reason
            .as_deref()
            .map(|r| format!(" ({})", r))
            .unwrap_or_default();
        println!(
            "  {}) {} - {} {}{}",
            i + 1,
            candidate.name,
            format_quantity(candidate.quantity),
            candidate.unit,
            reason
        );
    }

    let group_id = match pick_group(store) {
        Some(id) => id,
        None => return,
    };
    if prompt_line("Add all to this group? (y/n) [y]: ", "y") != "y" {
        return;
    }
    match store.apply_suggestions(&group_id, &candidates) {
        Ok(count) => println!("Added {} suggested item(s).", count),
        Err(e) => report_error(&e),
    }
}

// === PDF export ===

fn export_pdf(store: &Store) {
    let project = store.project();
    let options = ExportOptions::from_project(project);
    let out_dir = PathBuf::from(".");

    println!("Rendering proposal...");
    match write_proposal(project, store.config(), &options, &out_dir) {
        Ok(path) => {
            log::info!("proposal written to {}", path.display());
            println!("Saved {}", path.display());
        }
        Err(e) => {
            report_error(&e);
            println!();
            println!("Falling back to text summary:");
            print_proposal_text(&compose(project, store.config()));
        }
    }
}

fn print_proposal_text(document: &ProposalDocument) {
    println!("{}", BANNER);
    println!("  {} - {}", document.header.app_name, document.header.tagline);
    println!("{}", BANNER);
    println!("  Date:        {}", document.header.date);
    println!("  Quote #:     {}", document.header.quote_number);
    println!("  Customer ID: {}", document.header.customer_id);
    println!("  Valid until: {}", document.header.valid_until);
    println!();
    println!("  {}", document.recipient.client_line);
    println!("  {}", document.recipient.project_line);

    for section in &document.sections {
        println!();
        println!("  {}. {}", section.ordinal, section.name);
        for row in &section.rows {
            println!(
                "     {:<30} {:>6} x {:>10} = {:>12}",
                row.description,
                format_quantity(row.quantity),
                format_money(row.unit_price),
                format_money(row.total),
            );
        }
        println!(
            "     {:<30} {:>32}",
            "Section Subtotal",
            format_money(section.subtotal)
        );
    }

    println!();
    for (i, clause) in document.terms.clauses.iter().enumerate() {
        println!("  {:02}. {}", i + 1, clause);
    }

    println!();
    println!("  Subtotal Assets:      {:>14}", format_money(document.cost_box.assets));
    println!("  Logistic Support:     {:>14}", format_money(document.cost_box.logistics));
    println!(
        "  Internal Overheads:   {:>14}",
        format_money(document.cost_box.internal_overheads)
    );
    println!(
        "  {:<20}  {:>14}",
        document.cost_box.vat_label,
        format_money(document.cost_box.vat_amount)
    );
    println!(
        "  {}: {} {}",
        document.cost_box.total_label,
        format_whole(document.cost_box.grand_total),
        document.cost_box.currency
    );
    println!();
    println!("  {} | {}", document.footer_left, document.footer_right);
}

// === Archive ===

fn archive_menu(store: &mut Store) {
    loop {
        println!();
        if store.archive().is_empty() {
            println!("  (archive is empty)");
        }
        let entries: Vec<(String, String, String)> = store
            .archive()
            .iter()
            .map(|p| (p.id.clone(), p.name.clone(), p.client_name.clone()))
            .collect();
        for (i, (_, name, client)) in entries.iter().enumerate() {
            println!(
                "  {}) {} - {}",
                i + 1,
                name,
                if client.is_empty() { "-" } else { client }
            );
        }
        println!("  1) Commit current   3) Duplicate as draft");
        println!("  2) Open             4) Delete");
        println!("  0) Back");

        let choice = prompt_line("Choice: ", "0");
        let result = match choice.as_str() {
            "1" => store.commit().map(|id| {
                log::info!("committed project {}", id);
                println!("Committed as {}.", id);
            }),
            "2" | "3" | "4" => {
                let index = prompt_line("Entry #: ", "1");
                let picked = index
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .and_then(|n| entries.get(n - 1))
                    .map(|(id, _, _)| id.clone());
                match picked {
                    Some(id) => match choice.as_str() {
                        "2" => store.open_archived(&id).map(|_| println!("Opened.")),
                        "3" => store
                            .new_project_from(&id)
                            .map(|_| println!("Duplicated into a new draft.")),
                        _ => store.delete_archived(&id).map(|_| println!("Deleted.")),
                    },
                    None => {
                        println!("No such entry.");
                        Ok(())
                    }
                }
            }
            "0" => break,
            other => {
                println!("Unknown choice: {}", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            report_error(&e);
        }
    }
}

// === Settings ===

fn settings_menu(store: &mut Store) {
    let mut config = store.config().clone();

    println!("Current configuration:");
    if let Ok(json) = serde_json::to_string_pretty(&config) {
        println!("{}", json);
    }

    config.vat_rate = prompt_f64(
        &format!("VAT rate (fraction) [{}]: ", config.vat_rate),
        config.vat_rate,
    );
    config.default_overhead = prompt_f64(
        &format!("Default overhead (fraction) [{}]: ", config.default_overhead),
        config.default_overhead,
    );
    config.default_markup = prompt_f64(
        &format!("Default markup (fraction) [{}]: ", config.default_markup),
        config.default_markup,
    );
    config.app_name = prompt_line(&format!("Brand name [{}]: ", config.app_name), &config.app_name);
    config.default_payment_terms = prompt_line(
        &format!("Payment terms [{}]: ", config.default_payment_terms),
        &config.default_payment_terms,
    );
    config.default_validity_period = prompt_line(
        &format!("Quote validity [{}]: ", config.default_validity_period),
        &config.default_validity_period,
    );

    match store.update_config(config) {
        Ok(()) => println!("Configuration saved."),
        Err(e) => report_error(&e),
    }
}
