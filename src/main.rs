// Entry point and high-level CLI flow.
//
// - Option [1] loads and normalizes the data file, printing diagnostics.
// - Option [2] picks the site, option [3] the customers for the charts and
//   the rolling table.
// - Option [4] computes the dashboard, prints previews and exports files.
//
// `--batch` runs load + generate once with the sites/customers given on the
// command line and exits.
mod charts;
mod comparison;
mod dashboard;
mod error;
mod loader;
mod logging;
mod normalize;
mod output;
mod period;
mod pivot;
mod session;
mod site;
mod types;
mod util;

use clap::Parser;
use error::{DashboardError, Severity};
use loader::{DataSource, Dataset};
use session::Session;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "revenue-dashboard")]
#[command(about = "Monthly customer revenue dashboard")]
struct Args {
    /// Data file with Site, Customer, Year, Month, Amount columns (.xlsx, .xls, .ods or .csv)
    #[arg(short, long, default_value = "customer_raw_data.xlsx")]
    data: PathBuf,

    /// Used when the data file does not exist
    #[arg(long)]
    fallback_data: Option<PathBuf>,

    /// Label appended to currency amounts
    #[arg(long, default_value = "THB")]
    currency: String,

    /// Directory for exported CSV/JSON files
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Site to show first
    #[arg(short, long)]
    site: Option<String>,

    /// Customer to chart (repeatable)
    #[arg(short, long = "customer")]
    customers: Vec<String>,

    /// Load, generate once and exit
    #[arg(long)]
    batch: bool,
}

/// Settings that stay fixed for the whole run.
#[derive(Debug, Clone)]
struct DashboardConfig {
    data: PathBuf,
    fallback_data: Option<PathBuf>,
    currency_label: String,
    out_dir: PathBuf,
}

impl From<&Args> for DashboardConfig {
    fn from(args: &Args) -> Self {
        DashboardConfig {
            data: args.data.clone(),
            fallback_data: args.fallback_data.clone(),
            currency_label: args.currency.clone(),
            out_dir: args.out_dir.clone(),
        }
    }
}

/// Loaded data plus the user's selection. Owned by `main`, never global.
struct App {
    config: DashboardConfig,
    dataset: Option<Dataset>,
    session: Session,
}

fn report_notice(e: &DashboardError) {
    match e.severity() {
        Severity::Info => {
            info!("{}", e);
            println!("Info: {}\n", e);
        }
        Severity::Warning => {
            warn!("{}", e);
            println!("Warning: {}\n", e);
        }
        Severity::Error => {
            error!("{}", e);
            println!("Error: {}\n", e);
        }
    }
}

/// Read a single line of input after printing `prompt`; `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    util::read_trimmed_line(&mut io::stdin().lock())
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Handle option [1]: load and normalize the data file.
fn handle_load(app: &mut App) -> bool {
    let fallback = app.config.fallback_data.as_deref();
    match loader::load_dataset(&app.config.data, fallback) {
        Ok((dataset, report)) => {
            let source = match &dataset.source {
                DataSource::Primary(p) => p.display().to_string(),
                DataSource::Fallback(p) => format!("{} (fallback)", p.display()),
            };
            println!(
                "Loaded {} ({} rows, {} blank rows skipped)",
                source,
                util::format_int(report.total_rows),
                util::format_int(report.skipped_blank_rows)
            );
            if report.coerced_amounts > 0 {
                println!(
                    "Note: {} non-numeric amounts treated as 0.",
                    util::format_int(report.coerced_amounts)
                );
            }
            if report.invalid_periods > 0 {
                println!(
                    "Note: {} rows have no valid Year/Month and are left out of monthly figures.",
                    util::format_int(report.invalid_periods)
                );
            }
            println!();
            app.dataset = Some(dataset);
            sync_session(app).is_some()
        }
        Err(loader_err) => {
            if let error::LoadError::Dashboard(notice) = &loader_err {
                report_notice(notice);
            } else {
                error!("{}", loader_err);
                eprintln!("Failed to load file: {}\n", loader_err);
            }
            false
        }
    }
}

/// Reconcile the session with the loaded data; returns the site list.
fn sync_session(app: &mut App) -> Option<Vec<String>> {
    let Some(dataset) = app.dataset.as_ref() else {
        report_notice(&DashboardError::NoData);
        return None;
    };
    match app.session.sync(&dataset.records) {
        Ok(sites) => Some(sites),
        Err(e) => {
            report_notice(&e);
            None
        }
    }
}

/// Handle option [2]: choose a site from the sorted list.
fn handle_select_site(app: &mut App) {
    let Some(sites) = sync_session(app) else {
        return;
    };
    println!("Sites:");
    for (i, site) in sites.iter().enumerate() {
        let marker = if app.session.selected_site.as_deref() == Some(site.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} [{}] {}", marker, i + 1, site);
    }
    let Some(choice) = read_choice() else {
        return;
    };
    match choice.parse::<usize>().ok().and_then(|n| sites.get(n.wrapping_sub(1))) {
        Some(site) => {
            if let Some(dataset) = app.dataset.as_ref() {
                app.session.set_site(&dataset.records, site);
            }
            println!("Selected site: {}\n", site);
        }
        None => println!("Invalid choice.\n"),
    }
}

/// Handle option [3]: choose customers by number, comma separated.
fn handle_select_customers(app: &mut App) {
    if sync_session(app).is_none() {
        return;
    }
    let (Some(dataset), Some(site)) = (app.dataset.as_ref(), app.session.selected_site.clone())
    else {
        return;
    };
    let overview = match dashboard::site_overview(&dataset.records, &site) {
        Ok(o) => o,
        Err(e) => {
            report_notice(&e);
            return;
        }
    };
    println!("Customers at {}:", site);
    for (i, customer) in overview.customers.iter().enumerate() {
        let marker = if app.session.selected_customers.contains(customer) {
            "*"
        } else {
            " "
        };
        println!("{} [{}] {}", marker, i + 1, customer);
    }
    let Some(input) = read_line("Enter numbers (e.g. 1,3): ") else {
        return;
    };
    let picked: Vec<String> = input
        .split(',')
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .filter_map(|n| overview.customers.get(n.wrapping_sub(1)).cloned())
        .collect();
    println!("Selected {} customer(s).\n", picked.len());
    app.session.set_customers(picked);
}

fn export<T: serde::Serialize>(dir: &std::path::Path, name: &str, rows: &[T]) {
    let path = dir.join(name);
    match output::write_csv(&path, rows) {
        Ok(()) => info!(path = %path.display(), rows = rows.len(), "exported"),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

/// Handle option [4]: compute and print the dashboard, export all tables.
fn handle_generate(app: &mut App) {
    if sync_session(app).is_none() {
        return;
    }
    let (Some(dataset), Some(site)) = (app.dataset.as_ref(), app.session.selected_site.as_deref())
    else {
        return;
    };
    let config = &app.config;
    let overview = match dashboard::site_overview(&dataset.records, site) {
        Ok(o) => o,
        Err(e) => {
            report_notice(&e);
            return;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&config.out_dir) {
        eprintln!("Cannot create {}: {}", config.out_dir.display(), e);
        return;
    }

    println!("{}\n", overview.top.title(&overview.site));
    let cards = overview.top.card_rows(&config.currency_label);
    output::preview_table_rows(&cards, comparison::TOP_N);
    export(&config.out_dir, "comparison.csv", &cards);

    let detail = match dashboard::customer_detail(&overview, &app.session.selected_customers) {
        Ok(d) => Some(d),
        Err(e) => {
            report_notice(&e);
            None
        }
    };

    if let Some(detail) = &detail {
        println!("Monthly Revenue ({})\n", detail.selected.join(", "));
        output::preview_table_rows(&detail.line, 12);
        export(&config.out_dir, "line_chart.csv", &detail.line);

        println!("Yearly Revenue\n");
        output::preview_table_rows(&detail.bars, 12);
        export(&config.out_dir, "bar_chart.csv", &detail.bars);

        match &detail.pivot {
            Ok(pivot) => {
                println!("Rolling 24-Month Revenue (KB)\n");
                println!("{}\n", output::render_pivot(pivot));
                let path = config.out_dir.join("pivot.csv");
                if let Err(e) = output::write_pivot_csv(&path, pivot) {
                    eprintln!("Write error: {}", e);
                }
                let path = config.out_dir.join("pivot_display.json");
                if let Err(e) = output::write_json(&path, &output::pivot_display(pivot)) {
                    eprintln!("Write error: {}", e);
                }
            }
            Err(e) => report_notice(e),
        }
    }

    let summary = dashboard::summarize(&overview, detail.as_ref());
    if let Err(e) = output::write_json(&config.out_dir.join("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("(Tables exported to {})\n", config.out_dir.display());
}

/// Apply `--site` / `--customer` on top of the synced defaults.
///
/// Returns false when `--site` names a site the data does not have.
fn apply_presets(app: &mut App, args: &Args) -> bool {
    let Some(dataset) = app.dataset.as_ref() else {
        return false;
    };
    if let Some(site) = &args.site {
        if let Err(e) = app.session.choose_site(&dataset.records, site) {
            report_notice(&e);
            return false;
        }
    }
    if !args.customers.is_empty() {
        app.session.set_customers(args.customers.clone());
    }
    true
}

fn run_menu(app: &mut App) {
    loop {
        println!("Monthly Customer Revenue");
        println!("[1] Load the file");
        println!("[2] Select site");
        println!("[3] Select customers");
        println!("[4] Generate dashboard");
        println!("[5] Exit\n");
        let Some(choice) = read_choice() else {
            println!("\nInput closed, exiting.");
            break;
        };
        match choice.as_str() {
            "1" => {
                handle_load(app);
            }
            "2" => handle_select_site(app),
            "3" => handle_select_customers(app),
            "4" => {
                println!();
                handle_generate(app);
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();
    let mut app = App {
        config: DashboardConfig::from(&args),
        dataset: None,
        session: Session::new(),
    };

    if args.batch {
        if !handle_load(&mut app) || !apply_presets(&mut app, &args) {
            return ExitCode::FAILURE;
        }
        handle_generate(&mut app);
        return ExitCode::SUCCESS;
    }

    if app.config.data.exists() || app.config.fallback_data.is_some() {
        if handle_load(&mut app) {
            apply_presets(&mut app, &args);
        }
    }
    run_menu(&mut app);
    ExitCode::SUCCESS
}
