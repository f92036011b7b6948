// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tc_tracker::{
    format_change, format_currency, format_rate, Action, Dashboard, DashboardConfig,
    DashboardView, TimeRange, ViewState,
};

const DEFAULT_LOG_FILTER: &str = "tc_tracker=info";

/// Parsed command line
#[derive(Debug, Default)]
struct Cli {
    config: Option<PathBuf>,
    report: bool,
    range: Option<TimeRange>,
    after_tax: bool,
    region: Option<String>,
    now: Option<NaiveDate>,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", flag))
        };

        match arg.as_str() {
            "report" => cli.report = true,
            "--config" => cli.config = Some(PathBuf::from(value("--config")?)),
            "--range" => cli.range = Some(value("--range")?.parse()?),
            "--region" => cli.region = Some(value("--region")?),
            "--now" => {
                let raw = value("--now")?;
                cli.now = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("Invalid --now date: {}", raw))?,
                );
            }
            "--after-tax" => cli.after_tax = true,
            "--json" => cli.json = true,
            other => return Err(anyhow!("Unknown argument: {}", other)),
        }
    }

    Ok(cli)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    if cli.report {
        // Report mode logs to stderr so stdout stays clean
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();

        run_report(&cli)?;
    } else {
        run_ui_mode(&cli)?;
    }

    Ok(())
}

fn load_dashboard(cli: &Cli) -> Result<Dashboard> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    Ok(Dashboard::new(config))
}

/// Session start state with the `--range`, `--after-tax` and `--region`
/// flags applied through the reducer
fn seeded_state(dashboard: &Dashboard, cli: &Cli) -> Result<ViewState> {
    let mut state = dashboard.initial_state();

    let mut actions = Vec::new();
    if let Some(range) = cli.range {
        actions.push(Action::SetRange(range));
    }
    if cli.after_tax {
        actions.push(Action::ToggleAfterTax);
    }
    if let Some(region) = &cli.region {
        actions.push(Action::SelectRegion(region.clone()));
    }
    for action in actions {
        state = dashboard.reduce(&state, action)?.state;
    }

    Ok(state)
}

fn run_report(cli: &Cli) -> Result<()> {
    let dashboard = load_dashboard(cli)?;
    let state = seeded_state(&dashboard, cli)?;

    let now = cli.now.unwrap_or_else(|| Local::now().date_naive());
    let view = dashboard.derive(&state, now)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_report(&view, now);
    }

    Ok(())
}

fn print_report(view: &DashboardView, now: NaiveDate) {
    println!("💼 {} - TC Tracker", view.company_name);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Range: {} (as of {})  |  Region: {}  |  After-tax: {}",
        view.range,
        now,
        view.region,
        if view.after_tax { "on" } else { "off" }
    );

    println!("\n📈 Compensation over time");
    if view.series.is_empty() {
        println!("   No compensation data in this range");
    } else {
        println!("   {:<9} {:>12} {:>12} {:>12}", "Period", "Total", "Base", "Equity");
        for point in &view.series {
            println!(
                "   {:<9} {:>12} {:>12} {:>12}",
                point.period.to_string(),
                format_currency(point.total),
                format_currency(point.base),
                format_currency(point.equity)
            );
        }
    }

    println!("\n💰 Current TC breakdown");
    match &view.breakdown {
        Some(b) => {
            println!("   Period:       {}", b.period);
            println!("   Base Salary:  {:>12}", format_currency(b.base));
            println!("   Equity:       {:>12}", format_currency(b.equity));
            println!("   Bonus:        {:>12}", format_currency(b.bonus));
            println!("   Total TC:     {:>12}", format_currency(b.total));
        }
        None => println!("   No compensation records"),
    }

    println!("\n🧾 Tax information");
    println!("   Effective Rate: {:>10}", format_rate(view.effective_rate));
    if let Some(tax) = &view.tax {
        println!("   Total Tax:      {:>10}", format_currency(tax.tax_amount));
        println!("   Take-Home Pay:  {:>10}", format_currency(tax.take_home));
    }

    let stats = &view.quick_stats;
    println!("\n⚡ Quick stats");
    println!(
        "   YoY Growth:        {}",
        stats.yoy_growth_percent.map(format_change).unwrap_or_else(|| "n/a".to_string())
    );
    println!(
        "   Stock Performance: {}",
        stats
            .stock_performance_percent
            .map(format_change)
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!(
        "   Next Vesting Date: {}",
        stats
            .next_vesting_date
            .map(|d| d.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );

    println!("\nRegions: {}", view.regions.join(", "));
}

#[cfg(feature = "tui")]
fn run_ui_mode(cli: &Cli) -> Result<()> {
    // The alternate screen owns the terminal, so logs go to a file
    let appender = tracing_appender::rolling::never(".", "tc-tracker.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let dashboard = load_dashboard(cli)?;
    let state = seeded_state(&dashboard, cli)?;

    let mut app = ui::App::with_state(dashboard, state).with_now(cli.now);
    ui::run_ui(&mut app)?;

    println!("✅ TC Tracker closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_cli: &Cli) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print a report: tc-tracker report");
    std::process::exit(1);
}
