//! Generate benefit reports for a whole roster from a JSON snapshot
//!
//! Outputs one CSV row per positive line item plus per-member totals, for
//! comparison with the browser front end's report page.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::Parser;
use rayon::prelude::*;

use commission_system::benefits::format_money;
use commission_system::team::loader;
use commission_system::{BenefitReport, Period};

#[derive(Parser, Debug)]
#[command(name = "run_report", about = "Compute commission/benefit reports from an agency snapshot")]
struct Args {
    /// JSON backup holding `team` and `production` arrays
    #[arg(long)]
    data: PathBuf,

    /// Calendar year to report on
    #[arg(long)]
    year: i32,

    /// Period token: year, q1..q4, or a month number 1..12
    #[arg(long, default_value = "year")]
    period: String,

    /// Restrict the report to a single member id
    #[arg(long)]
    member: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "benefit_report.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let snapshot = loader::load_snapshot(&args.data)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("loading snapshot from {}", args.data.display()))?;
    println!(
        "Loaded {} members, {} production records in {:?}",
        snapshot.members().len(),
        snapshot.production().len(),
        start.elapsed()
    );

    let period: Period = args.period.parse()?;

    let member_ids: Vec<u64> = match args.member {
        Some(id) => {
            snapshot.require_member(id)?;
            vec![id]
        }
        None => snapshot.members().iter().map(|m| m.id).collect(),
    };

    println!("Computing reports for {} member(s)...", member_ids.len());
    let calc_start = Instant::now();

    let reports: Vec<BenefitReport> = member_ids
        .par_iter()
        .map(|&id| BenefitReport::build(&snapshot, id, args.year, period))
        .collect::<Result<_, _>>()?;

    println!("Reports complete in {:?}", calc_start.elapsed());

    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    writeln!(file, "MemberId,Member,Position,Benefit,Amount,Note")?;
    for report in &reports {
        for item in &report.items {
            writeln!(
                file,
                "{},\"{}\",{},\"{}\",{:.2},\"{}\"",
                report.member_id,
                report.member_name,
                report.position,
                item.name,
                item.amount,
                item.note,
            )?;
        }
    }

    println!("Output written to {}", args.output.display());

    // Summary stats
    let paid: Vec<&BenefitReport> = reports.iter().filter(|r| r.total > 0.0).collect();
    let grand_total: f64 = reports.iter().map(|r| r.total).sum();
    println!("\nReport Summary ({} {}):", args.period, args.year);
    println!("  Members with benefits: {} of {}", paid.len(), reports.len());
    println!("  Grand total: {}", format_money(grand_total));
    if let Some(top) = paid
        .iter()
        .max_by(|a, b| a.total.total_cmp(&b.total))
    {
        println!(
            "  Highest: {} ({}) at {}",
            top.member_name,
            top.position,
            format_money(top.total)
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
