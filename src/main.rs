mod builder;
mod error;
mod extractor;
mod models;
mod output;
mod parser;

use anyhow::{Context, Result};
use builder::{DistrictAccumulator, ExtractionSummary, RunReport};
use clap::{Arg, ArgAction, ArgMatches, Command};
use models::Config;
use output::PendingFile;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("schools-extractor")
        .version("0.1")
        .about("Builds a district-keyed dataset from a Government Secondary Schools listing")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (used only if it exists)")
                .default_value("extractor.toml"),
        )
        .arg(
            Arg::new("init-config")
                .long("init-config")
                .help("Write the default configuration file and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Listing to read (.pdf, or extracted text with form-feed page breaks)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Where to write the JSON dataset"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .value_name("FILE")
                .help("Also write a flat district,name,emis CSV"),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("extractor.toml");

    if matches.get_flag("init-config") {
        Config::default().save_to_file(config_file)?;
        println!("📝 Wrote default configuration to: {}", config_file);
        return Ok(());
    }

    let config = load_config(config_file, &matches)?;
    config.validate()?;

    println!("Extracting data from {}...", config.input_path);
    let source = extractor::open_source(Path::new(&config.input_path));
    info!(source = %source.describe(), "reading listing");
    let pages = source
        .pages()
        .with_context(|| format!("Failed to extract text from {}", config.input_path))?;

    let accumulator = DistrictAccumulator::from_pages(pages);
    println!("\n✅ Extraction complete!");
    println!("Total districts: {}", accumulator.district_count());
    println!("Total schools: {}", accumulator.school_count());

    let (dataset, report) = accumulator.finish(&config.dataset_key, &config.description);

    println!("\nCreating JSON dataset...");
    let mut files = vec![PendingFile {
        path: &config.output_path,
        contents: output::render_json(&dataset)?,
    }];
    if let Some(csv_path) = &config.csv_output {
        files.push(PendingFile {
            path: csv_path,
            contents: output::render_csv(&dataset)?,
        });
    }
    // Either every output lands or none does
    output::write_all(&files)?;

    println!("📄 JSON dataset created successfully: {}", config.output_path);
    if let Some(csv_path) = &config.csv_output {
        println!("📄 CSV export written: {}", csv_path);
    }

    print_summary(&ExtractionSummary::from_dataset(&dataset), &report);
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config_file: &str, matches: &ArgMatches) -> Result<Config> {
    let mut config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("Invalid configuration file: {}", config_file))?
    } else {
        Config::default()
    };

    if let Some(input) = matches.get_one::<String>("input") {
        config.input_path = input.clone();
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output_path = output.clone();
    }
    if let Some(csv_path) = matches.get_one::<String>("csv") {
        config.csv_output = Some(csv_path.clone());
    }

    Ok(config)
}

fn print_summary(summary: &ExtractionSummary, report: &RunReport) {
    println!("\n📊 SUMMARY");
    println!("==========");
    println!("Total districts: {}", summary.total_districts);
    println!("Total schools: {}", summary.total_schools);
    println!(
        "Pages read: {} ({} without text)",
        report.pages_total, report.pages_without_text
    );
    println!(
        "Lines read: {} ({} skipped as headers or noise)",
        report.lines_seen, report.lines_skipped
    );
    println!("Schools without EMIS code: {}", report.schools_without_code);

    if summary.first_districts.is_empty() {
        println!("\n⚠️  No schools found in the input");
    } else {
        println!("\nSample districts: {}", summary.first_districts.join(", "));
    }

    if let Some((district, schools)) = &summary.sample {
        println!("\nSample data from {} district:", district);
        for school in schools {
            println!("  - {} (EMIS: {})", school.name, school.emis);
        }
    }

    if !report.failures.is_empty() {
        println!("\n❌ Lines that could not be processed: {}", report.failures.len());
        for failure in &report.failures {
            println!("   {:?}: {}", failure.line, failure.error);
        }
    }

    if !report.review.is_empty() {
        println!(
            "\n🔎 Rows with a numeric district, check whether the EMIS code was misread: {}",
            report.review.len()
        );
        for item in &report.review {
            println!(
                "   - {} | district {} | EMIS {}",
                item.name, item.district, item.code
            );
        }
    }
}
