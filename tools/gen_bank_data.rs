//! Synthetic Bank Data Generator
//!
//! Writes a Name / Phone Number / Email CSV for the graph loader. A share of
//! rows reuses an earlier identity with a new phone number, so the loaded
//! graph contains users linked to several phones.

use anyhow::{Context, Result};
use clap::Parser;
use fraud_detection_app::{config::LoggingConfig, graph::PersonRecord, telemetry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::info;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Erin", "Frank", "Grace", "Heidi", "Ivan", "Judy",
    "Karim", "Leila", "Mallory", "Niaj", "Olivia", "Peggy", "Rupert", "Sybil", "Trent", "Uma",
    "Victor", "Wendy", "Xavier", "Yusuf", "Zara",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Patel", "Garcia", "Kim", "Nguyen", "Okafor", "Rossi", "Schmidt",
    "Silva", "Tanaka", "Williams", "Brown", "Khan", "Lopez", "Muller",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "outlook.com", "mail.com", "proton.me"];

#[derive(Parser, Debug)]
#[command(name = "gen-bank-data", about = "Generate synthetic identity rows")]
struct Args {
    /// Output CSV path
    #[arg(long, default_value = "data/synthetic_bank_data.csv")]
    output: PathBuf,

    /// Number of rows to write
    #[arg(long, default_value_t = 10_000)]
    rows: usize,

    /// Share of rows that reuse an earlier name and email (0.0 - 1.0)
    #[arg(long, default_value_t = 0.15, value_parser = parse_rate)]
    reuse_rate: f64,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

/// A finite share in [0, 1]
fn parse_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if rate.is_finite() && (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("reuse rate must be between 0.0 and 1.0, got {}", raw))
    }
}

/// Identity generator
struct IdentityGenerator {
    rng: StdRng,
    issued: Vec<PersonRecord>,
    reuse_rate: f64,
}

impl IdentityGenerator {
    fn new(seed: Option<u64>, reuse_rate: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            issued: Vec::new(),
            reuse_rate: if reuse_rate.is_finite() {
                reuse_rate.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    fn next_record(&mut self) -> PersonRecord {
        if !self.issued.is_empty() && self.rng.gen_bool(self.reuse_rate) {
            let index = self.rng.gen_range(0..self.issued.len());
            let mut record = self.issued[index].clone();
            record.phone_number = self.phone_number();
            return record;
        }

        let first = self.random_choice(FIRST_NAMES);
        let last = self.random_choice(LAST_NAMES);
        let name = format!("{} {}", first, last);
        let email = format!(
            "{}.{}{}@{}",
            first.to_lowercase(),
            last.to_lowercase(),
            self.rng.gen_range(1..1000),
            self.random_choice(EMAIL_DOMAINS)
        );
        let record = PersonRecord {
            name,
            phone_number: self.phone_number(),
            email,
        };
        self.issued.push(record.clone());
        record
    }

    fn phone_number(&mut self) -> String {
        format!(
            "{:03}-{:03}-{:04}",
            self.rng.gen_range(200..1000),
            self.rng.gen_range(200..1000),
            self.rng.gen_range(0..10_000)
        )
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_logging(&LoggingConfig::default())?;

    info!(
        output = %args.output.display(),
        rows = args.rows,
        reuse_rate = args.reuse_rate,
        "Generating synthetic bank data"
    );

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {:?}", args.output))?;
    let mut generator = IdentityGenerator::new(args.seed, args.reuse_rate);

    for _ in 0..args.rows {
        writer.serialize(generator.next_record())?;
    }
    writer.flush()?;

    info!(
        rows = args.rows,
        identities = generator.issued.len(),
        "Data written"
    );
    Ok(())
}
