// Generate the monthly account report card dataset
//
// Usage: cargo run --bin generate_report_cards -- [OUTPUT] [SEED]
// Defaults: report_cards_data.json, seed 42

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use report_card_server::generator::{dataset_months, generate_dataset, ACCOUNT_NAMES};
use report_card_server::registry::{CUSTOM_AGENCY, FUNNEL, QUICKBOOKS_CORE};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "report_cards_data.json".to_string());
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid seed '{}'", raw))?,
        None => 42,
    };

    let months = dataset_months();
    let mut rng = StdRng::seed_from_u64(seed);
    let cards = generate_dataset(&mut rng, &months);

    let json = serde_json::to_string_pretty(&serde_json::json!({ "report_cards": cards }))?;
    std::fs::write(&output, json).with_context(|| format!("failed to write {}", output))?;

    println!("Generated {} report cards -> {}", cards.len(), output);
    for card_type in [FUNNEL, QUICKBOOKS_CORE, CUSTOM_AGENCY] {
        let count = cards.iter().filter(|c| c.card_type == card_type).count();
        println!("  {}: {}", card_type, count);
    }
    println!("  Accounts: {}", ACCOUNT_NAMES.len());
    println!("  Months: {}", months.len());

    Ok(())
}
