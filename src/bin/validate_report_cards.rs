// Validate a generated report card dataset
//
// Usage: cargo run --bin validate_report_cards -- [INPUT]
// Exits with status 1 when any check fails.

use report_card_server::audit::audit;
use report_card_server::JsonFileRepository;

fn main() -> anyhow::Result<()> {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "report_cards_data.json".to_string());

    println!("Loading data from {}...", input);
    let cards = JsonFileRepository::new(&input).load_strict()?;

    let report = audit(&cards);
    println!("{}", report);

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}
