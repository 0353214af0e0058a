use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const LEDGER_HEADER: [&str; 6] = ["type", "loan", "amount", "principal", "rate", "installments"];

/// Writes a ledger that opens `loans` loans of 1,000,000 at 10% over 50
/// weeks and pays the first `payments` installments of each.
pub fn generate_ledger(path: &Path, loans: usize, payments: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    wtr.write_record(LEDGER_HEADER)?;

    for i in 1..=loans {
        let id = format!("loan{i:05}");
        wtr.write_record(["open", &id, "", "1000000", "0.10", "50"])?;
        for _ in 0..payments {
            wtr.write_record(["pay", &id, "22000"])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
