//! Interactive conflict resolution on stdin.

use std::io::{BufRead, Write};

use async_trait::async_trait;

use molten_core::natural_key::display_code;
use molten_import::{ConflictDelegate, ConflictResolution, ImportItem};
use molten_inventory::InventoryRecord;

/// Parse an answer typed at the conflict prompt.
pub fn parse_answer(input: &str) -> Option<ConflictResolution> {
    match input.trim().to_lowercase().as_str() {
        "s" | "skip" => Some(ConflictResolution::Skip),
        "r" | "replace" => Some(ConflictResolution::Replace),
        "i" | "increase" => Some(ConflictResolution::Increase),
        _ => None,
    }
}

/// Asks on stderr/stdin, one conflict at a time. End of input means skip.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    fn ask_blocking(question: String) -> ConflictResolution {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        loop {
            eprint!("{question} [s]kip / [r]eplace / [i]ncrease: ");
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => return ConflictResolution::Skip,
                Ok(_) => {
                    if let Some(answer) = parse_answer(&line) {
                        return answer;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ConflictDelegate for StdinPrompt {
    async fn resolve(&self, item: &ImportItem, existing: &InventoryRecord) -> ConflictResolution {
        let question = format!(
            "{} {} ({}): have {}, importing {}.",
            display_code(&item.manufacturer, &item.code),
            item.name,
            existing.glass_type(),
            existing.quantity(),
            item.quantity
        );

        match tokio::task::spawn_blocking(move || Self::ask_blocking(question)).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "prompt task failed; skipping");
                ConflictResolution::Skip
            }
        }
    }
}
