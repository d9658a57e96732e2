//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{Confirm, Select};

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Let the user pick one of `choices` for a selector field.
///
/// Returns `None` when there is nothing to choose from.
pub fn select_value(field: &str, choices: &[String]) -> Result<Option<String>> {
    if choices.is_empty() {
        return Ok(None);
    }
    let index = Select::new()
        .with_prompt(format!("Select {}", field.replace('_', " ")))
        .items(choices)
        .default(0)
        .interact()?;
    Ok(choices.get(index).cloned())
}
