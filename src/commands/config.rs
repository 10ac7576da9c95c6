use crate::AuditContext;
use crate::config::KEYS;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set or unset configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut AuditContext,
    key: Option<&str>,
    value: Option<String>,
    unset: bool,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    if list || key.is_none() {
        show_all_config(ctx);
        return Ok(());
    }

    let key =
        key.ok_or_else(|| anyhow::anyhow!("Key must be provided when not using --list flag"))?;

    if unset {
        ctx.config.unset(key)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Unset {key}"));
    } else if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values, grouped by section
fn show_all_config(ctx: &AuditContext) {
    let mut current = "";
    for key in KEYS {
        let Some((section, field)) = key.split_once('.') else {
            continue;
        };
        if section != current {
            if !current.is_empty() {
                println!();
            }
            println!("{}", format!("[{section}]").bold());
            current = section;
        }
        match ctx.config.get(key) {
            Some(value) => println!("  {field} = {value}"),
            None => println!("  {field} = {}", "(unset)".dimmed()),
        }
    }
    output::verbose(&format!("Config file: {}", ctx.config_path.display()));
}
