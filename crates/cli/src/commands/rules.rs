use anyhow::{Context, Result};
use engine_check_core::rules::BUILTIN_RULES;

pub fn rules_command(json: bool) -> Result<i32> {
    if json {
        let rules: Vec<_> = BUILTIN_RULES
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "package": rule.name,
                    "versionCheck": rule.probe_command,
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&rules).context("Failed to serialize rules")?;
        println!("{json}");
        return Ok(0);
    }

    let width = BUILTIN_RULES
        .iter()
        .map(|rule| rule.name.len())
        .max()
        .unwrap_or(0);
    println!("Built-in validators ({}):", BUILTIN_RULES.len());
    for rule in BUILTIN_RULES {
        println!("  {:<width$}  {}", rule.name, rule.probe_command);
    }
    println!();
    println!("Add project-specific validators to engines.spec.json:");
    println!(r#"  [{{ "package": "<name>", "versionCheck": "<command>" }}]"#);

    Ok(0)
}
