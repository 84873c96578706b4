//! `kairo status`: show configuration, key pools and store status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use kairo_core::config::{get_config_path, load_config, ProviderConfig};
use kairo_core::utils::mask_key;
use kairo_providers::registry::find_by_name;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "🗓  Kairo Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults + env)".dimmed().to_string()
        }
    );
    println!(
        "  {:<18} {}:{}",
        "Listen:".bold(),
        config.gateway.host,
        config.gateway.port
    );

    // Models
    println!();
    println!("  {}", "Models:".bold());
    println!("    {:<20} {}", "Chat", config.models.chat);
    println!("    {:<20} {}", "Vision", config.models.vision);
    println!("    {:<20} {}", "Escalation chat", config.models.escalation_chat);
    println!(
        "    {:<20} {}",
        "Parameters",
        format!(
            "chat temp: {} | vision temp: {} | max_tokens: {}",
            config.models.chat_temperature, config.models.vision_temperature, config.models.max_tokens
        )
        .dimmed()
    );

    // Key pools
    println!();
    println!("  {}", "Providers:".bold());
    print_pool("Primary", &config.providers.primary);
    print_pool("Escalation", &config.providers.escalation);
    let reserve = config.providers.vision_reserve_key.trim();
    let reserve_status = if reserve.is_empty() {
        format!("{}", "· not configured".dimmed())
    } else {
        format!("{} {}", "✓".green(), mask_key(reserve).dimmed())
    };
    println!("    {:<20} {}", "Vision reserve", reserve_status);

    // Store
    println!();
    let store_status = if config.store.is_configured() {
        format!("{} Firestore ({})", "✓".green(), config.store.project_id)
    } else {
        format!("{}", "· disabled (FIREBASE_* not set)".dimmed())
    };
    println!("  {:<18} {}", "Schedule sync:".bold(), store_status);
    println!();

    Ok(())
}

fn print_pool(role: &str, pool: &ProviderConfig) {
    let vendor = match find_by_name(&pool.provider) {
        Some(spec) if spec.supports_vision => spec.display_name.to_string(),
        Some(spec) => format!("{} {}", spec.display_name, "(text only)".dimmed()),
        None => format!("{} (custom)", pool.provider),
    };
    let keys: Vec<String> = pool.usable_keys().map(mask_key).collect();
    let status = if keys.is_empty() {
        format!("{}", "· no keys".dimmed())
    } else {
        format!("{} {} key(s) {}", "✓".green(), keys.len(), keys.join(", ").dimmed())
    };
    println!("    {:<20} {} {}", role, vendor, status);
}
