use adplace_config::Config;
use adplace_engine::EngineContext;
use adplace_placements::{SettingKind, SettingSpec};
use anyhow::Result;

pub fn handle(config: &Config) -> Result<()> {
    let engine = EngineContext::new(config.clone());

    for (category, placements) in engine.placements().grouped_by_category() {
        println!("{}:", category);
        for placement in placements {
            let marker = if placement.is_available(engine.host()) {
                "✓"
            } else {
                "✗"
            };
            println!("  {} {:<26} {}", marker, placement.tag(), placement.label());
            for setting in placement.settings() {
                println!("      {}", describe(setting));
            }
        }
        println!();
    }

    println!("✗ = needs host software that is not enabled in [host]");
    Ok(())
}

fn describe(setting: &SettingSpec) -> String {
    let kind = match setting.kind {
        SettingKind::Integer { min, default } => format!("integer >= {}, default {}", min, default),
        SettingKind::Bool { default } => format!("yes/no, default {}", default),
    };
    format!("{}: {} ({})", setting.key, setting.label, kind)
}
