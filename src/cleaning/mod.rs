use crate::error::EvalError;
use crate::types::{CleanCategory, CleaningResult, Removal};

pub mod presets;
pub mod rules;

pub use presets::{Preset, PresetRegistry, DEFAULT_PRESET};

/// Cleans `raw` with a built-in preset.
pub fn clean_transcript(raw: &str, preset_name: &str) -> Result<CleaningResult, EvalError> {
    let registry = PresetRegistry::builtin();
    let preset = registry.get(preset_name)?;
    Ok(clean(raw, preset))
}

/// Runs the preset's rules in declared order, then trims every line and the
/// whole text. Only rules that removed something appear in the ledger.
pub fn clean(raw: &str, preset: &Preset) -> CleaningResult {
    let mut text = raw.to_string();
    let mut removals = Vec::new();

    for rule in &preset.rules {
        let outcome = rule.apply(&text);
        tracing::debug!(
            preset = preset.name.as_str(),
            rule = rule.name,
            removed = outcome.removed,
            "cleaning: rule applied"
        );
        if outcome.removed > 0 {
            removals.push(Removal {
                rule_name: rule.name.to_string(),
                original_snippet_count: outcome.removed,
            });
        }
        text = outcome.text;
    }

    let cleaned_text = finalize(&text);
    let original_char_count = raw.chars().count();
    let cleaned_char_count = cleaned_text.chars().count();
    let clean_rate = clean_rate(original_char_count, cleaned_char_count);

    CleaningResult {
        cleaned_text,
        removals,
        original_char_count,
        cleaned_char_count,
        clean_rate,
        category: clean_rate.map(CleanCategory::from_rate),
    }
}

/// Retention percentage, `None` for empty input.
pub fn clean_rate(original_char_count: usize, cleaned_char_count: usize) -> Option<u32> {
    if original_char_count == 0 {
        return None;
    }
    let rate = (cleaned_char_count as f64 / original_char_count as f64 * 100.0).round();
    Some(rate as u32)
}

fn finalize(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
