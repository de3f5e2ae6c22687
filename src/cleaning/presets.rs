use crate::cleaning::rules::{rule_by_name, Rule};
use crate::config::PresetDefinition;
use crate::error::EvalError;

pub const DEFAULT_PRESET: &str = "default";

/// Built-in presets as (name, ordered rule names).
const BUILTIN_PRESETS: &[(&str, &[&str])] = &[
    (
        DEFAULT_PRESET,
        &[
            "strip_headings",
            "strip_bracketed_years",
            "strip_brackets",
            "strip_parentheticals",
            "strip_html_tags",
            "strip_urls",
            "collapse_whitespace",
        ],
    ),
    ("minimal", &["strip_html_tags", "collapse_whitespace"]),
    ("brackets", &["strip_brackets", "collapse_whitespace"]),
    (
        "subtitles",
        &[
            "strip_timestamps",
            "strip_html_tags",
            "strip_speaker_labels",
            "strip_brackets",
            "collapse_whitespace",
        ],
    ),
];

/// Ordered list of rules. Order is significant: rules run exactly as listed.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl Preset {
    pub fn from_rule_names<S: AsRef<str>>(
        name: impl Into<String>,
        rule_names: &[S],
    ) -> Result<Self, EvalError> {
        let name = name.into();
        let rules = rule_names
            .iter()
            .map(|rule_name| {
                let rule_name = rule_name.as_ref();
                rule_by_name(rule_name).ok_or_else(|| {
                    EvalError::invalid_config(format!(
                        "preset '{name}' references unknown rule '{rule_name}'"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, rules })
    }
}

#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: Vec<Preset>,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetRegistry {
    pub fn builtin() -> Self {
        let presets = BUILTIN_PRESETS
            .iter()
            .map(|(name, rule_names)| Preset {
                name: (*name).to_string(),
                rules: rule_names.iter().filter_map(|r| rule_by_name(r)).collect(),
            })
            .collect();
        Self { presets }
    }

    /// Built-in presets followed by `definitions`. A definition may not
    /// reuse an existing preset name.
    pub fn with_definitions(definitions: &[PresetDefinition]) -> Result<Self, EvalError> {
        let mut registry = Self::builtin();
        for definition in definitions {
            registry.register(Preset::from_rule_names(
                definition.name.clone(),
                definition.rules.as_slice(),
            )?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, preset: Preset) -> Result<(), EvalError> {
        if self.presets.iter().any(|p| p.name == preset.name) {
            return Err(EvalError::invalid_config(format!(
                "duplicate preset name '{}'",
                preset.name
            )));
        }
        self.presets.push(preset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Preset, EvalError> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EvalError::unknown_preset(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.iter().any(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }
}
