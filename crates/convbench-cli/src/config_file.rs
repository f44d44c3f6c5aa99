//! On-disk TOML configuration: converter commands and validator tuning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
///
/// ```toml
/// [[converter]]
/// name = "libreoffice"
/// program = "soffice"
/// args = ["--headless", "--convert-to", "pdf", "--outdir", "{outdir}", "{input}"]
/// timeout_secs = 30
///
/// [validator]
/// chars_per_unit = 500
/// unit_tolerance = 1
///
/// [artifacts]
/// dir = "/tmp/convbench"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub converter: Vec<ConverterEntry>,
    pub validator: Option<ValidatorSection>,
    pub artifacts: Option<ArtifactsSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterEntry {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub output_extension: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorSection {
    pub chars_per_unit: Option<usize>,
    pub unit_tolerance: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactsSection {
    pub dir: Option<String>,
}

/// Platform config directory path: `<config_dir>/convbench/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("convbench").join("config.toml"))
}

/// Load config by cascading CWD `.convbench.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".convbench.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
/// A non-empty overlay converter list replaces the base list wholesale;
/// merging entry-by-entry would splice command lines from two files.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        converter: if overlay.converter.is_empty() {
            base.converter
        } else {
            overlay.converter
        },
        validator: Some(ValidatorSection {
            chars_per_unit: overlay
                .validator
                .as_ref()
                .and_then(|v| v.chars_per_unit)
                .or_else(|| base.validator.as_ref().and_then(|v| v.chars_per_unit)),
            unit_tolerance: overlay
                .validator
                .as_ref()
                .and_then(|v| v.unit_tolerance)
                .or_else(|| base.validator.as_ref().and_then(|v| v.unit_tolerance)),
        }),
        artifacts: Some(ArtifactsSection {
            dir: overlay
                .artifacts
                .as_ref()
                .and_then(|a| a.dir.clone())
                .or_else(|| base.artifacts.as_ref().and_then(|a| a.dir.clone())),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ConfigFile {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn parses_full_config() {
        let config = parse(
            r#"
            [[converter]]
            name = "libreoffice"
            program = "soffice"
            args = ["--headless", "--convert-to", "pdf", "--outdir", "{outdir}", "{input}"]
            timeout_secs = 60

            [[converter]]
            name = "copy"
            program = "cp"
            args = ["{input}", "{output}"]
            output_extension = "txt"

            [validator]
            chars_per_unit = 400

            [artifacts]
            dir = "/tmp/artifacts"
            "#,
        );

        assert_eq!(config.converter.len(), 2);
        assert_eq!(config.converter[0].name, "libreoffice");
        assert_eq!(config.converter[0].timeout_secs, Some(60));
        assert_eq!(config.converter[1].output_extension.as_deref(), Some("txt"));
        assert_eq!(
            config.validator.as_ref().unwrap().chars_per_unit,
            Some(400)
        );
        assert_eq!(
            config.artifacts.as_ref().unwrap().dir.as_deref(),
            Some("/tmp/artifacts")
        );
    }

    #[test]
    fn empty_config_parses_to_defaults() {
        let config = parse("");
        assert!(config.converter.is_empty());
        assert!(config.validator.is_none());
    }

    #[test]
    fn overlay_validator_fields_win() {
        let base = parse("[validator]\nchars_per_unit = 400\nunit_tolerance = 2");
        let overlay = parse("[validator]\nchars_per_unit = 600");
        let merged = merge(base, overlay);

        let validator = merged.validator.unwrap();
        assert_eq!(validator.chars_per_unit, Some(600));
        // Unset overlay fields fall back to base.
        assert_eq!(validator.unit_tolerance, Some(2));
    }

    #[test]
    fn overlay_converters_replace_base_wholesale() {
        let base = parse("[[converter]]\nname = \"a\"\nprogram = \"a\"");
        let overlay = parse("[[converter]]\nname = \"b\"\nprogram = \"b\"");
        let merged = merge(base.clone(), overlay);
        assert_eq!(merged.converter.len(), 1);
        assert_eq!(merged.converter[0].name, "b");

        let kept = merge(base, ConfigFile::default());
        assert_eq!(kept.converter[0].name, "a");
    }
}
