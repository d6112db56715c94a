use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::search::safety::{Hazard, RuleSet};

/// How the selector picks among moves of the same safety class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// Uniformly at random.
    Random,
    /// Best [`Rating`](crate::search::rating::Rating), first of equals in shuffled order.
    #[default]
    Rated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub rules: RuleSet,
    pub selection: Selection,
    /// Shuffle legal moves before evaluating them.
    pub shuffle: bool,
    /// Hazards that disqualify a move from the safe set.
    pub hazards: Vec<Hazard>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { rules: RuleSet::Simple, selection: Selection::Rated, shuffle: true, hazards: Hazard::ALL.to_vec() }
    }
}

impl SelectorConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open selector config: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse selector config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SelectorConfig = serde_json::from_str(r#"{"rules":"elaborate","hazards":["allows_mate_in_one"]}"#).unwrap();
        assert_eq!(cfg.rules, RuleSet::Elaborate);
        assert_eq!(cfg.selection, Selection::Rated);
        assert!(cfg.shuffle);
        assert_eq!(cfg.hazards, vec![Hazard::AllowsMateInOne]);
    }

    #[test]
    fn load_round_trips_through_a_file() {
        let dir = std::path::Path::new("target/config_test");
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("selector.json");
        let cfg = SelectorConfig { selection: Selection::Random, shuffle: false, ..SelectorConfig::default() };
        std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
        assert_eq!(SelectorConfig::load(&path).unwrap(), cfg);
        assert!(SelectorConfig::load(dir.join("missing.json")).is_err());
    }
}
