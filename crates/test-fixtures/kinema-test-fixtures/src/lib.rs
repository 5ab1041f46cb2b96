//! Named JSON fixtures shared by kinema tests and benches.
//!
//! `fixtures/manifest.json` maps a fixture name to a path relative to the
//! `fixtures/` directory, one table per fixture kind.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    animations: BTreeMap<String, String>,
    configs: BTreeMap<String, String>,
}

static MANIFEST: Lazy<Result<Manifest, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .map_err(|e| format!("fixtures/manifest.json: {e}"))
});

#[derive(Clone, Copy, Debug)]
enum Kind {
    Animation,
    Config,
}

impl Kind {
    fn table(self) -> Result<&'static BTreeMap<String, String>> {
        let manifest = match &*MANIFEST {
            Ok(m) => m,
            Err(e) => bail!("{e}"),
        };
        Ok(match self {
            Kind::Animation => &manifest.animations,
            Kind::Config => &manifest.configs,
        })
    }

    fn names(self) -> Vec<String> {
        // BTreeMap keys come out sorted.
        self.table()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn locate(self, name: &str) -> Result<PathBuf> {
        let Some(rel) = self.table()?.get(name) else {
            bail!("no {:?} fixture named '{name}' in the manifest", self);
        };
        Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn read(self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }
}

/// Serialized animation records.
pub mod animations {
    use super::*;

    /// Fixture names, sorted.
    pub fn keys() -> Vec<String> {
        Kind::Animation.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Animation.read(name)
    }

    /// Deserialize a fixture straight into `T`.
    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let text = json(name)?;
        serde_json::from_str(&text).with_context(|| format!("parsing animation fixture '{name}'"))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Animation.locate(name)
    }
}

/// Engine configurations.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Config.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Config.read(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_exist_on_disk() {
        assert!(!animations::keys().is_empty());
        for name in animations::keys() {
            assert!(animations::path(&name).unwrap().exists(), "missing {name}");
        }
        for name in configs::keys() {
            assert!(!configs::json(&name).unwrap().is_empty());
        }
        assert!(animations::json("does-not-exist").is_err());
    }
}
