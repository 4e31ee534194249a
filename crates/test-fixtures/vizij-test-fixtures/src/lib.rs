use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "ik-chains")]
    ik_chains: HashMap<String, ChainEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChainEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl ChainEntry {
    fn as_path(&self) -> &str {
        match self {
            ChainEntry::Path(path) => path,
            ChainEntry::Detailed { path, .. } => path,
        }
    }

    fn has_tag(&self, tag: &str) -> bool {
        match self {
            ChainEntry::Path(_) => false,
            ChainEntry::Detailed { tags, .. } => tags.iter().any(|t| t == tag),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// IK chain scenarios: an initial pose, a solver config and a list of
/// target/pole cases with optional expected results.
pub mod ik_chains {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.ik_chains.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Chains carrying `tag` in the manifest, sorted by name.
    pub fn tagged(tag: &str) -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST
            .ik_chains
            .iter()
            .filter(|(_, entry)| entry.has_tag(tag))
            .map(|(name, _)| name.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.ik_chains, "ik chain", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.ik_chains, "ik chain", name)?;
        super::load_json(entry.as_path())
    }
}
