//! Per-client pseudonymous identity
//!
//! Generated on first use, persisted through an [`IdentityStore`] backend,
//! never rotated automatically.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

const NAMES: &[(&str, &str)] = &[
    ("Optimus Prime", "OP"),
    ("Megatron", "ME"),
    ("Starscream", "ST"),
    ("Bumblebee", "BB"),
    ("Ultra Magnus", "UM"),
    ("Shockwave", "SH"),
    ("Soundwave", "SW"),
    ("Ironhide", "IR"),
    ("Ratchet", "RA"),
    ("Prowl", "PR"),
    ("Jazz", "JA"),
    ("Hot Rod", "HR"),
    ("Alpha Trion", "AT"),
    ("Wheeljack", "WH"),
    ("Sideswipe", "SI"),
    ("Sunstreaker", "SU"),
    ("Inferno", "IN"),
    ("Grapple", "GR"),
    ("Blaster", "BL"),
    ("Perceptor", "PE"),
    ("Trailbreaker", "TR"),
    ("Cosmos", "CO"),
    ("Warpath", "WA"),
    ("Powerglide", "PO"),
    ("Arcee", "AR"),
    ("Springer", "SP"),
    ("Kup", "KU"),
    ("Blurr", "BU"),
    ("Grimlock", "GL"),
    ("Swoop", "WO"),
    ("Skywarp", "SK"),
    ("Thundercracker", "TH"),
    ("Ramjet", "AM"),
    ("Cyclonus", "CY"),
    ("Scourge", "SC"),
    ("Galvatron", "GA"),
    ("Astrotrain", "AS"),
    ("Blitzwing", "BZ"),
    ("Rumble", "RU"),
    ("Frenzy", "FR"),
    ("Laserbeak", "LA"),
    ("Ravage", "RV"),
    ("Unicron", "UN"),
    ("Devastator", "DE"),
    ("Menasor", "MN"),
    ("Bruticus", "BR"),
    ("Motormaster", "MO"),
    ("Scrapper", "CR"),
    ("Mixmaster", "MA"),
    ("Bonecrusher", "BO"),
    ("Hook", "HO"),
    ("Vortex", "VO"),
    ("Swindle", "WI"),
];

const COLORS: &[&str] = &[
    "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#22c55e", "#10b981", "#14b8a6", "#06b6d4",
    "#0ea5e9", "#3b82f6", "#6366f1", "#8b5cf6", "#a855f7", "#d946ef", "#ec4899", "#f43f5e",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub color: String,
}

impl ClientIdentity {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let (name, initials) = NAMES.choose(&mut rng).copied().unwrap_or(NAMES[0]);
        let color = COLORS.choose(&mut rng).copied().unwrap_or(COLORS[0]);
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            initials: initials.to_string(),
            color: color.to_string(),
        }
    }
}

/// Persistence backend for a client identity.
pub trait IdentityStore: Send + Sync {
    fn load(&self) -> Result<Option<ClientIdentity>>;
    fn save(&self, identity: &ClientIdentity) -> Result<()>;
}

/// JSON file backend.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<ClientIdentity>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read identity file {}", self.path.display()))?;
        let identity = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid identity file {}", self.path.display()))?;
        Ok(Some(identity))
    }

    fn save(&self, identity: &ClientIdentity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(identity)?)?;
        Ok(())
    }
}

/// Identity lifecycle: load the stored identity, or generate and persist a
/// fresh one on first use.
pub struct IdentityProvider<S: IdentityStore> {
    store: S,
}

impl<S: IdentityStore> IdentityProvider<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get_or_create(&self) -> Result<ClientIdentity> {
        if let Some(identity) = self.store.load()? {
            return Ok(identity);
        }
        let identity = ClientIdentity::generate();
        self.store.save(&identity)?;
        debug!(id = %identity.id, name = %identity.name, "generated new client identity");
        Ok(identity)
    }
}
