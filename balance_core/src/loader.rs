use crate::context::BalanceContext;
use crate::document::{BalanceDocument, ProfileChoice};
use crate::overlay::apply_override;
use crate::profile::{
    BalanceProfile, Domain, EquipmentCurve, LevelCurve, ModeRules, PvpConfig, PveCurve, Resolved,
    SkillCurve,
};
use crate::types::Mode;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Environment variable naming a directory of balance documents
pub const CONFIG_DIR_ENV: &str = "BALANCE_CONFIG_DIR";

/// Where balance documents are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The documents compiled into the crate
    Embedded,
    /// `<dir>/<domain>.json` (or `.toml`), falling back to the embedded copy
    Directory(PathBuf),
}

impl ConfigSource {
    /// `Directory` from `BALANCE_CONFIG_DIR`, `Embedded` when unset or blank
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => ConfigSource::Directory(PathBuf::from(dir)),
            _ => ConfigSource::Embedded,
        }
    }
}

/// Every resolved profile for one balance version
///
/// Taken under a single lock, so all five profiles belong to the same
/// version even if the version is switched mid-simulation.
#[derive(Debug, Clone)]
pub struct BalanceSnapshot {
    pub version: String,
    pub level: Arc<Resolved<LevelCurve>>,
    pub equipment: Arc<Resolved<EquipmentCurve>>,
    pub skill: Arc<Resolved<SkillCurve>>,
    pub pve: Arc<Resolved<PveCurve>>,
    pub pvp: Arc<Resolved<PvpConfig>>,
}

impl BalanceSnapshot {
    /// Snapshot of the compiled-in default profiles
    pub fn defaults(version: impl Into<String>) -> Self {
        let version = version.into();
        BalanceSnapshot {
            level: Arc::new(Resolved::new(version.clone(), LevelCurve::default())),
            equipment: Arc::new(Resolved::new(version.clone(), EquipmentCurve::default())),
            skill: Arc::new(Resolved::new(version.clone(), SkillCurve::default())),
            pve: Arc::new(Resolved::new(version.clone(), PveCurve::default())),
            pvp: Arc::new(Resolved::new(version.clone(), PvpConfig::default())),
            version,
        }
    }

    /// Version tag the profiles were actually resolved from
    ///
    /// Differs from `version` when a document lacks the requested version
    /// and its first profile was used instead. Mixed tags are joined with
    /// `+` in sorted order.
    pub fn resolved_version(&self) -> String {
        let tags: BTreeSet<&str> = [
            &self.level.version,
            &self.equipment.version,
            &self.skill.version,
            &self.pve.version,
            &self.pvp.version,
        ]
        .into_iter()
        .map(String::as_str)
        .collect();
        tags.into_iter().collect::<Vec<_>>().join("+")
    }

    /// Round limit, seed and multipliers for a duel mode
    pub fn mode(&self, mode: Mode) -> ModeRules {
        match mode {
            Mode::Pve => self.pve.rules(),
            Mode::Pvp => self.pvp.rules(),
        }
    }
}

#[derive(Default)]
struct ProfileCache {
    /// Version every entry was resolved for
    version: Option<String>,
    entries: HashMap<Domain, Arc<dyn Any + Send + Sync>>,
}

impl ProfileCache {
    fn get<T: BalanceProfile>(&self, version: &str) -> Option<Arc<Resolved<T>>> {
        if self.version.as_deref() != Some(version) {
            return None;
        }
        let entry = self.entries.get(&T::DOMAIN)?;
        Arc::clone(entry).downcast::<Resolved<T>>().ok()
    }

    fn clear(&mut self) {
        self.version = None;
        self.entries.clear();
    }
}

impl fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCache")
            .field("version", &self.version)
            .field("domains", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolves and memoizes the balance profiles for the active version
///
/// Never fails: unreadable documents, missing versions and rejected overrides
/// are logged and replaced by the embedded document or the default profile.
#[derive(Debug)]
pub struct BalanceConfigLoader {
    context: BalanceContext,
    source: ConfigSource,
    cache: RwLock<ProfileCache>,
}

impl BalanceConfigLoader {
    pub fn new(context: BalanceContext, source: ConfigSource) -> Self {
        BalanceConfigLoader {
            context,
            source,
            cache: RwLock::new(ProfileCache::default()),
        }
    }

    /// Loader reading from `BALANCE_CONFIG_DIR` when set
    pub fn from_env(context: BalanceContext) -> Self {
        Self::new(context, ConfigSource::from_env())
    }

    pub fn context(&self) -> &BalanceContext {
        &self.context
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn balance_version(&self) -> String {
        self.context.version()
    }

    /// Switch the active version and drop every memoized profile
    pub fn set_balance_version(&self, version: impl Into<String>) {
        let version = version.into();
        let mut cache = self.write_cache();
        let previous = self.context.version();
        self.context.set_version(version.clone());
        cache.clear();
        info!(from = %previous, to = %version, "balance version switched");
    }

    /// Drop every memoized profile so the next read goes back to the source
    pub fn reset_cache(&self) {
        self.write_cache().clear();
        debug!("balance profile cache cleared");
    }

    pub fn level_config(&self) -> Arc<Resolved<LevelCurve>> {
        self.get()
    }

    pub fn equipment_config(&self) -> Arc<Resolved<EquipmentCurve>> {
        self.get()
    }

    pub fn skill_config(&self) -> Arc<Resolved<SkillCurve>> {
        self.get()
    }

    pub fn pve_config(&self) -> Arc<Resolved<PveCurve>> {
        self.get()
    }

    pub fn pvp_config(&self) -> Arc<Resolved<PvpConfig>> {
        self.get()
    }

    /// All five profiles for the active version
    pub fn snapshot(&self) -> BalanceSnapshot {
        {
            let cache = self.read_cache();
            let version = self.context.version();
            if let Some(snapshot) = cached_snapshot(&cache, &version) {
                return snapshot;
            }
        }

        let mut cache = self.write_cache();
        let version = self.context.version();
        BalanceSnapshot {
            level: self.fill(&mut cache, &version),
            equipment: self.fill(&mut cache, &version),
            skill: self.fill(&mut cache, &version),
            pve: self.fill(&mut cache, &version),
            pvp: self.fill(&mut cache, &version),
            version,
        }
    }

    fn get<T: BalanceProfile>(&self) -> Arc<Resolved<T>> {
        {
            let cache = self.read_cache();
            if let Some(resolved) = cache.get::<T>(&self.context.version()) {
                return resolved;
            }
        }

        let mut cache = self.write_cache();
        let version = self.context.version();
        self.fill(&mut cache, &version)
    }

    /// Resolve one profile into the cache unless another caller already did
    fn fill<T: BalanceProfile>(&self, cache: &mut ProfileCache, version: &str) -> Arc<Resolved<T>> {
        if cache.version.as_deref() != Some(version) {
            if let Some(stale) = cache.version.as_deref() {
                debug!(stale, version, "balance version changed, dropping cached profiles");
            }
            cache.clear();
            cache.version = Some(version.to_string());
        }

        if let Some(resolved) = cache.get::<T>(version) {
            return resolved;
        }

        let resolved = Arc::new(self.resolve::<T>(version));
        let entry: Arc<dyn Any + Send + Sync> = resolved.clone();
        cache.entries.insert(T::DOMAIN, entry);
        debug!(domain = %T::DOMAIN, version, "balance profile resolved");
        resolved
    }

    fn resolve<T: BalanceProfile>(&self, version: &str) -> Resolved<T> {
        let domain = T::DOMAIN;
        let document = self.document(domain);

        match document.choose(version) {
            ProfileChoice::Exact(partial) => {
                Resolved::new(version, override_or_default(partial, version))
            }
            ProfileChoice::Fallback { key, partial } => {
                warn!(
                    domain = %domain,
                    requested = version,
                    fallback = key,
                    "balance version missing from document, using first profile"
                );
                Resolved::new(key, override_or_default(partial, key))
            }
            ProfileChoice::Empty => {
                warn!(
                    domain = %domain,
                    version,
                    "balance document has no profiles, using defaults"
                );
                Resolved::new(version, T::default())
            }
        }
    }

    fn document(&self, domain: Domain) -> BalanceDocument {
        if let ConfigSource::Directory(dir) = &self.source {
            match BalanceDocument::load(dir, domain) {
                Ok(document) => return document,
                Err(e) => warn!(
                    domain = %domain,
                    error = %e,
                    "failed to load balance document, using embedded copy"
                ),
            }
        }

        BalanceDocument::embedded(domain).unwrap_or_else(|e| {
            warn!(domain = %domain, error = %e, "embedded balance document unreadable");
            BalanceDocument::default()
        })
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, ProfileCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, ProfileCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn override_or_default<T: BalanceProfile>(partial: &serde_json::Value, version: &str) -> T {
    apply_override(partial).unwrap_or_else(|e| {
        warn!(
            domain = %T::DOMAIN,
            version,
            error = %e,
            "balance override rejected, using defaults"
        );
        T::default()
    })
}

fn cached_snapshot(cache: &ProfileCache, version: &str) -> Option<BalanceSnapshot> {
    Some(BalanceSnapshot {
        version: version.to_string(),
        level: cache.get(version)?,
        equipment: cache.get(version)?,
        skill: cache.get(version)?,
        pve: cache.get(version)?,
        pvp: cache.get(version)?,
    })
}
