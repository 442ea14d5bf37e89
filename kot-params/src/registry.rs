//! Profile registry and the process-wide active profile
//!
//! The registry is built once; the active profile is an `Arc` swapped under a
//! read-mostly lock. Readers take a snapshot and keep using it even if another
//! thread selects a different network afterwards, so a single derivation never
//! mixes parameters from two networks.

use crate::config::ParamsConfig;
use crate::data::DataSource;
use crate::headers::{KeyKind, XKeyScheme};
use crate::network::{NetworkKind, NetworkProfile};
use crate::{Error, Result};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Every known profile, fully materialized and validated
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<Arc<NetworkProfile>>,
}

impl ProfileRegistry {
    /// Build every profile from the given data source
    pub fn from_source(data: &DataSource) -> Result<Self> {
        let profiles = NetworkKind::ALL
            .into_iter()
            .map(|kind| NetworkProfile::build(kind, data).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Registered {} network profiles", profiles.len());
        Ok(Self { profiles })
    }

    /// Build every profile from the compiled-in data files
    pub fn bundled() -> Result<Self> {
        Self::from_source(&DataSource::bundled())
    }

    /// Build every profile as described by a configuration
    pub fn load(config: &ParamsConfig) -> Result<Self> {
        Self::from_source(&config.data_source())
    }

    /// Profile for a network
    pub fn get(&self, kind: NetworkKind) -> Arc<NetworkProfile> {
        // `profiles` is built in `NetworkKind::ALL` order.
        Arc::clone(&self.profiles[kind as usize])
    }

    /// Profile by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Arc<NetworkProfile>> {
        Ok(self.get(name.parse()?))
    }

    /// All profiles in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<NetworkProfile>> {
        self.profiles.iter()
    }

    /// All network kinds in registration order
    pub fn kinds(&self) -> impl Iterator<Item = NetworkKind> + '_ {
        self.profiles.iter().map(|p| p.kind)
    }
}

/// Installed registry and the override directory it was loaded from
struct Installed {
    registry: ProfileRegistry,
    data_dir: Option<PathBuf>,
}

static REGISTRY: OnceCell<Installed> = OnceCell::new();

static ACTIVE: Lazy<RwLock<Arc<NetworkProfile>>> =
    Lazy::new(|| RwLock::new(register_all().get(NetworkKind::Mainnet)));

/// Process-wide registry, built from bundled data on first use.
///
/// # Panics
///
/// Panics if a built-in profile violates its invariants. There is no safe
/// degraded mode for an inconsistent network definition.
pub fn register_all() -> &'static ProfileRegistry {
    let installed = REGISTRY.get_or_init(|| match ProfileRegistry::bundled() {
        Ok(registry) => Installed {
            registry,
            data_dir: None,
        },
        Err(e) => panic!("built-in network profiles are inconsistent: {e}"),
    });
    &installed.registry
}

/// Install a registry built from `config` and select its network.
///
/// Only the first call installs a registry; later calls just select. Fails
/// with [`Error::Config`] when `config` names a data directory other than the
/// one already installed, including when the bundled registry was installed
/// by an earlier read of the active profile.
pub fn init(config: &ParamsConfig) -> Result<()> {
    let mut installed_now = false;
    let installed = REGISTRY.get_or_try_init(|| {
        installed_now = true;
        ProfileRegistry::load(config).map(|registry| Installed {
            registry,
            data_dir: config.data_dir.clone(),
        })
    })?;

    if !installed_now {
        if config.data_dir.is_some() && config.data_dir != installed.data_dir {
            return Err(Error::Config(format!(
                "profile registry already initialized from {}, cannot load {}",
                describe_dir(installed.data_dir.as_deref()),
                describe_dir(config.data_dir.as_deref()),
            )));
        }
        tracing::debug!("Profile registry already initialized, keeping existing profiles");
    }

    // The active pointer may predate the installed registry.
    *ACTIVE.write() = installed.registry.get(config.network);
    tracing::info!("Active network set to {}", config.network);
    Ok(())
}

fn describe_dir(dir: Option<&Path>) -> String {
    match dir {
        Some(dir) => dir.display().to_string(),
        None => "bundled data".to_string(),
    }
}

/// Make `kind` the active network. Selecting the active network is a no-op.
pub fn select(kind: NetworkKind) {
    let profile = register_all().get(kind);
    let mut active = ACTIVE.write();
    if active.kind == kind {
        return;
    }
    *active = profile;
    tracing::info!("Active network set to {}", kind);
}

/// Select a network by name
pub fn select_by_name(name: &str) -> Result<()> {
    select(name.parse()?);
    Ok(())
}

/// Snapshot of the active profile
pub fn active() -> Arc<NetworkProfile> {
    ACTIVE.read().clone()
}

/// Kind of the active profile
pub fn active_kind() -> NetworkKind {
    ACTIVE.read().kind
}

/// Run `f` against the active profile while holding off any selection.
///
/// `f` must not call [`select`] itself.
pub fn with_active<R>(f: impl FnOnce(&NetworkProfile) -> R) -> R {
    let guard = ACTIVE.read();
    f(&guard)
}

/// Select mainnet
pub fn set_mainnet() {
    select(NetworkKind::Mainnet)
}

/// Select testnet
pub fn set_testnet() {
    select(NetworkKind::Testnet)
}

/// Select regtest
pub fn set_regtest() {
    select(NetworkKind::Regtest)
}

/// Select simnet
pub fn set_simnet() {
    select(NetworkKind::Simnet)
}

/// Select signet
pub fn set_signet() {
    select(NetworkKind::Signet)
}

/// Highest verified checkpoint of a profile
pub fn max_checkpoint(profile: &NetworkProfile) -> u32 {
    profile.max_checkpoint()
}

/// Genesis hash of a profile in internal byte order
pub fn genesis_bytes(profile: &NetworkProfile) -> Result<[u8; 32]> {
    profile.genesis_bytes()
}

/// Header for a scheme tag on the active network
pub fn encode_xkey_header(kind: KeyKind, tag: &str) -> Result<u32> {
    with_active(|profile| profile.headers(kind).encode_tag(tag))
}

/// Scheme for a header on the active network
pub fn decode_xkey_header(kind: KeyKind, version: u32) -> Result<XKeyScheme> {
    with_active(|profile| profile.headers(kind).decode(version))
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_registry_has_every_network() {
        let registry = ProfileRegistry::bundled().unwrap();
        assert_eq!(registry.kinds().collect::<Vec<_>>(), NetworkKind::ALL.to_vec());
        for profile in registry.iter() {
            profile.validate().unwrap();
        }
        assert_eq!(registry.get_by_name("SIMNET").unwrap().kind, NetworkKind::Simnet);
        assert!(registry.get_by_name("nope").is_err());
    }

    #[test]
    fn test_select_round_trip() {
        let _guard = TEST_LOCK.lock();
        set_mainnet();
        let before = active();

        set_testnet();
        assert_eq!(active_kind(), NetworkKind::Testnet);
        assert_eq!(active().wif_prefix, 0xef);

        set_mainnet();
        let after = active();
        assert_eq!(after.wif_prefix, before.wif_prefix);
        assert_eq!(after.p2pkh_version, before.p2pkh_version);
        assert_eq!(after.p2sh_version, before.p2sh_version);
        assert_eq!(after.segwit_hrp, before.segwit_hrp);
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_select_is_idempotent() {
        let _guard = TEST_LOCK.lock();
        set_regtest();
        let first = active();
        set_regtest();
        assert!(Arc::ptr_eq(&first, &active()));
        set_mainnet();
    }

    #[test]
    fn test_snapshot_survives_switch() {
        let _guard = TEST_LOCK.lock();
        set_mainnet();
        let snapshot = active();
        set_simnet();
        assert_eq!(snapshot.kind, NetworkKind::Mainnet);
        assert_eq!(active().kind, NetworkKind::Simnet);
        set_mainnet();
    }

    #[test]
    fn test_active_header_codec() {
        let _guard = TEST_LOCK.lock();
        set_mainnet();
        assert_eq!(encode_xkey_header(KeyKind::Public, "standard").unwrap(), 0x0488_b21e);
        assert!(matches!(
            decode_xkey_header(KeyKind::Public, 0x0435_87cf),
            Err(Error::UnrecognizedVersion(0x0435_87cf))
        ));
        assert!(matches!(
            encode_xkey_header(KeyKind::Private, "taproot"),
            Err(Error::UnknownScheme(_))
        ));

        set_testnet();
        assert_eq!(
            decode_xkey_header(KeyKind::Public, 0x0435_87cf).unwrap(),
            XKeyScheme::Standard
        );
        set_mainnet();
    }

    #[test]
    fn test_select_by_name() {
        let _guard = TEST_LOCK.lock();
        select_by_name("Signet").unwrap();
        assert_eq!(active_kind(), NetworkKind::Signet);
        assert!(select_by_name("unknown").is_err());
        assert_eq!(active_kind(), NetworkKind::Signet);
        set_mainnet();
    }
}
