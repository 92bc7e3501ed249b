//! Infrastructure bootstrap helpers for runtime wiring.

use std::path::Path;

use tracing::info;

use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::SqliteSnapshotStore;
use crate::application::session::StrategySession;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::paths;
use crate::port::outbound::snapshot::SnapshotStore;

/// Open the snapshot database, creating it and running migrations if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the database
/// cannot be opened or migrated.
pub fn open_store(config: &Config) -> Result<SqliteSnapshotStore> {
    paths::ensure_parent_dir(Path::new(&config.database))?;
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Snapshot store ready");
    Ok(SqliteSnapshotStore::new(pool))
}

/// Build sessions for every configured strategy, or only `only` when given.
///
/// # Errors
///
/// Returns a configuration error for an unknown name or invalid entry.
pub fn build_sessions(config: &Config, only: Option<&str>) -> Result<Vec<StrategySession>> {
    let entries = match only {
        Some(name) => vec![config.strategy(name)?],
        None => config.strategies.iter().collect(),
    };

    entries
        .into_iter()
        .map(|entry| {
            StrategySession::new(
                entry.to_profile()?,
                config.scoring_policy(),
                config.risk_limits(),
                entry.capital,
                config.risk.apply_reduction,
            )
        })
        .collect()
}

/// Build sessions and restore each one's risk history from `store`.
///
/// # Errors
///
/// Returns a configuration, store, or risk error.
pub fn restore_sessions(
    config: &Config,
    only: Option<&str>,
    store: &impl SnapshotStore,
) -> Result<Vec<StrategySession>> {
    let mut sessions = build_sessions(config, only)?;
    for session in &mut sessions {
        session.restore(store)?;
    }
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemorySnapshotStore;
    use crate::domain::snapshot::PortfolioSnapshot;
    use crate::error::{ConfigError, Error};
    use chrono::Utc;

    fn config() -> Config {
        Config::parse_toml(
            r#"
            [[strategies]]
            name = "conservative"
            capital = "100"

            [[strategies]]
            name = "aggressive"
            capital = "100"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn builds_all_or_one() {
        assert_eq!(build_sessions(&config(), None).unwrap().len(), 2);
        let one = build_sessions(&config(), Some("aggressive")).unwrap();
        assert_eq!(one[0].name(), "aggressive");
    }

    #[test]
    fn unknown_session_name_fails() {
        assert!(matches!(
            build_sessions(&config(), Some("balanced")),
            Err(Error::Config(ConfigError::UnknownStrategy { .. }))
        ));
    }

    #[test]
    fn restore_sessions_reads_each_history() {
        let store = MemorySnapshotStore::new();
        store
            .append("aggressive", &PortfolioSnapshot::new(Utc::now(), 120.0))
            .unwrap();

        let sessions = restore_sessions(&config(), None, &store).unwrap();
        let aggressive = sessions.iter().find(|s| s.name() == "aggressive").unwrap();
        assert_eq!(aggressive.monitor().peak_value(), 120.0);
        let conservative = sessions.iter().find(|s| s.name() == "conservative").unwrap();
        assert!(conservative.monitor().is_empty());
    }

    #[test]
    fn open_store_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.database = dir
            .path()
            .join("data")
            .join("bankroll.db")
            .to_string_lossy()
            .into_owned();

        let store = open_store(&config).unwrap();
        assert!(store.strategies().unwrap().is_empty());
        assert!(dir.path().join("data").join("bankroll.db").exists());
    }
}
