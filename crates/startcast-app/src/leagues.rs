// Saved custom leagues: named scoring tables kept in a JSON file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use startcast_engine::ScoringWeights;

#[derive(Debug, Error)]
pub enum LeagueStoreError {
    #[error("failed to access league store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("league store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("custom league name must not be blank")]
    BlankName,
}

/// A user-named scoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLeague {
    pub name: String,
    /// League type the table was started from (usually `Custom`).
    pub league_type: String,
    pub scoring: ScoringWeights,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    leagues: Vec<CustomLeague>,
}

/// File-backed store. Every call reads the file fresh; a missing file is an
/// empty store.
#[derive(Debug, Clone)]
pub struct LeagueStore {
    path: PathBuf,
}

impl LeagueStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        LeagueStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All saved leagues, most recently saved first.
    pub fn list(&self) -> Result<Vec<CustomLeague>, LeagueStoreError> {
        let mut leagues = self.read()?.leagues;
        leagues.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.name.cmp(&b.name)));
        Ok(leagues)
    }

    pub fn get(&self, name: &str) -> Result<Option<CustomLeague>, LeagueStoreError> {
        let name = name.trim();
        Ok(self.read()?.leagues.into_iter().find(|l| l.name == name))
    }

    /// Insert or replace the league with this name.
    pub fn save(
        &self,
        name: &str,
        league_type: &str,
        scoring: ScoringWeights,
    ) -> Result<CustomLeague, LeagueStoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueStoreError::BlankName);
        }

        let league = CustomLeague {
            name: name.to_string(),
            league_type: league_type.trim().to_string(),
            scoring,
            saved_at: Utc::now(),
        };

        let mut file = self.read()?;
        match file.leagues.iter_mut().find(|l| l.name == name) {
            Some(existing) => *existing = league.clone(),
            None => file.leagues.push(league.clone()),
        }
        self.write(&file)?;

        info!("saved custom league '{}' to {}", name, self.path.display());
        Ok(league)
    }

    /// Remove a league. Returns whether anything was removed.
    pub fn delete(&self, name: &str) -> Result<bool, LeagueStoreError> {
        let name = name.trim();
        let mut file = self.read()?;
        let before = file.leagues.len();
        file.leagues.retain(|l| l.name != name);
        if file.leagues.len() == before {
            return Ok(false);
        }
        self.write(&file)?;
        info!("deleted custom league '{}'", name);
        Ok(true)
    }

    fn read(&self) -> Result<StoreFile, LeagueStoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) => {
                return Err(LeagueStoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&text).map_err(|e| LeagueStoreError::Json {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write(&self, file: &StoreFile) -> Result<(), LeagueStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LeagueStoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let text = serde_json::to_string_pretty(file).map_err(|e| LeagueStoreError::Json {
            path: self.path.clone(),
            source: e,
        })?;
        std::fs::write(&self.path, text).map_err(|e| LeagueStoreError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use startcast_engine::PitchingEvent;
    use std::fs;

    fn scratch(name: &str) -> LeagueStore {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        LeagueStore::open(dir.join("nested/custom_leagues.json"))
    }

    fn weights(k: f64) -> ScoringWeights {
        ScoringWeights::new()
            .with_pitching(PitchingEvent::Inning, 3.0)
            .with_pitching(PitchingEvent::Strikeout, k)
    }

    #[test]
    fn missing_file_is_empty_store() {
        let store = scratch("startcast_leagues_empty");
        assert!(store.list().unwrap().is_empty());
        assert!(store.get("Home League").unwrap().is_none());
        assert!(!store.delete("Home League").unwrap());
    }

    #[test]
    fn save_then_get() {
        let store = scratch("startcast_leagues_save_get");
        let saved = store.save("  Home League ", "Custom", weights(1.5)).unwrap();
        assert_eq!(saved.name, "Home League");

        let loaded = store.get("Home League").unwrap().unwrap();
        assert_eq!(loaded.league_type, "Custom");
        assert_eq!(loaded.scoring.pitching(PitchingEvent::Strikeout).unwrap(), 1.5);
        assert_eq!(loaded, saved);
    }

    #[test]
    fn save_upserts_by_name() {
        let store = scratch("startcast_leagues_upsert");
        store.save("Work", "Custom", weights(1.0)).unwrap();
        store.save("Work", "ESPN", weights(2.0)).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].league_type, "ESPN");
        assert_eq!(all[0].scoring.pitching(PitchingEvent::Strikeout).unwrap(), 2.0);
    }

    #[test]
    fn list_is_most_recent_first() {
        let store = scratch("startcast_leagues_order");
        store.save("First", "Custom", weights(1.0)).unwrap();
        store.save("Second", "Custom", weights(1.0)).unwrap();
        let names: Vec<String> = store.list().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"First".to_string()));
        assert!(names.contains(&"Second".to_string()));
    }

    #[test]
    fn delete_removes_only_named_league() {
        let store = scratch("startcast_leagues_delete");
        store.save("Keep", "Custom", weights(1.0)).unwrap();
        store.save("Drop", "Custom", weights(1.0)).unwrap();

        assert!(store.delete("Drop").unwrap());
        let names: Vec<String> = store.list().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Keep".to_string()]);
    }

    #[test]
    fn blank_name_rejected() {
        let store = scratch("startcast_leagues_blank");
        let err = store.save("   ", "Custom", weights(1.0)).unwrap_err();
        assert!(matches!(err, LeagueStoreError::BlankName));
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let store = scratch("startcast_leagues_corrupt");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.list(), Err(LeagueStoreError::Json { .. })));
    }
}
