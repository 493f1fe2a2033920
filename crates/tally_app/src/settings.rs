use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tally_engine::{AutomationSettings, Discipline};
use tally_logging::tally_info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum DisciplineSetting {
    Sequential,
    #[default]
    Concurrent,
}

/// Settings file contents. Every field is optional in the RON source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub discipline: DisciplineSetting,
    pub automation_program: String,
    pub automation_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let automation = AutomationSettings::default();
        Self {
            discipline: DisciplineSetting::default(),
            automation_program: automation.program,
            automation_timeout_secs: automation.timeout.as_secs(),
        }
    }
}

impl Settings {
    pub fn discipline(&self) -> Discipline {
        map_discipline(self.discipline)
    }

    pub fn automation(&self) -> AutomationSettings {
        AutomationSettings {
            program: self.automation_program.clone(),
            timeout: Duration::from_secs(self.automation_timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Defaults when no path is given; a given path must exist and parse.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = ron::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tally_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

fn map_discipline(setting: DisciplineSetting) -> Discipline {
    match setting {
        DisciplineSetting::Sequential => Discipline::Sequential,
        DisciplineSetting::Concurrent => Discipline::Concurrent,
    }
}
