use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

/// A single operator-tunable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

#[derive(Debug, Snafu)]
pub enum PreferencesError {
    #[snafu(display("could not read preferences file {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("could not write preferences file {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("malformed preferences file {}: {source}", path.display()))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[snafu(display("could not serialize preferences: {source}"))]
    Serialize { source: toml::ser::Error },
}

#[derive(Default)]
struct Store {
    values: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

fn store() -> &'static RwLock<Store> {
    static STORE: OnceLock<RwLock<Store>> = OnceLock::new();
    STORE.get_or_init(|| RwLock::new(Store::default()))
}

/// Named tunable values with declared defaults, persisted as a TOML table.
///
/// Keys are grouped with `/` separators (`"Drive/maxSpeedMps"`). A key that
/// is missing from the file is recorded with its declared default on first
/// access, so saving writes out every value the program consulted.
pub struct Preferences;

impl Preferences {
    /// Load values from `path`, remembering it for [`Preferences::save`].
    /// A missing file is not an error; everything keeps its default.
    pub fn load(path: impl AsRef<Path>) -> Result<(), PreferencesError> {
        let path = path.as_ref();
        let mut store = store().write();
        store.path = Some(path.to_path_buf());

        if !path.exists() {
            tracing::info!(path = %path.display(), "no preferences file, using defaults");
            return Ok(());
        }

        let text = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        store.values = toml::from_str(&text).context(ParseSnafu { path })?;
        tracing::info!(
            path = %path.display(),
            keys = store.values.len(),
            "preferences loaded"
        );
        Ok(())
    }

    /// Write the current values back to the file given to `load`. Does
    /// nothing when no file was ever configured.
    pub fn save() -> Result<(), PreferencesError> {
        let store = store().read();
        let Some(path) = store.path.as_deref() else {
            return Ok(());
        };

        let text = toml::to_string_pretty(&store.values).context(SerializeSnafu)?;
        std::fs::write(path, text).context(WriteSnafu { path })?;
        Ok(())
    }

    fn lookup(key: &str, default: Value) -> Value {
        let mut store = store().write();
        store.values.entry(key.to_string()).or_insert(default).clone()
    }

    pub fn bool(key: &str, default: bool) -> bool {
        match Self::lookup(key, Value::Bool(default)) {
            Value::Bool(value) => value,
            other => {
                tracing::warn!(key, ?other, "preference has the wrong type, using default");
                default
            }
        }
    }

    pub fn int(key: &str, default: i64) -> i64 {
        match Self::lookup(key, Value::Int(default)) {
            Value::Int(value) => value,
            other => {
                tracing::warn!(key, ?other, "preference has the wrong type, using default");
                default
            }
        }
    }

    pub fn double(key: &str, default: f64) -> f64 {
        match Self::lookup(key, Value::Double(default)) {
            Value::Double(value) => value,
            Value::Int(value) => value as f64,
            other => {
                tracing::warn!(key, ?other, "preference has the wrong type, using default");
                default
            }
        }
    }

    pub fn string(key: &str, default: &str) -> String {
        match Self::lookup(key, Value::Text(default.to_string())) {
            Value::Text(value) => value,
            other => {
                tracing::warn!(key, ?other, "preference has the wrong type, using default");
                default.to_string()
            }
        }
    }

    pub fn set(key: &str, value: Value) {
        store().write().values.insert(key.to_string(), value);
    }

    /// Publish every known value onto the `Preferences` dashboard tab.
    pub fn add_dashboard_tab() {
        let tab = crate::telemetry::Telemetry::tab("Preferences");
        for (key, value) in store().read().values.iter() {
            match value {
                Value::Bool(v) => tab.publish_bool(key, *v),
                Value::Int(v) => tab.publish_int(key, *v),
                Value::Double(v) => tab.publish_double(key, *v),
                Value::Text(v) => tab.publish_string(key, v),
            }
        }
    }

    /// Drop all values and forget the backing file. Test support.
    #[doc(hidden)]
    pub fn reset() {
        *store().write() = Store::default();
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn missing_file_keeps_defaults() {
        Preferences::reset();
        let dir = tempfile::tempdir().unwrap();
        Preferences::load(dir.path().join("prefs.toml")).unwrap();

        assert_eq!(Preferences::double("Drive/maxSpeedMps", 4.5), 4.5);
        assert!(Preferences::bool("Leds/enabled", true));
        Preferences::reset();
    }

    #[test]
    #[serial]
    fn values_round_trip_through_the_file() {
        Preferences::reset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");

        Preferences::load(&path).unwrap();
        Preferences::set("Drive/maxSpeedMps", Value::Double(3.25));
        Preferences::set("Operator/name", Value::Text("blue".to_string()));
        Preferences::save().unwrap();

        Preferences::reset();
        Preferences::load(&path).unwrap();
        assert_eq!(Preferences::double("Drive/maxSpeedMps", 4.5), 3.25);
        assert_eq!(Preferences::string("Operator/name", "red"), "blue");
        Preferences::reset();
    }

    #[test]
    #[serial]
    fn wrong_typed_value_falls_back_to_default() {
        Preferences::reset();
        Preferences::set("Elevator/kP", Value::Text("oops".to_string()));

        assert_eq!(Preferences::double("Elevator/kP", 0.8), 0.8);
        Preferences::reset();
    }

    #[test]
    #[serial]
    fn first_access_records_the_default_for_saving() {
        Preferences::reset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        Preferences::load(&path).unwrap();

        let _ = Preferences::int("Climber/latchTicks", 42);
        Preferences::save().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("latchTicks"));
        assert!(text.contains("42"));
        Preferences::reset();
    }
}
