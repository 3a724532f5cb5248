use std::{cell::RefCell, collections::BTreeMap, fmt, sync::OnceLock};

use parking_lot::RwLock;

/// Latest published value of one dashboard entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Bool(v) => write!(f, "{v}"),
            Entry::Int(v) => write!(f, "{v}"),
            Entry::Double(v) => write!(f, "{v:.3}"),
            Entry::Text(v) => f.write_str(v),
        }
    }
}

type Registry = BTreeMap<String, BTreeMap<String, Entry>>;

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
}

/// In-process dashboard: named tabs of latest-value entries. Subsystems
/// publish into it every tick; tests and the log read it back.
pub struct Telemetry;

impl Telemetry {
    pub fn tab(name: &str) -> Tab {
        registry().write().entry(name.to_string()).or_default();
        Tab {
            name: name.to_string(),
        }
    }

    pub fn read(tab: &str, entry: &str) -> Option<Entry> {
        registry().read().get(tab)?.get(entry).cloned()
    }

    /// Drop every tab and entry. Test support.
    #[doc(hidden)]
    pub fn reset() {
        registry().write().clear();
    }
}

/// Handle onto one dashboard tab.
#[derive(Debug, Clone)]
pub struct Tab {
    name: String,
}

impl Tab {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn publish(&self, key: &str, value: Entry) {
        tracing::trace!(tab = %self.name, key, %value, "telemetry");
        registry()
            .write()
            .entry(self.name.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn publish_bool(&self, key: &str, value: bool) {
        self.publish(key, Entry::Bool(value));
    }

    pub fn publish_int(&self, key: &str, value: i64) {
        self.publish(key, Entry::Int(value));
    }

    pub fn publish_double(&self, key: &str, value: f64) {
        self.publish(key, Entry::Double(value));
    }

    pub fn publish_string(&self, key: &str, value: &str) {
        self.publish(key, Entry::Text(value.to_string()));
    }

    /// Publish a chooser's option list and current pick under `title`.
    pub fn add_chooser<T>(&self, title: &str, chooser: &Chooser<T>) {
        self.publish_string(&format!("{title}/options"), &chooser.names().join(", "));
        self.publish_string(
            &format!("{title}/selected"),
            chooser.selected_name().unwrap_or("<none>"),
        );
    }
}

/// A named-option selector, the dashboard widget behind autonomous routine
/// selection. The first option added with [`Chooser::add_default`] is
/// preselected; otherwise the first option added wins.
pub struct Chooser<T> {
    options: Vec<(String, T)>,
    selected: RefCell<Option<usize>>,
}

impl<T> Default for Chooser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Chooser<T> {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            selected: RefCell::new(None),
        }
    }

    pub fn add_option(&mut self, name: impl Into<String>, value: T) {
        self.options.push((name.into(), value));
    }

    pub fn add_default(&mut self, name: impl Into<String>, value: T) {
        *self.selected.borrow_mut() = Some(self.options.len());
        self.options.push((name.into(), value));
    }

    pub fn names(&self) -> Vec<&str> {
        self.options.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Pick an option by name. Returns false when no option matches.
    pub fn select(&self, name: &str) -> bool {
        match self.options.iter().position(|(n, _)| n == name) {
            Some(index) => {
                *self.selected.borrow_mut() = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&T> {
        let index = (*self.selected.borrow()).or(if self.options.is_empty() {
            None
        } else {
            Some(0)
        })?;
        self.options.get(index).map(|(_, value)| value)
    }

    pub fn selected_name(&self) -> Option<&str> {
        let index = (*self.selected.borrow()).or(if self.options.is_empty() {
            None
        } else {
            Some(0)
        })?;
        self.options.get(index).map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn entries_read_back_latest_value() {
        Telemetry::reset();
        let tab = Telemetry::tab("Operator");

        tab.publish_double("Elevator/height", 0.5);
        tab.publish_double("Elevator/height", 0.75);
        tab.publish_bool("Coral/present", true);

        assert_eq!(
            Telemetry::read("Operator", "Elevator/height"),
            Some(Entry::Double(0.75))
        );
        assert_eq!(
            Telemetry::read("Operator", "Coral/present"),
            Some(Entry::Bool(true))
        );
        assert_eq!(Telemetry::read("Operator", "missing"), None);
        Telemetry::reset();
    }

    #[test]
    fn chooser_prefers_the_declared_default() {
        let mut chooser = Chooser::new();
        chooser.add_option("first", 1);
        chooser.add_default("second", 2);
        chooser.add_option("third", 3);

        assert_eq!(chooser.selected(), Some(&2));
        assert_eq!(chooser.selected_name(), Some("second"));

        assert!(chooser.select("third"));
        assert_eq!(chooser.selected(), Some(&3));

        assert!(!chooser.select("missing"));
        assert_eq!(chooser.selected(), Some(&3));
    }

    #[test]
    fn chooser_without_default_uses_first_option() {
        let mut chooser = Chooser::new();
        chooser.add_option("only", "value");

        assert_eq!(chooser.selected(), Some(&"value"));
    }

    #[test]
    #[serial]
    fn chooser_publishes_options_and_selection() {
        Telemetry::reset();
        let tab = Telemetry::tab("Operator");

        let mut chooser = Chooser::new();
        chooser.add_default("cross the line", 0);
        chooser.add_option("score coral", 1);
        tab.add_chooser("Autonomous", &chooser);

        assert_eq!(
            Telemetry::read("Operator", "Autonomous/options"),
            Some(Entry::Text("cross the line, score coral".to_string()))
        );
        assert_eq!(
            Telemetry::read("Operator", "Autonomous/selected"),
            Some(Entry::Text("cross the line".to_string()))
        );
        Telemetry::reset();
    }
}
