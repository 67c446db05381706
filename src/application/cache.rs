use std::collections::BTreeMap;

/// In-memory auto-save of form values, keyed by field name.
///
/// Lives only as long as the controller. Two fields sharing a name share
/// one entry; the last write wins.
#[derive(Debug, Clone, Default)]
pub struct FormCache {
    values: BTreeMap<String, String>,
}

impl FormCache {
    pub fn store(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
