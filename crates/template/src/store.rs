//! Live customization values for the currently loaded template.

use crate::{CustomizationValues, ParsedTemplate, TemplateField};

/// Notification delivered to observers, synchronously, in registration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent<'a> {
    /// All values were replaced by the defaults of a newly loaded template
    Seeded,
    /// One field changed
    Changed { id: &'a str, value: &'a str },
}

/// Handle returned by [`CustomizationStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&StoreEvent<'_>)>;

/// Mapping of field id to current value, with fallback to field defaults.
///
/// Values are not validated: colors are stored exactly as the color widget
/// produced them and consumers must tolerate any string.
#[derive(Default)]
pub struct CustomizationStore {
    fields: Vec<TemplateField>,
    values: CustomizationValues,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    /// Incremented on every mutation
    version: u64,
}

impl CustomizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the defaults of `template`
    pub fn from_template(template: &ParsedTemplate) -> Self {
        let mut store = Self::new();
        store.seed(template);
        store
    }

    /// Replace fields and values wholesale with `template`'s defaults
    pub fn seed(&mut self, template: &ParsedTemplate) {
        self.fields = template.fields.clone();
        self.values = template.default_values();
        self.version += 1;
        self.notify(&StoreEvent::Seeded);
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    /// Current value, falling back to the field default when unset.
    /// `None` only for ids that are not fields of the template.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.values
            .get(id)
            .map(String::as_str)
            .or_else(|| self.field(id).map(|f| f.default_value.as_str()))
    }

    /// Set a value and notify observers. Returns `false` (and does nothing)
    /// for ids that are not fields of the current template.
    pub fn set(&mut self, id: &str, value: impl Into<String>) -> bool {
        if self.field(id).is_none() {
            tracing::warn!(%id, "Ignoring value for unknown template field");
            return false;
        }
        let value = value.into();
        self.values.insert(id.to_string(), value.clone());
        self.version += 1;
        self.notify(&StoreEvent::Changed { id, value: &value });
        true
    }

    /// Drop an override so the field reads its default again
    pub fn reset(&mut self, id: &str) -> bool {
        let Some(default) = self.field(id).map(|f| f.default_value.clone()) else {
            return false;
        };
        self.set(id, default)
    }

    /// Whether the current value differs from the field default
    pub fn is_overridden(&self, id: &str) -> bool {
        match (self.values.get(id), self.field(id)) {
            (Some(value), Some(field)) => *value != field.default_value,
            _ => false,
        }
    }

    /// Every field with its current (or default) value
    pub fn snapshot(&self) -> CustomizationValues {
        self.fields
            .iter()
            .filter_map(|f| self.get(&f.id).map(|v| (f.id.clone(), v.to_string())))
            .collect()
    }

    /// Values explicitly held by the store (seeded defaults and edits)
    pub fn values(&self) -> &CustomizationValues {
        &self.values
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent<'_>) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    fn field(&self, id: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn notify(&mut self, event: &StoreEvent<'_>) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }
}

impl std::fmt::Debug for CustomizationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomizationStore")
            .field("fields", &self.fields)
            .field("values", &self.values)
            .field("observers", &self.observers.len())
            .field("version", &self.version)
            .finish()
    }
}
