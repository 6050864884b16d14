//! Action parameters
//!
//! Parameters are an opaque bag of values keyed by name. The values passed to
//! `Dispatcher::invoke` are stored as an ordered list under the reserved
//! [`PARAMETERS`] key; interpretation belongs to the action's handler.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Reserved parameter name holding the caller's positional values.
pub const PARAMETERS: &str = "Parameters";

/// An opaque parameter value.
///
/// Scalar variants cover the common cases; [`ActionValue::Json`] carries
/// structured data and [`ActionValue::Opaque`] carries any shared value the
/// handler knows how to downcast.
#[derive(Clone, Default)]
pub enum ActionValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ActionValue>),
    Json(serde_json::Value),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl ActionValue {
    /// Wrap an arbitrary shared value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        ActionValue::Opaque(Arc::new(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ActionValue::Bool(b) => Some(*b),
            ActionValue::Json(serde_json::Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ActionValue::Int(n) => Some(*n),
            ActionValue::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    /// Numeric value as `f64`; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ActionValue::Float(n) => Some(*n),
            ActionValue::Int(n) => Some(*n as f64),
            ActionValue::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ActionValue::Text(s) => Some(s),
            ActionValue::Json(v) => v.as_str(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ActionValue]> {
        match self {
            ActionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Downcast an [`ActionValue::Opaque`] payload.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            ActionValue::Opaque(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// JSON form of the value, or `None` for opaque payloads.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        Some(match self {
            ActionValue::Null => Value::Null,
            ActionValue::Bool(b) => Value::Bool(*b),
            ActionValue::Int(n) => Value::from(*n),
            ActionValue::Float(n) => Value::from(*n),
            ActionValue::Text(s) => Value::String(s.clone()),
            ActionValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json())
                    .collect::<Option<Vec<_>>>()?,
            ),
            ActionValue::Json(v) => v.clone(),
            ActionValue::Opaque(_) => return None,
        })
    }
}

impl fmt::Debug for ActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionValue::Null => f.write_str("Null"),
            ActionValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ActionValue::Int(n) => f.debug_tuple("Int").field(n).finish(),
            ActionValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            ActionValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            ActionValue::List(items) => f.debug_tuple("List").field(items).finish(),
            ActionValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            ActionValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

/// Opaque values compare by identity.
impl PartialEq for ActionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ActionValue::Null, ActionValue::Null) => true,
            (ActionValue::Bool(a), ActionValue::Bool(b)) => a == b,
            (ActionValue::Int(a), ActionValue::Int(b)) => a == b,
            (ActionValue::Float(a), ActionValue::Float(b)) => a == b,
            (ActionValue::Text(a), ActionValue::Text(b)) => a == b,
            (ActionValue::List(a), ActionValue::List(b)) => a == b,
            (ActionValue::Json(a), ActionValue::Json(b)) => a == b,
            (ActionValue::Opaque(a), ActionValue::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for ActionValue {
    fn from(b: bool) -> Self {
        ActionValue::Bool(b)
    }
}

impl From<i32> for ActionValue {
    fn from(n: i32) -> Self {
        ActionValue::Int(n.into())
    }
}

impl From<i64> for ActionValue {
    fn from(n: i64) -> Self {
        ActionValue::Int(n)
    }
}

impl From<u32> for ActionValue {
    fn from(n: u32) -> Self {
        ActionValue::Int(n.into())
    }
}

impl From<f64> for ActionValue {
    fn from(n: f64) -> Self {
        ActionValue::Float(n)
    }
}

impl From<&str> for ActionValue {
    fn from(s: &str) -> Self {
        ActionValue::Text(s.to_string())
    }
}

impl From<String> for ActionValue {
    fn from(s: String) -> Self {
        ActionValue::Text(s)
    }
}

impl From<Vec<ActionValue>> for ActionValue {
    fn from(items: Vec<ActionValue>) -> Self {
        ActionValue::List(items)
    }
}

impl From<serde_json::Value> for ActionValue {
    fn from(v: serde_json::Value) -> Self {
        ActionValue::Json(v)
    }
}

impl<T: Into<ActionValue>> From<Option<T>> for ActionValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ActionValue::Null, Into::into)
    }
}

/// Build a positional parameter list for `Dispatcher::invoke`.
///
/// ```
/// use action_dispatch_core::{params, ActionValue};
///
/// let values = params![1, "two", 3.0];
/// assert_eq!(values[1], ActionValue::from("two"));
/// assert!(params![].is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::ActionValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::ActionValue::from($value)),+]
    };
}

/// Produces a parameter value when the action runs.
pub type Deferred = Arc<dyn Fn() -> ActionValue + Send + Sync>;

#[derive(Clone)]
enum Slot {
    Ready(ActionValue),
    Deferred(Deferred),
}

/// Named parameter mapping carried by an action.
#[derive(Clone, Default)]
pub struct ActionParams {
    slots: BTreeMap<String, Slot>,
}

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous value under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ActionValue>) {
        self.slots.insert(name.into(), Slot::Ready(value.into()));
    }

    /// Register a value produced right before the action runs.
    pub fn insert_deferred<F>(&mut self, name: impl Into<String>, producer: F)
    where
        F: Fn() -> ActionValue + Send + Sync + 'static,
    {
        self.slots.insert(name.into(), Slot::Deferred(Arc::new(producer)));
    }

    /// Get a resolved value. Deferred values read as `None` until resolved.
    pub fn get(&self, name: &str) -> Option<&ActionValue> {
        match self.slots.get(name)? {
            Slot::Ready(value) => Some(value),
            Slot::Deferred(_) => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Parameter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The positional values stored under [`PARAMETERS`].
    pub fn positional(&self) -> &[ActionValue] {
        self.get(PARAMETERS)
            .and_then(ActionValue::as_list)
            .unwrap_or(&[])
    }

    /// Replace every deferred slot with the value its producer returns.
    pub fn resolve_deferred(&mut self) {
        for slot in self.slots.values_mut() {
            if let Slot::Deferred(producer) = slot {
                *slot = Slot::Ready(producer());
            }
        }
    }
}

impl fmt::Debug for ActionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, slot) in &self.slots {
            match slot {
                Slot::Ready(value) => map.entry(name, value),
                Slot::Deferred(_) => map.entry(name, &format_args!("<deferred>")),
            };
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_positional_defaults_to_empty() {
        let params = ActionParams::new();
        assert!(params.positional().is_empty());
    }

    #[test]
    fn test_positional_reads_reserved_key() {
        let mut params = ActionParams::new();
        params.insert(PARAMETERS, params![7, "x"]);
        params.insert("zoom", 1.5);

        assert_eq!(params.positional().len(), 2);
        assert_eq!(params.positional()[0].as_i64(), Some(7));
        assert_eq!(params.get("zoom").and_then(ActionValue::as_f64), Some(1.5));
        assert_eq!(params.names().collect::<Vec<_>>(), vec![PARAMETERS, "zoom"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut params = ActionParams::new();
        params.insert("page", 1);
        params.insert("page", 2);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("page"), Some(&ActionValue::Int(2)));
    }

    #[test]
    fn test_deferred_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut params = ActionParams::new();
        params.insert_deferred("selection", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ActionValue::from("chapter 3")
        });

        assert!(params.contains("selection"));
        assert!(params.get("selection").is_none());

        params.resolve_deferred();
        params.resolve_deferred();

        assert_eq!(params.get("selection").and_then(ActionValue::as_str), Some("chapter 3"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_opaque_downcast_and_identity() {
        struct Bookmark(u32);

        let value = ActionValue::opaque(Bookmark(12));
        assert_eq!(value.downcast_ref::<Bookmark>().map(|b| b.0), Some(12));
        assert!(value.downcast_ref::<String>().is_none());
        assert_eq!(value, value.clone());
        assert_ne!(value, ActionValue::opaque(Bookmark(12)));
        assert!(value.to_json().is_none());
    }

    #[test]
    fn test_to_json() {
        let value = ActionValue::List(params![1, "a", true]);
        assert_eq!(value.to_json(), Some(serde_json::json!([1, "a", true])));
    }

    #[test]
    fn test_json_accessors() {
        let value = ActionValue::from(serde_json::json!("page-4"));
        assert_eq!(value.as_str(), Some("page-4"));
        assert_eq!(value.as_bool(), None);
        assert_eq!(ActionValue::from(serde_json::json!(true)).as_bool(), Some(true));
        assert_eq!(ActionValue::from(false).as_bool(), Some(false));
        assert_eq!(ActionValue::from(None::<i32>), ActionValue::Null);
    }
}
