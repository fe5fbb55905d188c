// File: rusty-forms/src/watch.rs
// Purpose: Pure reads of watched paths and change subscriptions

use rusty_forms_types::{FieldPath, Value};
use std::fmt;

/// What a watcher observes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    /// The whole value tree
    All,
    Field(FieldPath),
    Fields(Vec<FieldPath>),
}

impl WatchTarget {
    pub fn field(path: impl Into<FieldPath>) -> Self {
        WatchTarget::Field(path.into())
    }

    pub fn fields<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        WatchTarget::Fields(paths.into_iter().map(Into::into).collect())
    }

    /// Whether a change at `changed` is visible through this target
    pub fn observes(&self, changed: &FieldPath) -> bool {
        match self {
            WatchTarget::All => true,
            WatchTarget::Field(path) => path.overlaps(changed),
            WatchTarget::Fields(paths) => paths.iter().any(|p| p.overlaps(changed)),
        }
    }

    /// Read the observed values out of `values`
    pub fn read(&self, values: &Value) -> Watched {
        match self {
            WatchTarget::All => Watched::All(values.clone()),
            WatchTarget::Field(path) => Watched::Field(values.get_path(path).cloned()),
            WatchTarget::Fields(paths) => {
                Watched::Fields(paths.iter().map(|p| values.get_path(p).cloned()).collect())
            }
        }
    }
}

impl From<&str> for WatchTarget {
    fn from(path: &str) -> Self {
        WatchTarget::field(path)
    }
}

impl From<FieldPath> for WatchTarget {
    fn from(path: FieldPath) -> Self {
        WatchTarget::Field(path)
    }
}

impl<const N: usize> From<[&str; N]> for WatchTarget {
    fn from(paths: [&str; N]) -> Self {
        WatchTarget::fields(paths)
    }
}

/// Result of a watch read, shaped like its target
#[derive(Debug, Clone, PartialEq)]
pub enum Watched {
    All(Value),
    Field(Option<Value>),
    Fields(Vec<Option<Value>>),
}

impl Watched {
    /// The single watched value, if this was a one-field watch
    pub fn into_field(self) -> Option<Value> {
        match self {
            Watched::Field(value) => value,
            _ => None,
        }
    }
}

/// What caused a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Input event from a bound field
    Change,
    /// Programmatic `set_value`
    SetValue,
    /// Field-array operation
    Array,
    Unregister,
    Reset,
}

/// Delivered to subscribers after a mutation has been applied
#[derive(Debug)]
pub struct WatchEvent<'a> {
    /// Changed path; `None` for whole-form events like reset
    pub name: Option<&'a FieldPath>,
    pub kind: EventKind,
    /// Whole value tree after the mutation
    pub values: &'a Value,
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

pub type WatchCallback = Box<dyn FnMut(&WatchEvent<'_>)>;

struct Subscription {
    id: SubscriptionId,
    target: WatchTarget,
    callback: WatchCallback,
}

/// Registered subscribers
#[derive(Default)]
pub struct Watchers {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for Watchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watchers")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl Watchers {
    pub fn subscribe<F>(&mut self, target: WatchTarget, callback: F) -> SubscriptionId
    where
        F: FnMut(&WatchEvent<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            target,
            callback: Box::new(callback),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Call every subscriber whose target overlaps `name`
    pub fn notify(&mut self, name: Option<&FieldPath>, kind: EventKind, values: &Value) {
        let event = WatchEvent { name, kind, values };
        for subscription in &mut self.subscriptions {
            let interested = match name {
                Some(path) => subscription.target.observes(path),
                None => true,
            };
            if interested {
                (subscription.callback)(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_target_overlap() {
        let target = WatchTarget::field("social");
        assert!(target.observes(&FieldPath::from("social.twitter")));
        assert!(!target.observes(&FieldPath::from("channel")));
        assert!(WatchTarget::All.observes(&FieldPath::from("channel")));

        let both = WatchTarget::from(["username", "channel"]);
        assert!(both.observes(&FieldPath::from("channel")));
        assert!(!both.observes(&FieldPath::from("email")));
    }

    #[test]
    fn test_read_shapes() {
        let values = Value::from(json!({ "username": "bruce", "channel": "" }));
        assert_eq!(
            WatchTarget::from("username").read(&values),
            Watched::Field(Some(Value::from("bruce")))
        );
        assert_eq!(
            WatchTarget::from(["username", "missing"]).read(&values),
            Watched::Fields(vec![Some(Value::from("bruce")), None])
        );
        assert_eq!(WatchTarget::All.read(&values), Watched::All(values.clone()));
    }

    #[test]
    fn test_notify_filters_by_target() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut watchers = Watchers::default();

        let log = Rc::clone(&seen);
        let id = watchers.subscribe(
            WatchTarget::field("username"),
            move |event| {
                log.borrow_mut()
                    .push(event.name.map(|p| p.to_string()).unwrap_or_default());
            },
        );

        let values = Value::object();
        watchers.notify(Some(&FieldPath::from("username")), EventKind::Change, &values);
        watchers.notify(Some(&FieldPath::from("email")), EventKind::Change, &values);
        watchers.notify(None, EventKind::Reset, &values);
        assert_eq!(*seen.borrow(), vec!["username".to_string(), String::new()]);

        assert!(watchers.unsubscribe(id));
        assert!(!watchers.unsubscribe(id));
        watchers.notify(None, EventKind::Reset, &values);
        assert_eq!(seen.borrow().len(), 2);
    }
}
