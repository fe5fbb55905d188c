// File: rusty-forms/src/field_array.rs
// Purpose: Dynamic field arrays with stable item identity

use rusty_forms_types::{FieldPath, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FormError, Result};
use crate::form::FormStateManager;
use crate::watch::EventKind;

/// Stable identity of an array item.
///
/// Allocated once when the item is created and never reassigned, so a
/// presentation layer can key rows by it while indices shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// One row of a field array as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayFieldItem {
    pub id: ItemId,
    /// Current position, derived from order
    pub index: usize,
    pub value: Value,
}

/// Item ids of every field array in a form
#[derive(Debug, Clone, Default)]
pub struct FieldArrays {
    next_id: u64,
    ids: BTreeMap<FieldPath, Vec<ItemId>>,
}

impl FieldArrays {
    fn fresh(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Ids for the array at `name`, grown with fresh ids or truncated to `len`.
    ///
    /// Arrays replaced wholesale through `set_value` or `reset` keep the ids
    /// of their leading items.
    pub fn sync(&mut self, name: &FieldPath, len: usize) -> &mut Vec<ItemId> {
        let next_id = &mut self.next_id;
        let ids = self.ids.entry(name.clone()).or_default();
        while ids.len() < len {
            ids.push(ItemId(*next_id));
            *next_id += 1;
        }
        ids.truncate(len);
        ids
    }

    pub fn ids(&self, name: &FieldPath) -> Option<&[ItemId]> {
        self.ids.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &Vec<ItemId>)> {
        self.ids.iter()
    }

    /// Forget every id; the counter keeps running so ids are never reused
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub(crate) fn remap(&mut self, f: impl Fn(&FieldPath) -> Option<FieldPath>) {
        let ids = std::mem::take(&mut self.ids);
        self.ids = ids
            .into_iter()
            .filter_map(|(path, ids)| f(&path).map(|moved| (moved, ids)))
            .collect();
    }
}

/// Positional change applied to every path under an array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reindex {
    Remove(usize),
    Insert(usize),
    Swap(usize, usize),
    Move { from: usize, to: usize },
}

impl Reindex {
    /// New position of the item at `i`, `None` if it is gone
    fn map(self, i: usize) -> Option<usize> {
        match self {
            Reindex::Remove(r) if i == r => None,
            Reindex::Remove(r) if i > r => Some(i - 1),
            Reindex::Insert(at) if i >= at => Some(i + 1),
            Reindex::Swap(a, b) if i == a => Some(b),
            Reindex::Swap(a, b) if i == b => Some(a),
            Reindex::Move { from, to } if i == from => Some(to),
            Reindex::Move { from, to } if from < to && i > from && i <= to => Some(i - 1),
            Reindex::Move { from, to } if from > to && i >= to && i < from => Some(i + 1),
            _ => Some(i),
        }
    }

    /// Rewrite `path` if it lives under an item of `array`
    pub(crate) fn apply(self, array: &FieldPath, path: &FieldPath) -> Option<FieldPath> {
        match path.index_under(array) {
            Some(i) => self.map(i).map(|j| path.with_index_under(array, j)),
            None => Some(path.clone()),
        }
    }
}

/// Scoped controller for the array at one path.
///
/// Obtained from [`FormStateManager::field_array`]. Every operation keeps
/// item ids, stored values, registered fields, visible errors and
/// touched/dirty marks aligned with the new order.
///
/// ```
/// use rusty_forms::FormStateManager;
/// use serde_json::json;
///
/// let mut form = FormStateManager::new(json!({ "phNumbers": [{ "number": "" }] }));
/// let mut phones = form.field_array("phNumbers").unwrap();
/// phones.append(json!({ "number": "555-0100" })).unwrap();
/// let ids: Vec<_> = phones.fields().iter().map(|item| item.id).collect();
///
/// phones.remove(0).unwrap();
/// assert_eq!(phones.fields()[0].id, ids[1]);
/// ```
pub struct FieldArray<'a> {
    form: &'a mut FormStateManager,
    name: FieldPath,
}

impl<'a> FieldArray<'a> {
    pub(crate) fn new(form: &'a mut FormStateManager, name: FieldPath) -> Result<Self> {
        let len = form.store.array_mut(&name)?.len();
        form.arrays.sync(&name, len);
        Ok(Self { form, name })
    }

    pub fn name(&self) -> &FieldPath {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.form.store.array_len(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current rows; render them keyed by `id`, not `index`
    pub fn fields(&self) -> Vec<ArrayFieldItem> {
        let ids = self.form.arrays.ids(&self.name).unwrap_or_default();
        let values = self
            .form
            .store
            .get(&self.name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        ids.iter()
            .zip(values)
            .enumerate()
            .map(|(index, (id, value))| ArrayFieldItem {
                id: *id,
                index,
                value: value.clone(),
            })
            .collect()
    }

    /// Add an item at the end
    pub fn append(&mut self, item: impl Into<Value>) -> Result<ItemId> {
        let len = self.len();
        self.insert(len, item)
    }

    /// Add an item at the start
    pub fn prepend(&mut self, item: impl Into<Value>) -> Result<ItemId> {
        self.insert(0, item)
    }

    /// Add an item at `index`, shifting later items up
    pub fn insert(&mut self, index: usize, item: impl Into<Value>) -> Result<ItemId> {
        self.check_index(index, self.len() + 1)?;
        self.form.store.array_mut(&self.name)?.insert(index, item.into());
        self.form.reindex(&self.name, Reindex::Insert(index));

        let id = self.form.arrays.fresh();
        let len = self.len();
        let ids = self.form.arrays.sync(&self.name, len - 1);
        ids.insert(index, id);

        tracing::debug!(array = %self.name, index, %id, "field array insert");
        self.form.after_array_change(&self.name);
        Ok(id)
    }

    /// Remove the item at `index`, shifting later items down.
    ///
    /// Ids and values of the remaining items are unchanged. Index 0 is as
    /// removable as any other.
    pub fn remove(&mut self, index: usize) -> Result<ArrayFieldItem> {
        self.check_index(index, self.len())?;
        let value = self.form.store.array_mut(&self.name)?.remove(index);
        let len = self.len();
        let ids = self.form.arrays.sync(&self.name, len + 1);
        let id = ids.remove(index);

        let item_path = self.name.clone().index(index);
        self.form.registry.unregister_under(&item_path);
        self.form.reindex(&self.name, Reindex::Remove(index));

        tracing::debug!(array = %self.name, index, %id, "field array remove");
        self.form.after_array_change(&self.name);
        Ok(ArrayFieldItem { id, index, value })
    }

    /// Exchange two items
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.len();
        self.check_index(a, len)?;
        self.check_index(b, len)?;
        self.form.store.array_mut(&self.name)?.swap(a, b);
        self.form.arrays.sync(&self.name, len).swap(a, b);
        self.form.reindex(&self.name, Reindex::Swap(a, b));

        tracing::debug!(array = %self.name, a, b, "field array swap");
        self.form.after_array_change(&self.name);
        Ok(())
    }

    /// Move the item at `from` so it ends up at `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.len();
        self.check_index(from, len)?;
        self.check_index(to, len)?;

        let values = self.form.store.array_mut(&self.name)?;
        let value = values.remove(from);
        values.insert(to, value);

        let ids = self.form.arrays.sync(&self.name, len);
        let id = ids.remove(from);
        ids.insert(to, id);

        self.form.reindex(&self.name, Reindex::Move { from, to });

        tracing::debug!(array = %self.name, from, to, "field array move");
        self.form.after_array_change(&self.name);
        Ok(())
    }

    /// Replace the value of one item, keeping its id
    pub fn update(&mut self, index: usize, item: impl Into<Value>) -> Result<()> {
        self.check_index(index, self.len())?;
        self.form.store.array_mut(&self.name)?[index] = item.into();

        tracing::debug!(array = %self.name, index, "field array update");
        self.form.after_array_change(&self.name);
        Ok(())
    }

    /// Replace every item; all rows get fresh ids
    pub fn replace<I, V>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = items.into_iter().map(Into::into).collect();
        let len = values.len();
        *self.form.store.array_mut(&self.name)? = values;

        self.form.drop_items(&self.name);
        self.form.arrays.sync(&self.name, 0);
        self.form.arrays.sync(&self.name, len);

        tracing::debug!(array = %self.name, len, "field array replace");
        self.form.after_array_change(&self.name);
        Ok(())
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<()> {
        if index < bound {
            Ok(())
        } else {
            tracing::warn!(array = %self.name, index, bound, "field array index out of bounds");
            Err(FormError::IndexOutOfBounds {
                path: self.name.clone(),
                index,
                len: self.len(),
            })
        }
    }
}

impl FormStateManager {
    /// Controller for the field array at `name`.
    ///
    /// Fails with [`FormError::NotAnArray`] when a non-array value is stored
    /// there; a missing value starts as an empty array.
    pub fn field_array(&mut self, name: impl Into<FieldPath>) -> Result<FieldArray<'_>> {
        FieldArray::new(self, name.into())
    }

    pub(crate) fn after_array_change(&mut self, name: &FieldPath) {
        if self.store.differs_from_default(name) {
            self.interaction.mark_dirty(name);
        }
        if self
            .config
            .validates_on_change(self.interaction.is_submitted, true)
        {
            let paths: Vec<FieldPath> = self.registry.under(name).map(|e| e.path.clone()).collect();
            for path in &paths {
                self.refresh_error(path);
            }
        }
        self.notify(Some(name), EventKind::Array);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Reindex::Remove(1), [Some(0), None, Some(1), Some(2)])]
    #[case(Reindex::Insert(1), [Some(0), Some(2), Some(3), Some(4)])]
    #[case(Reindex::Swap(0, 3), [Some(3), Some(1), Some(2), Some(0)])]
    #[case(Reindex::Move { from: 0, to: 2 }, [Some(2), Some(0), Some(1), Some(3)])]
    #[case(Reindex::Move { from: 3, to: 1 }, [Some(0), Some(2), Some(3), Some(1)])]
    fn test_reindex_positions(#[case] op: Reindex, #[case] expected: [Option<usize>; 4]) {
        let mapped: Vec<Option<usize>> = (0..4).map(|i| op.map(i)).collect();
        assert_eq!(mapped, expected.to_vec());
    }

    #[test]
    fn test_reindex_only_touches_items_of_array() {
        let array = FieldPath::from("phNumbers");
        let op = Reindex::Remove(0);
        assert_eq!(
            op.apply(&array, &FieldPath::from("phNumbers.1.number")),
            Some(FieldPath::from("phNumbers.0.number"))
        );
        assert_eq!(op.apply(&array, &FieldPath::from("phNumbers.0.number")), None);
        assert_eq!(
            op.apply(&array, &FieldPath::from("phoneNumbers.1")),
            Some(FieldPath::from("phoneNumbers.1"))
        );
        assert_eq!(op.apply(&array, &array), Some(array.clone()));
    }

    #[test]
    fn test_sync_keeps_leading_ids() {
        let mut arrays = FieldArrays::default();
        let name = FieldPath::from("list");
        let first: Vec<ItemId> = arrays.sync(&name, 2).clone();
        let grown: Vec<ItemId> = arrays.sync(&name, 3).clone();
        assert_eq!(&grown[..2], &first[..]);
        assert!(grown[2] > first[1]);

        arrays.sync(&name, 1);
        assert_eq!(arrays.ids(&name), Some(&first[..1]));
    }
}
