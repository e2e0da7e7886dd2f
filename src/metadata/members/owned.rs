//! Member collections that track which container an element belongs to.
//!
//! Every member (type, field, method, parameter, ...) carries an [`OwnerSlot`]. An
//! [`OwnedList`] fills the slot when an element is added and clears it when the element is
//! removed, so an element can be part of at most one collection at a time. Adding an element
//! that is still owned fails with [`crate::Error::AlreadyOwned`].

use std::sync::{
    atomic::{AtomicU32, AtomicU64, Ordering},
    Arc, RwLock,
};

use crate::{metadata::token::Token, Error::AlreadyOwned, Result};

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct Owner {
    id: u64,
    label: String,
}

/// Back-reference from a member to the collection holding it
#[derive(Debug, Default)]
pub struct OwnerSlot {
    owner: RwLock<Option<Owner>>,
}

impl OwnerSlot {
    /// Description of the owning collection, e.g. `methods of App.Widget`
    pub fn owner(&self) -> Option<String> {
        read_lock!(self.owner).as_ref().map(|owner| owner.label.clone())
    }

    /// Returns true if the element is part of a collection
    pub fn is_owned(&self) -> bool {
        read_lock!(self.owner).is_some()
    }

    fn attach(&self, owner: &Owner) -> Result<()> {
        let mut slot = write_lock!(self.owner);
        if let Some(current) = slot.as_ref() {
            return Err(AlreadyOwned(current.label.clone()));
        }

        *slot = Some(owner.clone());
        Ok(())
    }

    fn detach(&self, owner_id: u64) -> bool {
        let mut slot = write_lock!(self.owner);
        match slot.as_ref() {
            Some(current) if current.id == owner_id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}

/// Implemented by every member that can be placed into an [`OwnedList`]
pub trait Owned: Send + Sync {
    /// The owner back-reference of this element
    fn owner_slot(&self) -> &OwnerSlot;
}

/// An ordered collection of members that owns its elements.
pub struct OwnedList<T: Owned> {
    owner: Owner,
    items: RwLock<Vec<Arc<T>>>,
}

impl<T: Owned> OwnedList<T> {
    /// Creates an empty collection; `label` describes it in ownership errors
    pub fn new(label: impl Into<String>) -> Self {
        OwnedList {
            owner: Owner {
                id: NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed),
                label: label.into(),
            },
            items: RwLock::new(Vec::new()),
        }
    }

    /// Appends `item` and takes ownership of it, returning its 0-based position
    ///
    /// # Errors
    /// Returns [`crate::Error::AlreadyOwned`] if `item` is already part of a collection.
    pub fn add(&self, item: Arc<T>) -> Result<usize> {
        item.owner_slot().attach(&self.owner)?;

        let mut items = write_lock!(self.items);
        items.push(item);
        Ok(items.len() - 1)
    }

    /// Removes `item` and releases it; returns false if it is not part of this collection
    pub fn remove(&self, item: &Arc<T>) -> bool {
        let mut items = write_lock!(self.items);
        let Some(position) = items.iter().position(|known| Arc::ptr_eq(known, item)) else {
            return false;
        };

        let removed = items.remove(position);
        removed.owner_slot().detach(self.owner.id);
        true
    }

    /// Returns true if `item` is part of this collection
    pub fn contains(&self, item: &Arc<T>) -> bool {
        read_lock!(self.items)
            .iter()
            .any(|known| Arc::ptr_eq(known, item))
    }

    /// The element at `index`
    pub fn get(&self, index: usize) -> Option<Arc<T>> {
        read_lock!(self.items).get(index).cloned()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        read_lock!(self.items).len()
    }

    /// Returns true if there are no elements
    pub fn is_empty(&self) -> bool {
        read_lock!(self.items).is_empty()
    }

    /// A snapshot of the elements, in insertion order
    pub fn to_vec(&self) -> Vec<Arc<T>> {
        read_lock!(self.items).clone()
    }

    /// Returns the first element matching `predicate`
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<Arc<T>> {
        read_lock!(self.items)
            .iter()
            .find(|item| predicate(item))
            .cloned()
    }

    /// Description of this collection
    pub fn label(&self) -> &str {
        &self.owner.label
    }
}

impl<T: Owned> Drop for OwnedList<T> {
    fn drop(&mut self) {
        if let Ok(items) = self.items.get_mut() {
            for item in items.iter() {
                item.owner_slot().detach(self.owner.id);
            }
        }
    }
}

impl<T: Owned + std::fmt::Debug> std::fmt::Debug for OwnedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedList")
            .field("owner", &self.owner.label)
            .field("items", &*read_lock!(self.items))
            .finish()
    }
}

/// The metadata token a member was read from or assigned on write, null until then
#[derive(Debug, Default)]
pub struct TokenCell(AtomicU32);

impl TokenCell {
    /// A cell holding `token`
    #[must_use]
    pub fn new(token: Token) -> Self {
        TokenCell(AtomicU32::new(token.value()))
    }

    /// The current token
    pub fn get(&self) -> Token {
        Token::new(self.0.load(Ordering::Acquire))
    }

    /// Replaces the token
    pub fn set(&self, token: Token) {
        self.0.store(token.value(), Ordering::Release);
    }

    /// The row id of the current token, 0 if none was assigned
    pub fn row(&self) -> u32 {
        self.get().row()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::tables::TableId, Error};

    #[derive(Debug, Default)]
    struct Item {
        owner: OwnerSlot,
    }

    impl Owned for Item {
        fn owner_slot(&self) -> &OwnerSlot {
            &self.owner
        }
    }

    #[test]
    fn single_owner() {
        let first = OwnedList::new("first");
        let second = OwnedList::new("second");
        let item = Arc::new(Item::default());

        assert_eq!(first.add(item.clone()).unwrap(), 0);
        assert_eq!(item.owner.owner().as_deref(), Some("first"));
        assert!(matches!(second.add(item.clone()), Err(Error::AlreadyOwned(owner)) if owner == "first"));
        assert!(matches!(first.add(item.clone()), Err(Error::AlreadyOwned(_))));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());

        assert!(!second.remove(&item));
        assert!(first.remove(&item));
        assert!(!item.owner.is_owned());
        assert_eq!(second.add(item.clone()).unwrap(), 0);
        assert!(second.contains(&item));
    }

    #[test]
    fn dropping_the_list_releases() {
        let item = Arc::new(Item::default());
        {
            let list = OwnedList::new("temporary");
            list.add(item.clone()).unwrap();
        }
        assert!(!item.owner.is_owned());
    }

    #[test]
    fn token_cell() {
        let cell = TokenCell::default();
        assert_eq!(cell.row(), 0);
        cell.set(Token::from_parts(TableId::MethodDef, 7));
        assert_eq!(cell.get().value(), 0x0600_0007);
        assert_eq!(cell.row(), 7);
    }
}
