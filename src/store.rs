// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! In-process storage with optimistic versioning and explicit units of work.
//!
//! Items and orders carry a version that is bumped on every committed write.
//! A [`UnitOfWork`] stages cloned copies of the rows it touches together with
//! the versions it read. [`UnitOfWork::commit`] validates those versions and
//! applies every staged write under one exclusive lock, or applies nothing.
//! Dropping a unit of work without committing discards it.
//!
//! Members are written once and never updated, so they are not versioned.
//! Name uniqueness is enforced by an index updated with the [`DashMap`] entry
//! API, which makes the check-and-insert atomic.

use crate::ShopError;
use crate::base::{EntityRef, ItemId, MemberId, OrderId};
use crate::item::{Item, NewItem};
use crate::member::{Address, Member};
use crate::order::Order;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug)]
struct Versioned<T> {
    version: u64,
    value: T,
}

/// A row copied into a unit of work.
///
/// `read_version` is `None` for rows created inside the unit of work.
#[derive(Debug)]
struct Staged<T> {
    read_version: Option<u64>,
    value: T,
}

/// Entity storage shared by all shop operations.
#[derive(Debug)]
pub struct Store {
    members: DashMap<MemberId, Member>,
    /// Unique index over member names.
    member_names: DashMap<String, MemberId>,
    items: DashMap<ItemId, Versioned<Item>>,
    orders: DashMap<OrderId, Versioned<Order>>,

    member_seq: AtomicU64,
    item_seq: AtomicU64,
    order_seq: AtomicU64,

    /// Held exclusively while a commit applies its writes and shared by
    /// readers, so no reader observes half of a commit.
    commit_lock: RwLock<()>,
    /// Serializes renames, so a member's index entry and its stored name
    /// always agree.
    rename_lock: Mutex<()>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
            member_names: DashMap::new(),
            items: DashMap::new(),
            orders: DashMap::new(),
            member_seq: AtomicU64::new(1),
            item_seq: AtomicU64::new(1),
            order_seq: AtomicU64::new(1),
            commit_lock: RwLock::new(()),
            rename_lock: Mutex::new(()),
        }
    }

    /// Starts a new unit of work.
    pub fn begin(&self) -> UnitOfWork<'_> {
        UnitOfWork {
            store: self,
            items: HashMap::new(),
            orders: HashMap::new(),
            committed: false,
        }
    }

    /// Inserts a member, reserving its name.
    ///
    /// # Errors
    ///
    /// - [`ShopError::DuplicateMember`] - the name is already taken.
    /// - [`ShopError::InvalidMemberName`] - the name is blank.
    pub fn insert_member(&self, name: String, address: Address) -> Result<MemberId, ShopError> {
        Member::validate_name(&name)?;
        match self.member_names.entry(name) {
            Entry::Occupied(entry) => Err(ShopError::DuplicateMember(entry.key().clone())),
            Entry::Vacant(entry) => {
                let id = MemberId(self.member_seq.fetch_add(1, Ordering::SeqCst));
                let member = Member::new(id, entry.key().clone(), address)?;
                self.members.insert(id, member);
                entry.insert(id);
                Ok(id)
            }
        }
    }

    /// Renames a member, moving its entry in the name index.
    ///
    /// The new name is reserved before the old one is released, so at no
    /// point can another registration take either name from under the
    /// member. Renaming to the current name is a no-op.
    ///
    /// # Errors
    ///
    /// - [`ShopError::InvalidMemberName`] - the name is blank.
    /// - [`ShopError::NotFound`] - the member does not exist.
    /// - [`ShopError::DuplicateMember`] - another member holds the name.
    pub fn rename_member(&self, id: MemberId, name: String) -> Result<(), ShopError> {
        Member::validate_name(&name)?;
        let _rename = self.rename_lock.lock();

        let old_name = self
            .member(id)
            .ok_or(ShopError::NotFound(EntityRef::Member(id)))?
            .name()
            .to_string();
        if old_name == name {
            return Ok(());
        }

        match self.member_names.entry(name.clone()) {
            Entry::Occupied(entry) => {
                return Err(ShopError::DuplicateMember(entry.key().clone()));
            }
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }
        if let Some(mut member) = self.members.get_mut(&id) {
            member.rename(name);
        }
        self.member_names.remove_if(&old_name, |_, owner| *owner == id);
        Ok(())
    }

    pub fn member(&self, id: MemberId) -> Option<Member> {
        self.members.get(&id).map(|member| member.value().clone())
    }

    /// Looks up a member by exact, case-sensitive name.
    pub fn member_by_name(&self, name: &str) -> Option<Member> {
        let id = *self.member_names.get(name)?;
        self.member(id)
    }

    /// Returns all members ordered by id.
    pub fn members(&self) -> Vec<Member> {
        let mut members: Vec<Member> = self.members.iter().map(|m| m.value().clone()).collect();
        members.sort_by_key(Member::id);
        members
    }

    /// Inserts a new catalog item.
    ///
    /// # Errors
    ///
    /// [`ShopError::InvalidPrice`] if the price is negative.
    pub fn insert_item(&self, new_item: NewItem) -> Result<ItemId, ShopError> {
        let id = ItemId(self.item_seq.fetch_add(1, Ordering::SeqCst));
        let item = Item::new(id, new_item)?;
        self.items.insert(
            id,
            Versioned {
                version: 1,
                value: item,
            },
        );
        Ok(id)
    }

    pub fn item(&self, id: ItemId) -> Option<Item> {
        let _guard = self.commit_lock.read();
        self.items.get(&id).map(|row| row.value.clone())
    }

    /// Returns all items ordered by id.
    pub fn items(&self) -> Vec<Item> {
        let _guard = self.commit_lock.read();
        let mut items: Vec<Item> = self.items.iter().map(|row| row.value.clone()).collect();
        items.sort_by_key(Item::id);
        items
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        let _guard = self.commit_lock.read();
        self.orders.get(&id).map(|row| row.value.clone())
    }

    /// Returns all orders matching `filter`, ordered by id.
    pub fn orders_where(&self, filter: impl Fn(&Order) -> bool) -> Vec<Order> {
        let _guard = self.commit_lock.read();
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|row| filter(&row.value))
            .map(|row| row.value.clone())
            .collect();
        orders.sort_by_key(Order::id);
        orders
    }

    /// Allocates an order id. Ids of rolled-back orders are not reused.
    pub fn next_order_id(&self) -> OrderId {
        OrderId(self.order_seq.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit transaction handle over a [`Store`].
///
/// Reads copy the current row and remember its version; writes only touch
/// the copies. Nothing reaches the store until [`commit`](Self::commit)
/// succeeds.
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    store: &'a Store,
    items: HashMap<ItemId, Staged<Item>>,
    orders: HashMap<OrderId, Staged<Order>>,
    committed: bool,
}

impl UnitOfWork<'_> {
    /// Reads a member.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`] if the member does not exist.
    pub fn member(&self, id: MemberId) -> Result<Member, ShopError> {
        self.store
            .member(id)
            .ok_or(ShopError::NotFound(EntityRef::Member(id)))
    }

    /// Stages an item for modification and returns the staged copy.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`] if the item does not exist.
    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, ShopError> {
        match self.items.entry(id) {
            hash_map::Entry::Occupied(entry) => Ok(&mut entry.into_mut().value),
            hash_map::Entry::Vacant(entry) => {
                let staged = {
                    let _guard = self.store.commit_lock.read();
                    let row = self
                        .store
                        .items
                        .get(&id)
                        .ok_or(ShopError::NotFound(EntityRef::Item(id)))?;
                    Staged {
                        read_version: Some(row.version),
                        value: row.value.clone(),
                    }
                };
                Ok(&mut entry.insert(staged).value)
            }
        }
    }

    /// Stages an order for modification and returns the staged copy.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotFound`] if the order does not exist.
    pub fn order_mut(&mut self, id: OrderId) -> Result<&mut Order, ShopError> {
        match self.orders.entry(id) {
            hash_map::Entry::Occupied(entry) => Ok(&mut entry.into_mut().value),
            hash_map::Entry::Vacant(entry) => {
                let staged = {
                    let _guard = self.store.commit_lock.read();
                    let row = self
                        .store
                        .orders
                        .get(&id)
                        .ok_or(ShopError::NotFound(EntityRef::Order(id)))?;
                    Staged {
                        read_version: Some(row.version),
                        value: row.value.clone(),
                    }
                };
                Ok(&mut entry.insert(staged).value)
            }
        }
    }

    /// Stages a newly created order, together with everything it owns.
    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(
            order.id(),
            Staged {
                read_version: None,
                value: order,
            },
        );
    }

    /// Validates every staged version and applies all staged writes.
    ///
    /// # Errors
    ///
    /// [`ShopError::WriteConflict`] if another commit changed a staged row
    /// since it was read. Nothing is applied in that case.
    pub fn commit(mut self) -> Result<(), ShopError> {
        let store = self.store;
        let _guard = store.commit_lock.write();

        let items_current = self.items.iter().all(|(id, staged)| {
            store.items.get(id).map(|row| row.version) == staged.read_version
        });
        let orders_current = self.orders.iter().all(|(id, staged)| {
            store.orders.get(id).map(|row| row.version) == staged.read_version
        });
        if !(items_current && orders_current) {
            debug!(
                items = self.items.len(),
                orders = self.orders.len(),
                "commit rejected: stale version"
            );
            return Err(ShopError::WriteConflict);
        }

        let (items, orders) = (self.items.len(), self.orders.len());
        for (id, staged) in self.items.drain() {
            store.items.insert(
                id,
                Versioned {
                    version: next_version(staged.read_version),
                    value: staged.value,
                },
            );
        }
        for (id, staged) in self.orders.drain() {
            store.orders.insert(
                id,
                Versioned {
                    version: next_version(staged.read_version),
                    value: staged.value,
                },
            );
        }
        self.committed = true;
        debug!(items, orders, "unit of work committed");
        Ok(())
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.committed && !(self.items.is_empty() && self.orders.is_empty()) {
            debug!(
                items = self.items.len(),
                orders = self.orders.len(),
                "unit of work rolled back"
            );
        }
    }
}

fn next_version(read_version: Option<u64>) -> u64 {
    read_version.map_or(1, |version| version + 1)
}
