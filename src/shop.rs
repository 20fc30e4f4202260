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

//! Order workflow service.
//!
//! The [`Shop`] is the central component. It registers members, maintains the
//! catalog, and places and cancels orders.
//!
//! # Operations
//!
//! - **Register member**: Rejects a name that is already taken.
//! - **Place order**: Takes stock and creates the order and its delivery.
//! - **Cancel order**: Marks the order canceled and returns its stock.
//! - **Complete delivery**: Marks the delivery completed, after which the
//!   order can no longer be canceled.
//!
//! # Atomicity
//!
//! Every mutating operation runs inside one [`UnitOfWork`]. If any step
//! fails, the unit of work is dropped and nothing is applied. When a commit
//! loses a race with another commit, the whole operation is re-run, up to
//! [`ShopConfig::max_commit_retries`] times.

use crate::base::{ItemId, MemberId, OrderId};
use crate::config::ShopConfig;
use crate::error::ShopError;
use crate::item::{Item, ItemUpdate, NewItem};
use crate::member::{Address, Member};
use crate::order::{Delivery, Order, OrderItem};
use crate::query::{OrderSearch, OrderSummary};
use crate::store::{Store, UnitOfWork};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Order workflow service over a [`Store`].
///
/// # Invariants
///
/// - Item stock never goes negative.
/// - An order's total always equals the sum of its line totals.
/// - Orders only move `Order` -> `Cancel`, and never after delivery completes.
/// - Member names are unique.
#[derive(Debug, Default)]
pub struct Shop {
    store: Store,
    config: ShopConfig,
}

impl Shop {
    /// Creates an empty shop with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ShopConfig::default())
    }

    pub fn with_config(config: ShopConfig) -> Self {
        Shop {
            store: Store::new(),
            config,
        }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    // === Members ===

    /// Registers a new member.
    ///
    /// The lookup by name is only a fast path. The store's unique name index
    /// decides when two registrations race.
    ///
    /// # Errors
    ///
    /// - [`ShopError::DuplicateMember`] - a member with this exact name exists.
    /// - [`ShopError::InvalidMemberName`] - the name is blank.
    pub fn register_member(
        &self,
        name: impl Into<String>,
        address: Address,
    ) -> Result<MemberId, ShopError> {
        let name = name.into();
        if self.store.member_by_name(&name).is_some() {
            return Err(ShopError::DuplicateMember(name));
        }
        let member_id = self.store.insert_member(name, address)?;
        debug!(%member_id, "member registered");
        Ok(member_id)
    }

    /// Changes a member's name.
    ///
    /// Placed orders keep pointing at the member, so searches and summaries
    /// report the new name.
    ///
    /// # Errors
    ///
    /// - [`ShopError::NotFound`] - the member does not exist.
    /// - [`ShopError::InvalidMemberName`] - the name is blank.
    /// - [`ShopError::DuplicateMember`] - another member has this exact name.
    pub fn update_member_name(
        &self,
        member_id: MemberId,
        name: impl Into<String>,
    ) -> Result<(), ShopError> {
        self.store.rename_member(member_id, name.into())?;
        debug!(%member_id, "member renamed");
        Ok(())
    }

    pub fn find_member(&self, member_id: MemberId) -> Option<Member> {
        self.store.member(member_id)
    }

    /// Returns all members ordered by id.
    pub fn members(&self) -> Vec<Member> {
        self.store.members()
    }

    // === Catalog ===

    /// Adds an item to the catalog.
    ///
    /// # Errors
    ///
    /// [`ShopError::InvalidPrice`] if the price is negative.
    pub fn add_item(&self, new_item: NewItem) -> Result<ItemId, ShopError> {
        let item_id = self.store.insert_item(new_item)?;
        debug!(%item_id, "item added");
        Ok(item_id)
    }

    /// Edits an item's name, price, and stock, and a book's author.
    ///
    /// Orders already placed keep the price they captured.
    ///
    /// # Errors
    ///
    /// - [`ShopError::NotFound`] - the item does not exist.
    /// - [`ShopError::InvalidPrice`] - the new price is negative.
    /// - [`ShopError::NotABook`] - an author was given for a non-book item.
    pub fn update_item(&self, item_id: ItemId, update: ItemUpdate) -> Result<(), ShopError> {
        self.transact("update_item", |uow| {
            uow.item_mut(item_id)?.apply_update(update.clone())
        })?;
        debug!(%item_id, "item updated");
        Ok(())
    }

    pub fn find_item(&self, item_id: ItemId) -> Option<Item> {
        self.store.item(item_id)
    }

    /// Returns all items ordered by id.
    pub fn items(&self) -> Vec<Item> {
        self.store.items()
    }

    // === Orders ===

    /// Places an order for `quantity` units of one item.
    ///
    /// The delivery address is copied from the member, and the line captures
    /// the item's current price.
    ///
    /// # Errors
    ///
    /// - [`ShopError::NotFound`] - the member or the item does not exist.
    /// - [`ShopError::InvalidQuantity`] - `quantity` is zero.
    /// - [`ShopError::InsufficientStock`] - not enough stock; nothing changes.
    /// - [`ShopError::AmountOverflow`] - the order total does not fit a
    ///   `Decimal`; nothing changes.
    /// - [`ShopError::WriteConflict`] - retries exhausted under contention.
    pub fn place_order(
        &self,
        member_id: MemberId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<OrderId, ShopError> {
        self.place_order_lines(member_id, &[(item_id, quantity)])
    }

    /// Places one order with several lines.
    ///
    /// If any line fails, stock already taken by earlier lines is not
    /// applied either.
    ///
    /// # Errors
    ///
    /// Same as [`place_order`](Self::place_order), plus
    /// [`ShopError::EmptyOrder`] if `lines` is empty.
    pub fn place_order_lines(
        &self,
        member_id: MemberId,
        lines: &[(ItemId, u32)],
    ) -> Result<OrderId, ShopError> {
        if lines.is_empty() {
            return Err(ShopError::EmptyOrder);
        }

        let order = self.transact("place_order", |uow| {
            let member = uow.member(member_id)?;
            let mut order_items = Vec::with_capacity(lines.len());
            for &(item_id, quantity) in lines {
                let item = uow.item_mut(item_id)?;
                order_items.push(OrderItem::create(item, quantity)?);
            }

            let delivery = Delivery::new(member.address().clone());
            let order = Order::create(
                self.store.next_order_id(),
                member_id,
                delivery,
                order_items,
            )?;
            uow.insert_order(order.clone());
            Ok(order)
        })?;

        info!(
            order_id = %order.id(),
            %member_id,
            lines = order.order_items().len(),
            total = %order.total_price(),
            "order placed"
        );
        Ok(order.id())
    }

    /// Cancels an order and returns its stock.
    ///
    /// # Errors
    ///
    /// - [`ShopError::NotFound`] - the order does not exist.
    /// - [`ShopError::IllegalOrderState`] - the delivery completed or the order
    ///   is already canceled; nothing changes.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<(), ShopError> {
        self.transact("cancel_order", |uow| {
            let restock = uow.order_mut(order_id)?.cancel()?;
            for (item_id, quantity) in restock {
                uow.item_mut(item_id)?.add_stock(quantity);
            }
            Ok(())
        })?;
        info!(%order_id, "order canceled");
        Ok(())
    }

    /// Marks an order's delivery as completed.
    ///
    /// # Errors
    ///
    /// - [`ShopError::NotFound`] - the order does not exist.
    /// - [`ShopError::IllegalOrderState`] - the order was canceled.
    pub fn complete_delivery(&self, order_id: OrderId) -> Result<(), ShopError> {
        self.transact("complete_delivery", |uow| {
            uow.order_mut(order_id)?.complete_delivery()
        })?;
        info!(%order_id, "delivery completed");
        Ok(())
    }

    pub fn find_order(&self, order_id: OrderId) -> Option<Order> {
        self.store.order(order_id)
    }

    /// Returns the orders placed by one member, ordered by id.
    pub fn orders_by_member(&self, member_id: MemberId) -> Vec<Order> {
        self.store
            .orders_where(|order| order.member_id() == member_id)
    }

    /// Returns orders matching `search`, ordered by id and capped at
    /// [`ShopConfig::search_limit`].
    pub fn search_orders(&self, search: &OrderSearch) -> Vec<Order> {
        self.search_with_names(search)
            .into_iter()
            .map(|(order, _)| order)
            .collect()
    }

    /// Like [`search_orders`](Self::search_orders), flattened into rows that
    /// carry the member name and delivery address.
    pub fn order_summaries(&self, search: &OrderSearch) -> Vec<OrderSummary> {
        self.search_with_names(search)
            .into_iter()
            .map(|(order, member_name)| OrderSummary::new(&order, member_name))
            .collect()
    }

    fn search_with_names(&self, search: &OrderSearch) -> Vec<(Order, String)> {
        let names: HashMap<MemberId, String> = self
            .store
            .members()
            .into_iter()
            .map(|member| (member.id(), member.name().to_string()))
            .collect();

        self.store
            .orders_where(|order| {
                names
                    .get(&order.member_id())
                    .is_some_and(|name| search.matches(order, name))
            })
            .into_iter()
            .take(self.config.search_limit)
            .filter_map(|order| {
                let name = names.get(&order.member_id())?.clone();
                Some((order, name))
            })
            .collect()
    }

    /// Runs `work` in a fresh unit of work and commits it, re-running on
    /// write conflicts.
    fn transact<T>(
        &self,
        operation: &'static str,
        mut work: impl FnMut(&mut UnitOfWork<'_>) -> Result<T, ShopError>,
    ) -> Result<T, ShopError> {
        let mut attempt = 0;
        loop {
            let mut uow = self.store.begin();
            let value = work(&mut uow)?;
            match uow.commit() {
                Ok(()) => return Ok(value),
                Err(ShopError::WriteConflict) if attempt < self.config.max_commit_retries => {
                    attempt += 1;
                    warn!(operation, attempt, "write conflict, retrying");
                }
                Err(error) => return Err(error),
            }
        }
    }
}
