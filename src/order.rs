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

//! Order aggregate: an order, its line items, and its delivery.
//!
//! Orders follow a state machine:
//! - [`OrderStatus::Order`] → [`OrderStatus::Cancel`] (via cancel, only while
//!   the delivery is not [`DeliveryStatus::Comp`])
//!
//! Deliveries move [`DeliveryStatus::Ready`] → [`DeliveryStatus::Comp`].

use crate::base::{ItemId, MemberId, OrderId};
use crate::error::OrderStateViolation;
use crate::item::Item;
use crate::member::Address;
use crate::ShopError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Order,
    Cancel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Ready,
    Comp,
}

/// Shipping record owned by exactly one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    address: Address,
    status: DeliveryStatus,
}

impl Delivery {
    /// Creates a delivery ready to ship to `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            status: DeliveryStatus::Ready,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }
}

/// One order line.
///
/// Price and quantity are captured when the line is created and never change,
/// so later catalog price edits do not rewrite historical totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    item_id: ItemId,
    order_price: Decimal,
    count: u32,
}

impl OrderItem {
    /// Creates a line for `count` units of `item` and takes them from stock.
    ///
    /// # Errors
    ///
    /// - [`ShopError::InvalidQuantity`] - `count` is zero.
    /// - [`ShopError::InsufficientStock`] - the item cannot cover `count`.
    /// - [`ShopError::AmountOverflow`] - `price × count` does not fit a
    ///   `Decimal`; stock is left untouched.
    pub fn create(item: &mut Item, count: u32) -> Result<Self, ShopError> {
        item.price()
            .checked_mul(Decimal::from(count))
            .ok_or(ShopError::AmountOverflow)?;
        item.remove_stock(count)?;
        Ok(Self {
            item_id: item.id(),
            order_price: item.price(),
            count,
        })
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn order_price(&self) -> Decimal {
        self.order_price
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns `order_price × count`. Checked for overflow when the line was
    /// created.
    pub fn line_total(&self) -> Decimal {
        self.order_price * Decimal::from(self.count)
    }
}

/// Order aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    member_id: MemberId,
    order_items: Vec<OrderItem>,
    delivery: Delivery,
    order_date: DateTime<Utc>,
    status: OrderStatus,
}

impl Order {
    /// Assembles a new order in [`OrderStatus::Order`], stamped with the
    /// current time.
    ///
    /// # Errors
    ///
    /// - [`ShopError::EmptyOrder`] - `order_items` is empty.
    /// - [`ShopError::AmountOverflow`] - the sum of the line totals does not
    ///   fit a `Decimal`.
    pub fn create(
        id: OrderId,
        member_id: MemberId,
        delivery: Delivery,
        order_items: Vec<OrderItem>,
    ) -> Result<Self, ShopError> {
        if order_items.is_empty() {
            return Err(ShopError::EmptyOrder);
        }
        order_items
            .iter()
            .try_fold(Decimal::ZERO, |total, line| {
                total.checked_add(line.line_total())
            })
            .ok_or(ShopError::AmountOverflow)?;
        Ok(Self {
            id,
            member_id,
            order_items,
            delivery,
            order_date: Utc::now(),
            status: OrderStatus::Order,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn order_items(&self) -> &[OrderItem] {
        &self.order_items
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Sum of all line totals, recomputed on every call. The sum was checked
    /// for overflow when the order was created.
    pub fn total_price(&self) -> Decimal {
        self.order_items.iter().map(OrderItem::line_total).sum()
    }

    /// Cancels the order.
    ///
    /// On success returns the `(item, count)` pairs whose stock the caller
    /// must restore. The order is left unchanged on error.
    ///
    /// # Errors
    ///
    /// [`ShopError::IllegalOrderState`] if the delivery has completed or the
    /// order is already canceled.
    pub fn cancel(&mut self) -> Result<Vec<(ItemId, u32)>, ShopError> {
        if self.status == OrderStatus::Cancel {
            return Err(self.illegal(OrderStateViolation::AlreadyCanceled));
        }
        if self.delivery.status == DeliveryStatus::Comp {
            return Err(self.illegal(OrderStateViolation::DeliveryCompleted));
        }
        self.status = OrderStatus::Cancel;
        Ok(self
            .order_items
            .iter()
            .map(|line| (line.item_id, line.count))
            .collect())
    }

    /// Marks the delivery as completed. Completing twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`ShopError::IllegalOrderState`] if the order was canceled.
    pub fn complete_delivery(&mut self) -> Result<(), ShopError> {
        if self.status == OrderStatus::Cancel {
            return Err(self.illegal(OrderStateViolation::AlreadyCanceled));
        }
        self.delivery.status = DeliveryStatus::Comp;
        Ok(())
    }

    fn illegal(&self, violation: OrderStateViolation) -> ShopError {
        ShopError::IllegalOrderState {
            order_id: self.id,
            violation,
        }
    }
}
