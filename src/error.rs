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

//! Error types for shop operations.

use crate::base::{EntityRef, ItemId, OrderId};
use std::fmt;
use thiserror::Error;

/// Why an order refused a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStateViolation {
    /// The delivery already completed, so the order can no longer be canceled.
    DeliveryCompleted,
    /// The order was canceled earlier.
    AlreadyCanceled,
}

impl fmt::Display for OrderStateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeliveryCompleted => f.write_str("delivery already completed"),
            Self::AlreadyCanceled => f.write_str("order already canceled"),
        }
    }
}

/// Shop processing errors.
///
/// Every variant is recoverable at the workflow boundary. When an operation
/// fails, none of its mutations are applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// Removing stock would leave a negative quantity
    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// Order cannot move to the requested state
    #[error("illegal state change for order {order_id}: {violation}")]
    IllegalOrderState {
        order_id: OrderId,
        violation: OrderStateViolation,
    },

    /// A member with the same name is already registered
    #[error("member name already registered: {0}")]
    DuplicateMember(String),

    /// Referenced member, item, or order does not exist
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// Quantity is zero
    #[error("invalid quantity (must be positive)")]
    InvalidQuantity,

    /// Price is negative
    #[error("invalid price (must not be negative)")]
    InvalidPrice,

    /// Member name is empty
    #[error("invalid member name (must not be empty)")]
    InvalidMemberName,

    /// Order has no lines
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Book-only field set on another item kind
    #[error("item {0} is not a book")]
    NotABook(ItemId),

    /// Order amount does not fit a `Decimal`
    #[error("order amount overflows")]
    AmountOverflow,

    /// Another commit changed the same rows, and retries ran out
    #[error("write conflict (concurrent modification)")]
    WriteConflict,
}

impl ShopError {
    /// Returns `true` for errors caused by a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
