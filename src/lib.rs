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

//! # Shop Demo
//!
//! This library provides the order-management core of a bookshop: member
//! registration, a catalog with stock tracking, and order placement and
//! cancellation as all-or-nothing operations.
//!
//! ## Core Components
//!
//! - [`Shop`]: Order workflow service owning all members, items, and orders
//! - [`Item`]: Catalog item with its stock ledger
//! - [`Order`]: Order aggregate with its lines and delivery
//! - [`Store`] / [`UnitOfWork`]: Versioned storage and explicit transactions
//! - [`ShopError`]: Error types for failed operations
//!
//! ## Example
//!
//! ```
//! use shop_demo_rs::{Address, NewItem, OrderStatus, Shop};
//! use rust_decimal_macros::dec;
//!
//! let shop = Shop::new();
//! let member = shop
//!     .register_member("kim", Address::new("Seoul", "Teheran-ro", "12345"))
//!     .unwrap();
//! let book = shop
//!     .add_item(NewItem::book("JPA Basics", dec!(10000), 10, "kim", "isbn-1"))
//!     .unwrap();
//!
//! // Place an order for two copies
//! let order_id = shop.place_order(member, book, 2).unwrap();
//! assert_eq!(shop.find_order(order_id).unwrap().total_price(), dec!(20000));
//! assert_eq!(shop.find_item(book).unwrap().stock_quantity(), 8);
//!
//! // Cancel it and the stock comes back
//! shop.cancel_order(order_id).unwrap();
//! assert_eq!(shop.find_order(order_id).unwrap().status(), OrderStatus::Cancel);
//! assert_eq!(shop.find_item(book).unwrap().stock_quantity(), 10);
//! ```
//!
//! ## Thread Safety
//!
//! [`Shop`] is `Send + Sync` and can be shared behind an `Arc`. Concurrent
//! operations on the same item are serialized at commit time through
//! optimistic version checks, so stock is never oversold.

mod base;
pub mod config;
pub mod error;
pub mod item;
pub mod member;
pub mod order;
pub mod query;
mod shop;
pub mod store;

pub use base::{EntityRef, ItemId, MemberId, OrderId};
pub use config::ShopConfig;
pub use error::{OrderStateViolation, ShopError};
pub use item::{Item, ItemKind, ItemUpdate, NewItem};
pub use member::{Address, Member};
pub use order::{Delivery, DeliveryStatus, Order, OrderItem, OrderStatus};
pub use query::{OrderSearch, OrderSummary};
pub use shop::Shop;
pub use store::{Store, UnitOfWork};
