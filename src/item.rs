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

//! Catalog items and their stock ledger.
//!
//! Stock is only changed through [`Item::remove_stock`] and
//! [`Item::add_stock`] (or a full [`ItemUpdate`]), never assigned directly.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use shop_demo_rs::{NewItem, Shop};
//!
//! let shop = Shop::new();
//! let id = shop
//!     .add_item(NewItem::book("Rust in Action", dec!(10000), 10, "McNamara", "isbn-1"))
//!     .unwrap();
//! assert_eq!(shop.find_item(id).unwrap().stock_quantity(), 10);
//! ```

use crate::ShopError;
use crate::base::ItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Closed set of item kinds. Kinds differ only in their descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    Book { author: String, isbn: String },
    Album { artist: String, etc: String },
    Movie { director: String, actor: String },
}

/// Input for registering a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl NewItem {
    pub fn book(
        name: impl Into<String>,
        price: Decimal,
        stock_quantity: u32,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            stock_quantity,
            categories: BTreeSet::new(),
            kind: ItemKind::Book {
                author: author.into(),
                isbn: isbn.into(),
            },
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }
}

/// Changes applied to an existing item.
///
/// `author` is only meaningful for books. The ISBN cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    #[serde(default)]
    pub author: Option<String>,
}

/// Catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    id: ItemId,
    name: String,
    price: Decimal,
    stock_quantity: u32,
    categories: BTreeSet<String>,
    kind: ItemKind,
}

impl Item {
    pub(crate) fn new(id: ItemId, new_item: NewItem) -> Result<Self, ShopError> {
        if new_item.price < Decimal::ZERO {
            return Err(ShopError::InvalidPrice);
        }
        Ok(Self {
            id,
            name: new_item.name,
            price: new_item.price,
            stock_quantity: new_item.stock_quantity,
            categories: new_item.categories,
            kind: new_item.kind,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Decreases stock.
    ///
    /// # Errors
    ///
    /// - [`ShopError::InvalidQuantity`] - `quantity` is zero.
    /// - [`ShopError::InsufficientStock`] - not enough stock; nothing changes.
    pub fn remove_stock(&mut self, quantity: u32) -> Result<(), ShopError> {
        if quantity == 0 {
            return Err(ShopError::InvalidQuantity);
        }
        let remaining =
            self.stock_quantity
                .checked_sub(quantity)
                .ok_or(ShopError::InsufficientStock {
                    item_id: self.id,
                    requested: quantity,
                    available: self.stock_quantity,
                })?;
        self.stock_quantity = remaining;
        Ok(())
    }

    /// Increases stock. Saturates at `u32::MAX`.
    pub fn add_stock(&mut self, quantity: u32) {
        self.stock_quantity = self.stock_quantity.saturating_add(quantity);
    }

    /// Applies a catalog edit.
    ///
    /// Validation runs before any field changes, so a rejected update leaves
    /// the item untouched.
    pub(crate) fn apply_update(&mut self, update: ItemUpdate) -> Result<(), ShopError> {
        if update.price < Decimal::ZERO {
            return Err(ShopError::InvalidPrice);
        }
        if let Some(new_author) = update.author {
            match &mut self.kind {
                ItemKind::Book { author, .. } => *author = new_author,
                _ => return Err(ShopError::NotABook(self.id)),
            }
        }
        self.name = update.name;
        self.price = update.price;
        self.stock_quantity = update.stock_quantity;
        Ok(())
    }
}
