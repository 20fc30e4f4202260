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

//! Order search criteria and flat read models.

use crate::base::OrderId;
use crate::member::Address;
use crate::order::{Order, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional filters for [`Shop::search_orders`](crate::Shop::search_orders).
///
/// Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderSearch {
    /// Substring of the ordering member's name.
    pub member_name: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderSearch {
    pub fn by_status(status: OrderStatus) -> Self {
        Self {
            member_name: None,
            status: Some(status),
        }
    }

    pub fn by_member_name(name: impl Into<String>) -> Self {
        Self {
            member_name: Some(name.into()),
            status: None,
        }
    }

    pub(crate) fn matches(&self, order: &Order, member_name: &str) -> bool {
        let status_ok = self.status.is_none_or(|status| order.status() == status);
        let name_ok = match self.member_name.as_deref() {
            None | Some("") => true,
            Some(fragment) => member_name.contains(fragment),
        };
        status_ok && name_ok
    }
}

/// One row of an order listing, joined with the member name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub member_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
}

impl OrderSummary {
    pub(crate) fn new(order: &Order, member_name: String) -> Self {
        Self {
            order_id: order.id(),
            member_name,
            order_date: order.order_date(),
            status: order.status(),
            address: order.delivery().address().clone(),
        }
    }
}
