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

//! Members and postal addresses.
//!
//! A member does not hold its orders. Use
//! [`Shop::orders_by_member`](crate::Shop::orders_by_member) instead.

use crate::ShopError;
use crate::base::MemberId;
use serde::{Deserialize, Serialize};

/// Postal address value. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    city: String,
    street: String,
    zipcode: String,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            street: street.into(),
            zipcode: zipcode.into(),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn zipcode(&self) -> &str {
        &self.zipcode
    }
}

/// Registered shop member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    id: MemberId,
    name: String,
    address: Address,
}

impl Member {
    /// Builds a member, rejecting blank names.
    pub(crate) fn new(id: MemberId, name: String, address: Address) -> Result<Self, ShopError> {
        Self::validate_name(&name)?;
        Ok(Self { id, name, address })
    }

    pub(crate) fn validate_name(name: &str) -> Result<(), ShopError> {
        if name.trim().is_empty() {
            return Err(ShopError::InvalidMemberName);
        }
        Ok(())
    }

    /// Callers keep the name index in step.
    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}
