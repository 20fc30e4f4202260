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

//! Runtime settings for a [`Shop`](crate::Shop).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// How many times an operation is re-run after a write conflict before
    /// [`ShopError::WriteConflict`](crate::ShopError::WriteConflict) is returned.
    pub max_commit_retries: u32,
    /// Maximum number of orders returned by a search.
    pub search_limit: usize,
}

impl ShopConfig {
    pub const DEFAULT_MAX_COMMIT_RETRIES: u32 = 3;
    pub const DEFAULT_SEARCH_LIMIT: usize = 1000;
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: Self::DEFAULT_MAX_COMMIT_RETRIES,
            search_limit: Self::DEFAULT_SEARCH_LIMIT,
        }
    }
}
