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

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shop_demo_rs::{
    Address, DeliveryStatus, ItemId, MemberId, NewItem, OrderId, OrderSearch, OrderStatus, Shop,
    ShopConfig, ShopError,
};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Shop Engine - Replay order CSV files against a bookshop catalog
///
/// Loads members and books, replays order commands, and writes a report
/// to stdout. Rows that fail are skipped and logged to stderr.
#[derive(Parser, Debug)]
#[command(name = "shop-demo-rs")]
#[command(about = "An order engine that replays order command CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with order commands
    ///
    /// Expected format: type,member,item,order,quantity
    /// Example: cargo run -- --members members.csv --items books.csv orders.csv > orders_out.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// CSV file with members (name,city,street,zipcode), registered in order
    #[arg(long, value_name = "FILE")]
    members: Option<PathBuf>,

    /// CSV file with books (name,price,stock,author,isbn), added in order
    #[arg(long, value_name = "FILE")]
    items: Option<PathBuf>,

    /// Which report to write to stdout
    #[arg(long, value_enum, default_value_t = Report::Orders)]
    report: Report,

    /// Re-runs allowed after a write conflict
    #[arg(long, default_value_t = ShopConfig::DEFAULT_MAX_COMMIT_RETRIES)]
    max_retries: u32,

    /// Maximum number of orders in the report
    #[arg(long, default_value_t = ShopConfig::DEFAULT_SEARCH_LIMIT)]
    search_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Orders,
    Items,
    Members,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let shop = Shop::with_config(ShopConfig {
        max_commit_retries: args.max_retries,
        search_limit: args.search_limit,
    });

    if let Some(path) = &args.members {
        let result = open(path).and_then(|file| load_members(&shop, BufReader::new(file)));
        exit_on_error("loading members", path, result);
    }
    if let Some(path) = &args.items {
        let result = open(path).and_then(|file| load_items(&shop, BufReader::new(file)));
        exit_on_error("loading items", path, result);
    }

    let result = open(&args.input).and_then(|file| process_orders(&shop, BufReader::new(file)));
    exit_on_error("processing orders", &args.input, result);

    let stdout = std::io::stdout();
    let written = match args.report {
        Report::Orders => write_orders(&shop, stdout),
        Report::Items => write_items(&shop, stdout),
        Report::Members => write_members(&shop, stdout),
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn open(path: &Path) -> Result<File, csv::Error> {
    File::open(path).map_err(csv::Error::from)
}

fn exit_on_error(stage: &str, path: &Path, result: Result<usize, csv::Error>) {
    match result {
        Ok(count) => info!(stage, path = %path.display(), count, "done"),
        Err(e) => {
            eprintln!("Error {} from '{}': {}", stage, path.display(), e);
            process::exit(1);
        }
    }
}

fn reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " order "
        .flexible(true) // Allow missing trailing fields
        .has_headers(true)
        .from_reader(reader)
}

/// Raw member record. Fields: `name, city, street, zipcode`
#[derive(Debug, Deserialize)]
struct MemberRecord {
    name: String,
    city: String,
    street: String,
    zipcode: String,
}

/// Registers members in file order. Duplicate names are skipped and do not
/// consume an id.
///
/// # Errors
///
/// Returns a CSV error if the reader fails. Invalid rows are skipped.
pub fn load_members<R: Read>(shop: &Shop, reader_in: R) -> Result<usize, csv::Error> {
    let mut loaded = 0;
    for result in reader(reader_in).deserialize::<MemberRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed member row");
                continue;
            }
        };
        let address = Address::new(record.city, record.street, record.zipcode);
        match shop.register_member(record.name, address) {
            Ok(_) => loaded += 1,
            Err(e) => warn!(error = %e, "skipping member"),
        }
    }
    Ok(loaded)
}

/// Raw book record. Fields: `name, price, stock, author, isbn`
#[derive(Debug, Deserialize)]
struct BookRecord {
    name: String,
    price: Decimal,
    stock: u32,
    #[serde(default)]
    author: String,
    #[serde(default)]
    isbn: String,
}

/// Adds books to the catalog in file order.
///
/// # Errors
///
/// Returns a CSV error if the reader fails. Invalid rows are skipped.
pub fn load_items<R: Read>(shop: &Shop, reader_in: R) -> Result<usize, csv::Error> {
    let mut loaded = 0;
    for result in reader(reader_in).deserialize::<BookRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed item row");
                continue;
            }
        };
        let book = NewItem::book(
            record.name,
            record.price,
            record.stock,
            record.author,
            record.isbn,
        );
        match shop.add_item(book) {
            Ok(_) => loaded += 1,
            Err(e) => warn!(error = %e, "skipping item"),
        }
    }
    Ok(loaded)
}

/// Raw command record. Fields: `type, member, item, order, quantity`
#[derive(Debug, Deserialize)]
struct CommandRecord {
    #[serde(rename = "type")]
    command: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    member: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    item: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    order: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    quantity: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Order {
        member_id: MemberId,
        item_id: ItemId,
        quantity: u32,
    },
    Cancel {
        order_id: OrderId,
    },
    Deliver {
        order_id: OrderId,
    },
}

impl CommandRecord {
    /// Returns `None` for unknown types or missing required fields.
    fn into_command(self) -> Option<Command> {
        match self.command.to_lowercase().as_str() {
            "order" => Some(Command::Order {
                member_id: MemberId(self.member?),
                item_id: ItemId(self.item?),
                quantity: self.quantity?,
            }),
            "cancel" => Some(Command::Cancel {
                order_id: OrderId(self.order?),
            }),
            "deliver" => Some(Command::Deliver {
                order_id: OrderId(self.order?),
            }),
            _ => None,
        }
    }
}

fn apply(shop: &Shop, command: Command) -> Result<(), ShopError> {
    match command {
        Command::Order {
            member_id,
            item_id,
            quantity,
        } => shop.place_order(member_id, item_id, quantity).map(|_| ()),
        Command::Cancel { order_id } => shop.cancel_order(order_id),
        Command::Deliver { order_id } => shop.complete_delivery(order_id),
    }
}

/// Replays order commands from a CSV reader.
///
/// Streams the input, so arbitrarily large files are fine. Malformed rows and
/// rejected commands are logged and skipped.
///
/// # CSV Format
///
/// ```csv
/// type,member,item,order,quantity
/// order,1,1,,2
/// deliver,,,1,
/// cancel,,,1,
/// ```
///
/// Orders are numbered from 1 in the order they are accepted.
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_orders<R: Read>(shop: &Shop, reader_in: R) -> Result<usize, csv::Error> {
    let mut applied = 0;
    for result in reader(reader_in).deserialize::<CommandRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed row");
                continue;
            }
        };
        let Some(command) = record.into_command() else {
            warn!("skipping invalid command record");
            continue;
        };
        match apply(shop, command) {
            Ok(()) => applied += 1,
            Err(e) => warn!(?command, error = %e, "skipping command"),
        }
    }
    Ok(applied)
}

/// Output row for the orders report.
#[derive(Debug, Serialize)]
struct OrderRow {
    order: OrderId,
    member: String,
    status: &'static str,
    delivery: &'static str,
    total: Decimal,
}

/// Writes orders as CSV, oldest first, up to the shop's search limit.
///
/// Columns: `order, member, status, delivery, total`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_orders<W: Write>(shop: &Shop, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    let orders = shop.search_orders(&OrderSearch::default());
    let limit = shop.config().search_limit;
    if orders.len() >= limit {
        warn!(limit, "orders report truncated at the search limit");
    }
    for order in orders {
        let member = shop
            .find_member(order.member_id())
            .map(|m| m.name().to_string())
            .unwrap_or_default();
        wtr.serialize(OrderRow {
            order: order.id(),
            member,
            status: match order.status() {
                OrderStatus::Order => "ORDER",
                OrderStatus::Cancel => "CANCEL",
            },
            delivery: match order.delivery().status() {
                DeliveryStatus::Ready => "READY",
                DeliveryStatus::Comp => "COMP",
            },
            total: order.total_price(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the catalog as CSV. Columns: `item, name, price, stock`
pub fn write_items<W: Write>(shop: &Shop, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["item", "name", "price", "stock"])?;
    for item in shop.items() {
        wtr.write_record([
            item.id().to_string(),
            item.name().to_string(),
            item.price().to_string(),
            item.stock_quantity().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes members as CSV. Columns: `member, name, city, street, zipcode`
pub fn write_members<W: Write>(shop: &Shop, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["member", "name", "city", "street", "zipcode"])?;
    for member in shop.members() {
        let address = member.address();
        wtr.write_record([
            member.id().to_string(),
            member.name().to_string(),
            address.city().to_string(),
            address.street().to_string(),
            address.zipcode().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
