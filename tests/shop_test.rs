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

//! Order workflow integration tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shop_demo_rs::{
    Address, DeliveryStatus, EntityRef, ItemId, ItemUpdate, MemberId, NewItem, OrderId,
    OrderSearch, OrderStateViolation, OrderStatus, Shop, ShopError,
};

fn make_member(shop: &Shop, name: &str) -> MemberId {
    shop.register_member(name, Address::new("Seoul", "Gyeonggi", "12345"))
        .unwrap()
}

fn make_book(shop: &Shop, name: &str, price: Decimal, stock: u32) -> ItemId {
    shop.add_item(NewItem::book(name, price, stock, "kim", "isbn"))
        .unwrap()
}

fn stock(shop: &Shop, item_id: ItemId) -> u32 {
    shop.find_item(item_id).unwrap().stock_quantity()
}

// === Place Order ===

#[test]
fn place_order_takes_stock_and_prices_order() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "Country JPA", dec!(10000), 10);

    let order_id = shop.place_order(member, book, 2).unwrap();

    let order = shop.find_order(order_id).unwrap();
    assert_eq!(order.status(), OrderStatus::Order);
    assert_eq!(order.order_items().len(), 1);
    assert_eq!(order.total_price(), dec!(20000));
    assert_eq!(order.member_id(), member);
    assert_eq!(stock(&shop, book), 8);
}

#[test]
fn delivery_copies_member_address() {
    let shop = Shop::new();
    let member = shop
        .register_member("member1", Address::new("Busan", "Haeundae-ro", "9876"))
        .unwrap();
    let book = make_book(&shop, "JPA", dec!(1000), 5);

    let order_id = shop.place_order(member, book, 1).unwrap();

    let delivery = shop.find_order(order_id).unwrap().delivery().clone();
    assert_eq!(delivery.status(), DeliveryStatus::Ready);
    assert_eq!(delivery.address(), &Address::new("Busan", "Haeundae-ro", "9876"));
}

#[test]
fn place_order_exceeding_stock_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "Country JPA", dec!(10000), 10);

    let result = shop.place_order(member, book, 11);

    assert_eq!(
        result,
        Err(ShopError::InsufficientStock {
            item_id: book,
            requested: 11,
            available: 10,
        })
    );
    assert_eq!(stock(&shop, book), 10);
    assert!(shop.orders_by_member(member).is_empty());
}

#[test]
fn place_order_entire_stock() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(500), 3);

    shop.place_order(member, book, 3).unwrap();

    assert_eq!(stock(&shop, book), 0);
}

#[test]
fn place_order_zero_quantity_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(500), 3);

    assert_eq!(shop.place_order(member, book, 0), Err(ShopError::InvalidQuantity));
    assert_eq!(stock(&shop, book), 3);
}

#[test]
fn place_order_overflowing_total_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", Decimal::MAX, 10);

    let result = shop.place_order(member, book, 2);

    assert_eq!(result, Err(ShopError::AmountOverflow));
    assert_eq!(stock(&shop, book), 10);
    assert!(shop.orders_by_member(member).is_empty());
}

#[test]
fn multi_line_order_overflowing_sum_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let first = make_book(&shop, "JPA", Decimal::MAX, 10);
    let second = make_book(&shop, "Spring", Decimal::MAX, 10);

    let result = shop.place_order_lines(member, &[(first, 1), (second, 1)]);

    assert_eq!(result, Err(ShopError::AmountOverflow));
    assert_eq!(stock(&shop, first), 10);
    assert_eq!(stock(&shop, second), 10);
}

#[test]
fn place_order_at_max_price_keeps_exact_total() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", Decimal::MAX, 10);

    let order_id = shop.place_order(member, book, 1).unwrap();

    assert_eq!(shop.find_order(order_id).unwrap().total_price(), Decimal::MAX);
}

#[test]
fn place_order_unknown_member_fails() {
    let shop = Shop::new();
    let book = make_book(&shop, "JPA", dec!(500), 3);

    let result = shop.place_order(MemberId(99), book, 1);

    assert_eq!(result, Err(ShopError::NotFound(EntityRef::Member(MemberId(99)))));
    assert_eq!(stock(&shop, book), 3);
}

#[test]
fn place_order_unknown_item_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");

    let result = shop.place_order(member, ItemId(42), 1);

    assert_eq!(result, Err(ShopError::NotFound(EntityRef::Item(ItemId(42)))));
}

#[test]
fn multi_line_order_totals_all_lines() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let jpa = make_book(&shop, "JPA", dec!(10000), 10);
    let spring = make_book(&shop, "Spring", dec!(20000), 10);

    let order_id = shop
        .place_order_lines(member, &[(jpa, 2), (spring, 1)])
        .unwrap();

    let order = shop.find_order(order_id).unwrap();
    assert_eq!(order.order_items().len(), 2);
    assert_eq!(order.total_price(), dec!(40000));
    assert_eq!(stock(&shop, jpa), 8);
    assert_eq!(stock(&shop, spring), 9);
}

#[test]
fn multi_line_order_failure_rolls_back_earlier_lines() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let jpa = make_book(&shop, "JPA", dec!(10000), 10);
    let spring = make_book(&shop, "Spring", dec!(20000), 1);

    let result = shop.place_order_lines(member, &[(jpa, 5), (spring, 2)]);

    assert!(matches!(result, Err(ShopError::InsufficientStock { .. })));
    assert_eq!(stock(&shop, jpa), 10);
    assert_eq!(stock(&shop, spring), 1);
    assert!(shop.search_orders(&OrderSearch::default()).is_empty());
}

#[test]
fn same_item_on_two_lines_is_taken_twice() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let jpa = make_book(&shop, "JPA", dec!(100), 5);

    shop.place_order_lines(member, &[(jpa, 2), (jpa, 3)]).unwrap();
    assert_eq!(stock(&shop, jpa), 0);

    let result = shop.place_order_lines(member, &[(jpa, 0)]);
    assert_eq!(result, Err(ShopError::InvalidQuantity));
}

#[test]
fn empty_order_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");

    assert_eq!(shop.place_order_lines(member, &[]), Err(ShopError::EmptyOrder));
}

#[test]
fn price_change_does_not_alter_placed_order() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(10000), 10);
    let order_id = shop.place_order(member, book, 2).unwrap();

    shop.update_item(
        book,
        ItemUpdate {
            name: "JPA".to_string(),
            price: dec!(99999),
            stock_quantity: 8,
            author: None,
        },
    )
    .unwrap();

    assert_eq!(shop.find_order(order_id).unwrap().total_price(), dec!(20000));
    let next = shop.place_order(member, book, 1).unwrap();
    assert_eq!(shop.find_order(next).unwrap().total_price(), dec!(99999));
}

// === Cancel Order ===

#[test]
fn cancel_order_restores_stock() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "Country JPA", dec!(10000), 10);
    let order_id = shop.place_order(member, book, 2).unwrap();
    assert_eq!(stock(&shop, book), 8);

    shop.cancel_order(order_id).unwrap();

    let order = shop.find_order(order_id).unwrap();
    assert_eq!(order.status(), OrderStatus::Cancel);
    assert_eq!(stock(&shop, book), 10);
}

#[test]
fn cancel_multi_line_order_restores_every_item() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let jpa = make_book(&shop, "JPA", dec!(10000), 10);
    let spring = make_book(&shop, "Spring", dec!(20000), 4);
    let order_id = shop
        .place_order_lines(member, &[(jpa, 3), (spring, 4)])
        .unwrap();

    shop.cancel_order(order_id).unwrap();

    assert_eq!(stock(&shop, jpa), 10);
    assert_eq!(stock(&shop, spring), 4);
}

#[test]
fn cancel_after_delivery_completed_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(10000), 10);
    let order_id = shop.place_order(member, book, 2).unwrap();
    shop.complete_delivery(order_id).unwrap();

    let result = shop.cancel_order(order_id);

    assert_eq!(
        result,
        Err(ShopError::IllegalOrderState {
            order_id,
            violation: OrderStateViolation::DeliveryCompleted,
        })
    );
    let order = shop.find_order(order_id).unwrap();
    assert_eq!(order.status(), OrderStatus::Order);
    assert_eq!(order.delivery().status(), DeliveryStatus::Comp);
    assert_eq!(stock(&shop, book), 8);
}

#[test]
fn cancel_twice_restores_stock_once() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(10000), 10);
    let order_id = shop.place_order(member, book, 2).unwrap();

    shop.cancel_order(order_id).unwrap();
    let result = shop.cancel_order(order_id);

    assert_eq!(
        result,
        Err(ShopError::IllegalOrderState {
            order_id,
            violation: OrderStateViolation::AlreadyCanceled,
        })
    );
    assert_eq!(stock(&shop, book), 10);
}

#[test]
fn cancel_unknown_order_fails() {
    let shop = Shop::new();
    assert_eq!(
        shop.cancel_order(OrderId(7)),
        Err(ShopError::NotFound(EntityRef::Order(OrderId(7))))
    );
}

#[test]
fn complete_delivery_on_canceled_order_fails() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(10000), 10);
    let order_id = shop.place_order(member, book, 1).unwrap();
    shop.cancel_order(order_id).unwrap();

    let result = shop.complete_delivery(order_id);

    assert!(matches!(result, Err(ShopError::IllegalOrderState { .. })));
    assert_eq!(
        shop.find_order(order_id).unwrap().delivery().status(),
        DeliveryStatus::Ready
    );
}

// === Queries ===

#[test]
fn orders_by_member_only_returns_that_member() {
    let shop = Shop::new();
    let kim = make_member(&shop, "kim");
    let lee = make_member(&shop, "lee");
    let book = make_book(&shop, "JPA", dec!(100), 10);

    let first = shop.place_order(kim, book, 1).unwrap();
    shop.place_order(lee, book, 1).unwrap();
    let third = shop.place_order(kim, book, 1).unwrap();

    let ids: Vec<OrderId> = shop.orders_by_member(kim).iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec![first, third]);
}

#[test]
fn search_by_status_and_member_name() {
    let shop = Shop::new();
    let kim = make_member(&shop, "kim younghan");
    let lee = make_member(&shop, "lee");
    let book = make_book(&shop, "JPA", dec!(100), 10);

    let canceled = shop.place_order(kim, book, 1).unwrap();
    shop.cancel_order(canceled).unwrap();
    let open = shop.place_order(kim, book, 1).unwrap();
    shop.place_order(lee, book, 1).unwrap();

    let by_name = shop.search_orders(&OrderSearch::by_member_name("younghan"));
    assert_eq!(by_name.len(), 2);

    let search = OrderSearch {
        member_name: Some("kim".to_string()),
        status: Some(OrderStatus::Order),
    };
    let found = shop.search_orders(&search);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), open);

    let canceled_only = shop.search_orders(&OrderSearch::by_status(OrderStatus::Cancel));
    assert_eq!(canceled_only.len(), 1);
    assert_eq!(canceled_only[0].id(), canceled);

    assert_eq!(shop.search_orders(&OrderSearch::default()).len(), 3);
}

#[test]
fn order_summaries_join_member_name() {
    let shop = Shop::new();
    let member = shop
        .register_member("member1", Address::new("Seoul", "test", "12345"))
        .unwrap();
    let book = make_book(&shop, "JPA", dec!(100), 10);
    let order_id = shop.place_order(member, book, 1).unwrap();

    let summaries = shop.order_summaries(&OrderSearch::default());

    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.order_id, order_id);
    assert_eq!(summary.member_name, "member1");
    assert_eq!(summary.status, OrderStatus::Order);
    assert_eq!(summary.address.city(), "Seoul");
    assert_eq!(
        summary.order_date,
        shop.find_order(order_id).unwrap().order_date()
    );
}

#[test]
fn find_unknown_entities_returns_none() {
    let shop = Shop::new();
    assert!(shop.find_member(MemberId(1)).is_none());
    assert!(shop.find_item(ItemId(1)).is_none());
    assert!(shop.find_order(OrderId(1)).is_none());
}

#[test]
fn summaries_follow_member_rename() {
    let shop = Shop::new();
    let member = make_member(&shop, "member1");
    let book = make_book(&shop, "JPA", dec!(100), 10);
    shop.place_order(member, book, 1).unwrap();

    shop.update_member_name(member, "renamed").unwrap();

    let summaries = shop.order_summaries(&OrderSearch::by_member_name("renamed"));
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].member_name, "renamed");
    assert!(
        shop.search_orders(&OrderSearch::by_member_name("member1"))
            .is_empty()
    );
}
