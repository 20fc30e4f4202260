//! Simple REST API server example for the shop.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /members` - Register a member
//! - `GET /members` - List all members
//! - `PUT /members/:id` - Rename a member
//! - `POST /items` - Add a catalog item
//! - `GET /items` - List all items
//! - `PUT /items/:id` - Update an item
//! - `POST /orders` - Place an order
//! - `GET /orders` - Search orders (`?status=ORDER&member_name=kim`)
//! - `GET /orders/summaries` - Search order summaries
//! - `GET /orders/:id` - Get an order
//! - `POST /orders/:id/cancel` - Cancel an order
//! - `POST /orders/:id/deliver` - Complete an order's delivery
//!
//! ## Example Usage
//!
//! ```bash
//! # Register a member
//! curl -X POST http://localhost:3000/members \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "kim", "city": "Seoul", "street": "Gangnam", "zipcode": "12345"}'
//!
//! # Add a book
//! curl -X POST http://localhost:3000/items \
//!   -H "Content-Type: application/json" \
//!   -d '{"kind": "book", "name": "JPA", "price": "10000", "stock_quantity": 10, "author": "kim", "isbn": "1234"}'
//!
//! # Order two copies
//! curl -X POST http://localhost:3000/orders \
//!   -H "Content-Type: application/json" \
//!   -d '{"member_id": 1, "lines": [{"item_id": 1, "count": 2}]}'
//!
//! # Cancel it
//! curl -X POST http://localhost:3000/orders/1/cancel
//!
//! # Search canceled orders
//! curl 'http://localhost:3000/orders?status=CANCEL'
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use shop_demo_rs::{
    Address, EntityRef, Item, ItemId, ItemUpdate, Member, MemberId, NewItem, Order, OrderId,
    OrderSearch, OrderSummary, Shop, ShopError,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

// === Request/Response DTOs ===

/// Request body for registering members.
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub name: String,
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

/// Request body for renaming members.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// One line of an order request.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub item_id: u64,
    pub count: u32,
}

/// Request body for placing orders.
///
/// ```json
/// {"member_id": 1, "lines": [{"item_id": 1, "count": 2}]}
/// ```
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub member_id: u64,
    pub lines: Vec<OrderLineRequest>,
}

/// Response body carrying the id of a created entity.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: u64,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the shop.
#[derive(Clone)]
pub struct AppState {
    pub shop: Arc<Shop>,
}

// === Error Handling ===

/// Wrapper for converting `ShopError` into HTTP responses.
pub struct AppError(ShopError);

impl From<ShopError> for AppError {
    fn from(err: ShopError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ShopError::InsufficientStock { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_STOCK")
            }
            ShopError::IllegalOrderState { .. } => (StatusCode::CONFLICT, "ILLEGAL_ORDER_STATE"),
            ShopError::DuplicateMember(_) => (StatusCode::CONFLICT, "DUPLICATE_MEMBER"),
            ShopError::NotFound(EntityRef::Member(_)) => {
                (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND")
            }
            ShopError::NotFound(EntityRef::Item(_)) => (StatusCode::NOT_FOUND, "ITEM_NOT_FOUND"),
            ShopError::NotFound(EntityRef::Order(_)) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            ShopError::InvalidQuantity => (StatusCode::BAD_REQUEST, "INVALID_QUANTITY"),
            ShopError::InvalidPrice => (StatusCode::BAD_REQUEST, "INVALID_PRICE"),
            ShopError::InvalidMemberName => (StatusCode::BAD_REQUEST, "INVALID_MEMBER_NAME"),
            ShopError::EmptyOrder => (StatusCode::BAD_REQUEST, "EMPTY_ORDER"),
            ShopError::NotABook(_) => (StatusCode::BAD_REQUEST, "NOT_A_BOOK"),
            ShopError::AmountOverflow => (StatusCode::UNPROCESSABLE_ENTITY, "AMOUNT_OVERFLOW"),
            ShopError::WriteConflict => (StatusCode::CONFLICT, "WRITE_CONFLICT"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /members - Register a member.
async fn register_member(
    State(state): State<AppState>,
    Json(request): Json<MemberRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let address = Address::new(request.city, request.street, request.zipcode);
    let member_id = state.shop.register_member(request.name, address)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: member_id.0 })))
}

/// GET /members - List all members.
async fn list_members(State(state): State<AppState>) -> Json<Vec<Member>> {
    Json(state.shop.members())
}

/// PUT /members/:id - Rename a member.
async fn rename_member(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<RenameRequest>,
) -> Result<StatusCode, AppError> {
    state.shop.update_member_name(MemberId(id), request.name)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /items - Add a catalog item.
async fn add_item(
    State(state): State<AppState>,
    Json(new_item): Json<NewItem>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let item_id = state.shop.add_item(new_item)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: item_id.0 })))
}

/// GET /items - List all items.
async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    Json(state.shop.items())
}

/// PUT /items/:id - Update an item.
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(update): Json<ItemUpdate>,
) -> Result<StatusCode, AppError> {
    state.shop.update_item(ItemId(id), update)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders - Place an order.
async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let lines: Vec<(ItemId, u32)> = request
        .lines
        .iter()
        .map(|line| (ItemId(line.item_id), line.count))
        .collect();
    let order_id = state
        .shop
        .place_order_lines(MemberId(request.member_id), &lines)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: order_id.0 })))
}

/// GET /orders - Search orders.
async fn search_orders(
    State(state): State<AppState>,
    Query(search): Query<OrderSearch>,
) -> Json<Vec<Order>> {
    Json(state.shop.search_orders(&search))
}

/// GET /orders/summaries - Search order summaries.
async fn order_summaries(
    State(state): State<AppState>,
    Query(search): Query<OrderSearch>,
) -> Json<Vec<OrderSummary>> {
    Json(state.shop.order_summaries(&search))
}

/// GET /orders/:id - Get an order by id.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Order>, AppError> {
    let order_id = OrderId(id);
    state
        .shop
        .find_order(order_id)
        .map(Json)
        .ok_or(AppError(ShopError::NotFound(EntityRef::Order(order_id))))
}

/// POST /orders/:id/cancel - Cancel an order.
async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.shop.cancel_order(OrderId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /orders/:id/deliver - Complete an order's delivery.
async fn complete_delivery(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.shop.complete_delivery(OrderId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/members", post(register_member).get(list_members))
        .route("/members/{id}", put(rename_member))
        .route("/items", post(add_item).get(list_items))
        .route("/items/{id}", put(update_item))
        .route("/orders", post(place_order).get(search_orders))
        .route("/orders/summaries", get(order_summaries))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/orders/{id}/deliver", post(complete_delivery))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState {
        shop: Arc::new(Shop::new()),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    info!(addr = "http://127.0.0.1:3000", "shop API server running");

    axum::serve(listener, app).await
}
