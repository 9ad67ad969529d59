use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{
    CreateOrderRequest, OrderListResponse, OrderResponse, RestaurantOrdersParams,
    UpdateStatusRequest,
};
use crate::middleware::Identity;
use crate::models::{OrderId, OrderRequest, RestaurantId, UserId};
use crate::startup::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = OrderRequest::from(payload);
    let order = state.lifecycle.create_order(&identity, &request).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

pub async fn get_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.lifecycle.find_order(&identity, order_id).await?;
    Ok(Json(OrderResponse::from(order)))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = state
        .lifecycle
        .update_order_status(&identity, order_id, payload.status, payload.comments)
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    state.lifecycle.delete_order(&identity, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_client_orders(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(client_id): Path<UserId>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state
        .lifecycle
        .find_orders_by_client(&identity, client_id)
        .await?;
    Ok(Json(OrderListResponse::from(orders)))
}

pub async fn list_restaurant_orders(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Path(restaurant_id): Path<RestaurantId>,
    Query(params): Query<RestaurantOrdersParams>,
) -> Result<impl IntoResponse, AppError> {
    let lifecycle = &state.lifecycle;

    let orders = match (params.status, params.from, params.to) {
        (None, None, None) => {
            lifecycle
                .find_orders_by_owner(&identity, restaurant_id)
                .await?
        }
        (Some(status), None, None) => {
            lifecycle
                .find_orders_by_status(&identity, restaurant_id, status)
                .await?
        }
        (None, Some(from), Some(to)) => {
            lifecycle
                .find_orders_by_date_range(&identity, restaurant_id, from, to)
                .await?
        }
        _ => {
            lifecycle
                .find_orders_by_restaurant(&identity, restaurant_id, &params.into())
                .await?
        }
    };

    Ok(Json(OrderListResponse::from(orders)))
}
