//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to application use cases.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::application::dto::{OrderDto, PlaceOrderAckDto, ScheduledOrderDto};
use crate::application::ports::{
    BrokerAccountRepository, CredentialVault, PlaceOrderResult, SchedulerPort,
};
use crate::application::services::BrokerDescriptor;
use crate::application::use_cases::{
    BrokerAccountsUseCase, PlaceOrderUseCase, ScheduleOrderUseCase,
};
use crate::domain::brokerage::{BrokerAccount, BrokerPosition, HistoricalData};
use crate::domain::order_execution::{OrderRepository, ScheduledOrderRepository};
use crate::domain::shared::{AccountId, BrokerId, JobKey, OrderId, UserId};

use super::request::{
    ClosePositionRequest, HistoryQuery, LinkBrokerRequest, PlaceOrderRequest,
    ScheduleOrderRequest, UserQuery,
};
use super::response::{ApiError, CancelScheduleResponse, HealthResponse};

/// Application state shared across handlers.
pub struct AppState<O, A, S, T, V>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    /// Use case for immediate placement and order queries.
    pub place_orders: Arc<PlaceOrderUseCase<O, A>>,
    /// Use case for scheduling and cancelling orders.
    pub schedule_orders: Arc<ScheduleOrderUseCase<O, S, T>>,
    /// Use case for account linking and account-scoped broker queries.
    pub broker_accounts: Arc<BrokerAccountsUseCase<A, V>>,
    /// Application version.
    pub version: String,
}

impl<O, A, S, T, V> Clone for AppState<O, A, S, T, V>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    fn clone(&self) -> Self {
        Self {
            place_orders: Arc::clone(&self.place_orders),
            schedule_orders: Arc::clone(&self.schedule_orders),
            broker_accounts: Arc::clone(&self.broker_accounts),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<O, A, S, T, V>(state: AppState<O, A, S, T, V>) -> Router
where
    O: OrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
    S: ScheduledOrderRepository + 'static,
    T: SchedulerPort + 'static,
    V: CredentialVault + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders", get(list_orders))
        .route("/api/v1/orders/place", post(place_order))
        .route("/api/v1/orders/schedule", post(schedule_order))
        .route("/api/v1/orders/schedule/{job_key}", delete(cancel_schedule))
        .route("/api/v1/orders/{id}", get(get_order))
        .route("/api/v1/brokers/available", get(available_brokers))
        .route("/api/v1/brokers/linked", get(linked_accounts))
        .route("/api/v1/brokers/link", post(link_account))
        .route("/api/v1/brokers/{account_id}/positions", get(positions))
        .route(
            "/api/v1/brokers/{account_id}/positions/close",
            post(close_position),
        )
        .route(
            "/api/v1/marketdata/history/{account_id}/{symbol}",
            get(historical_data),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
) -> impl IntoResponse
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Create an order and dispatch its execution; answers before the broker does.
async fn place_order<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderAckDto>, ApiError>
where
    O: OrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let (ack, _execution) = state
        .place_orders
        .place_now(&request.order, request.metadata())
        .await?;
    Ok(Json(ack))
}

/// Create an order that executes at the requested instant.
async fn schedule_order<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Json(request): Json<ScheduleOrderRequest>,
) -> Result<Json<ScheduledOrderDto>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let (_order, scheduled) = state
        .schedule_orders
        .create_and_schedule(request.order.to_command(), request.trigger_time)
        .await?;
    Ok(Json(ScheduledOrderDto::from_scheduled(&scheduled)))
}

/// Cancel a pending schedule.
async fn cancel_schedule<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Path(job_key): Path<String>,
) -> Result<Json<CancelScheduleResponse>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let cancelled = state
        .schedule_orders
        .cancel(&JobKey::new(&job_key))
        .await?;
    Ok(Json(CancelScheduleResponse { job_key, cancelled }))
}

/// Orders of a user.
async fn list_orders<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<OrderDto>>, ApiError>
where
    O: OrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let orders = state
        .place_orders
        .list_orders(&UserId::new(&query.user_id))
        .await?;
    Ok(Json(orders))
}

/// One order by ID.
async fn get_order<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDto>, ApiError>
where
    O: OrderRepository + 'static,
    A: BrokerAccountRepository + 'static,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let order = state.place_orders.get_order(&OrderId::new(&id)).await?;
    Ok(Json(order))
}

/// Registered brokers and their capabilities.
async fn available_brokers<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
) -> Json<Vec<BrokerDescriptor>>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    Json(state.broker_accounts.available_brokers())
}

/// Accounts linked by a user.
async fn linked_accounts<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<BrokerAccount>>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let accounts = state
        .broker_accounts
        .linked_accounts(&UserId::new(&query.user_id))
        .await?;
    Ok(Json(accounts))
}

/// Probe and link a broker account.
async fn link_account<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Json(request): Json<LinkBrokerRequest>,
) -> Result<Json<BrokerAccount>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let account = state
        .broker_accounts
        .link_account(
            &UserId::new(&request.user_id),
            &BrokerId::new(&request.broker_id),
            &request.credentials,
            request.metadata,
        )
        .await?;
    Ok(Json(account))
}

/// Normalised open positions of an owned account.
async fn positions<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Path(account_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<BrokerPosition>>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let positions = state
        .broker_accounts
        .positions(&UserId::new(&query.user_id), &AccountId::new(&account_id))
        .await?;
    Ok(Json(positions))
}

/// Flatten a position with an opposite-side market order.
async fn close_position<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Path(account_id): Path<String>,
    Json(request): Json<ClosePositionRequest>,
) -> Result<Json<PlaceOrderResult>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let result = state
        .broker_accounts
        .close_position(
            &UserId::new(&request.user_id),
            &AccountId::new(&account_id),
            &request.position,
        )
        .await?;
    Ok(Json(result))
}

/// Historical candles for a security through an owned account.
async fn historical_data<O, A, S, T, V>(
    State(state): State<AppState<O, A, S, T, V>>,
    Path((account_id, symbol)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoricalData>, ApiError>
where
    O: OrderRepository,
    A: BrokerAccountRepository,
    S: ScheduledOrderRepository,
    T: SchedulerPort,
    V: CredentialVault,
{
    let (from, to) = query.range().map_err(ApiError::bad_request)?;
    let data = state
        .broker_accounts
        .historical_data(
            &UserId::new(&query.user_id),
            &AccountId::new(&account_id),
            &symbol,
            query.interval(),
            from,
            to,
        )
        .await?;
    Ok(Json(data))
}
