//! # Cart Handlers
//!
//! Session lifecycle and the scan screen.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    POST /api/sessions/{id}/cart/scan                    │
//! │                                                                         │
//! │  { "barcode": "7501055363513", "quantity": 2, "amount": "15.00" }      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock session cart                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  parse amount ──► bad? 400, cart untouched                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  look up barcode ──► unknown? 404, cart untouched                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::scan ──► quantity / stock / caps checked before any line lands   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartView (lines + totals)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgventas_core::validation::parse_positive_amount;
use sgventas_core::{Cart, CartSnapshot, Money};
use tracing::debug;
use uuid::Uuid;

use super::{AmountInput, ApiJson, ApiPath, ApiResult};
use crate::state::{ConfigState, DbState, SessionState};

/// Cart contents plus the formatted total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub snapshot: CartSnapshot,
    pub total: String,
}

impl CartView {
    pub fn new(cart: &Cart, config: &ConfigState) -> ApiResult<Self> {
        Ok(CartView {
            snapshot: cart.snapshot()?,
            total: config.format_currency(cart.total()?),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub cart: CartView,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: i64,

    /// Manual `INGRESO` amount.
    #[serde(default)]
    pub amount: Option<AmountInput>,
}

fn default_quantity() -> i64 {
    1
}

pub async fn create_session(
    State(sessions): State<SessionState>,
    State(config): State<ConfigState>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let (session_id, cart) = sessions.create().await?;
    let cart = cart.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            cart: CartView::new(&cart, &config)?,
        }),
    ))
}

pub async fn delete_session(
    State(sessions): State<SessionState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_cart(
    State(sessions): State<SessionState>,
    State(config): State<ConfigState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<CartView>> {
    let cart = sessions.get(id).await?;
    let cart = cart.lock().await;
    Ok(Json(CartView::new(&cart, &config)?))
}

/// Empties the cart without recording anything.
pub async fn clear_cart(
    State(sessions): State<SessionState>,
    State(config): State<ConfigState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<CartView>> {
    let cart = sessions.get(id).await?;
    let mut cart = cart.lock().await;
    cart.clear();

    debug!(session = %id, "Cart cleared");
    Ok(Json(CartView::new(&cart, &config)?))
}

pub async fn scan(
    State(db): State<DbState>,
    State(sessions): State<SessionState>,
    State(config): State<ConfigState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ScanRequest>,
) -> ApiResult<Json<CartView>> {
    let cart = sessions.get(id).await?;
    let mut cart = cart.lock().await;

    let amount: Option<Money> = match req.amount.as_ref().map(AmountInput::to_text) {
        Some(text) if !text.trim().is_empty() => Some(parse_positive_amount("amount", &text)?),
        _ => None,
    };

    let barcode = req
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());
    let product = match barcode {
        Some(barcode) => Some(db.inner().products().require(barcode).await?),
        None => None,
    };

    cart.scan(product.as_ref().map(|p| (p, req.quantity)), amount)?;

    debug!(
        session = %id,
        barcode = ?barcode,
        quantity = req.quantity,
        manual_cents = ?amount.map(|a| a.cents()),
        lines = cart.lines().len(),
        "Scanned into cart"
    );
    Ok(Json(CartView::new(&cart, &config)?))
}

pub async fn remove_line(
    State(sessions): State<SessionState>,
    State(config): State<ConfigState>,
    ApiPath((id, index)): ApiPath<(Uuid, usize)>,
) -> ApiResult<Json<CartView>> {
    let cart = sessions.get(id).await?;
    let mut cart = cart.lock().await;
    let removed = cart.remove_line(index)?;

    debug!(session = %id, index, barcode = %removed.barcode, "Cart line removed");
    Ok(Json(CartView::new(&cart, &config)?))
}
