use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use lotcalc_core::deposit::DepositInput;
use lotcalc_core::installment::InstallmentInput;
use lotcalc_core::roi::RoiInput;
use lotcalc_core::{Envelope, LotCalcError, LotCalcResult};

use super::wire::{self, DepositRequest, InstallmentData, InstallmentRequest, RoiData, RoiRequest};
use super::AppState;

pub async fn health() -> Response {
    json_response(StatusCode::OK, json!({ "status": "healthy" }))
}

pub async fn not_found() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        json!({ "ok": false, "error": { "code": "not_found", "message": "Not found" } }),
    )
}

pub async fn roi(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RoiRequest>, JsonRejection>,
) -> Response {
    respond("roi", body, |req| {
        let out = state.roi.project(&RoiInput {
            area: req.area,
            price: req.price,
        })?;
        RoiData::try_from(&out.result)
    })
}

pub async fn installment(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InstallmentRequest>, JsonRejection>,
) -> Response {
    respond("installment", body, |req| {
        let out = state.installment.plan(&InstallmentInput { price: req.price })?;
        InstallmentData::try_from(&out.result)
    })
}

pub async fn deposit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DepositRequest>, JsonRejection>,
) -> Response {
    respond("deposit", body, |req| {
        let input: DepositInput = req.into_input()?;
        let out = state.deposit.compare(&input)?;
        wire::deposit_data(&out.result)
    })
}

/// Decode the body, run the calculation and wrap the outcome in the
/// `{ok, data | error}` envelope.
fn respond<Req, Data>(
    route: &'static str,
    body: Result<Json<Req>, JsonRejection>,
    calc: impl FnOnce(Req) -> LotCalcResult<Data>,
) -> Response
where
    Data: Serialize,
{
    let outcome = body
        .map_err(|rejection| LotCalcError::SerializationError(rejection.body_text()))
        .and_then(|Json(req)| calc(req));

    match outcome {
        Ok(data) => json_response(StatusCode::OK, Envelope::success(data)),
        Err(err) => {
            let status = status_for(&err);
            if err.is_client_error() {
                tracing::warn!(route, code = err.code(), error = %err, "request rejected");
            } else {
                tracing::error!(route, error = %err, "calculation failed");
            }
            json_response(status, Envelope::<()>::failure(&err))
        }
    }
}

pub fn status_for(err: &LotCalcError) -> StatusCode {
    match err {
        LotCalcError::InvalidInput { .. } | LotCalcError::SerializationError(_) => {
            StatusCode::BAD_REQUEST
        }
        LotCalcError::UnknownScenario(_) => StatusCode::NOT_FOUND,
        LotCalcError::InternalComputation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
    response
}
