use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::put;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use crate::controller::AppState;
use crate::helpers::error_response::error_response;
use crate::models::customer::Customer;
use crate::models::error::ModelError;
use crate::models::reservation::{start_at_format, Reservation};
use crate::repositories::postgres_repo::PostgresConnectionRepo;

pub fn router(app_state: AppState) -> Router {
    let postgres_repo = Arc::new(PostgresConnectionRepo::new(
        app_state.postgres_connection
    ));

    Router::new()
        .route("/:id", put(edit_reservation))
        .route_layer(Extension(postgres_repo))
}

/// A reservation together with its human readable start time.
#[derive(Clone, Serialize, Debug)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub formatted_start_at: String,
}

pub fn describe_reservations(
    reservations: Vec<Reservation>,
) -> Result<Vec<ReservationDetail>, ModelError> {
    reservations
        .into_iter()
        .map(|reservation| -> Result<ReservationDetail, ModelError> {
            Ok(ReservationDetail {
                formatted_start_at: reservation.formatted_start_at()?,
                reservation,
            })
        })
        .collect()
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct EditReservationForm {
    pub customer_id: i32,
    pub num_guests: i32,
    #[serde(with = "start_at_format")]
    pub start_at: PrimitiveDateTime,
    pub notes: Option<String>,
}

async fn apply_reservation_edit(
    postgres_repo: &PostgresConnectionRepo,
    id: i32,
    form: EditReservationForm,
) -> Result<Reservation, ModelError> {
    let mut reservation = Reservation::new(form.customer_id, form.num_guests, form.start_at, form.notes)?
        .with_id(id);
    Customer::get(postgres_repo, form.customer_id).await?;
    reservation.save(postgres_repo).await?;

    Ok(reservation)
}

pub async fn edit_reservation(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(id): Path<i32>,
    Json(body): Json<EditReservationForm>,
) -> impl IntoResponse {
    match apply_reservation_edit(&postgres_repo, id, body).await {
        Ok(reservation) => (StatusCode::OK, Json(reservation)).into_response(),
        Err(e) => error_response("editing reservation", e),
    }
}
