use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use crate::controller::AppState;
use crate::controller::reservation_controller::{describe_reservations, ReservationDetail};
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
        .route("/", get(list_customers).post(add_customer))
        .route("/top-ten", get(top_ten_customers))
        .route("/:id", get(retrieve_customer).put(edit_customer))
        .route("/:id/reservations", get(retrieve_customer_reservations).post(add_reservation))
        .route_layer(Extension(postgres_repo))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SearchCustomerParam {
    pub search: Option<String>,
}

pub async fn list_customers(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Query(query): Query<SearchCustomerParam>,
) -> impl IntoResponse {
    let customers_res = match query.search.as_deref().filter(|term| !term.is_empty()) {
        Some(term) => Customer::search(&postgres_repo, term).await,
        None => Customer::all(&postgres_repo).await,
    };

    match customers_res {
        Ok(customers) => (StatusCode::OK, Json(customers)).into_response(),
        Err(e) => error_response("retrieving customers", e),
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

pub async fn add_customer(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Json(body): Json<CustomerForm>,
) -> impl IntoResponse {
    let mut customer = Customer::new(body.first_name, body.last_name, body.phone, body.notes);

    match customer.save(&postgres_repo).await {
        Ok(_) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => error_response("adding customer", e),
    }
}

pub async fn top_ten_customers(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
) -> impl IntoResponse {
    match Customer::top_ten(&postgres_repo).await {
        Ok(top_customers) => (StatusCode::OK, Json(top_customers)).into_response(),
        Err(e) => error_response("retrieving top ten customers", e),
    }
}

#[derive(Clone, Serialize, Debug)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub full_name: String,
    pub reservations: Vec<ReservationDetail>,
}

async fn load_customer_detail(
    postgres_repo: &PostgresConnectionRepo,
    id: i32,
) -> Result<CustomerDetail, ModelError> {
    let customer = Customer::get(postgres_repo, id).await?;
    let reservations = customer.get_reservations(postgres_repo).await?;

    Ok(CustomerDetail {
        full_name: customer.full_name(),
        reservations: describe_reservations(reservations)?,
        customer,
    })
}

pub async fn retrieve_customer(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match load_customer_detail(&postgres_repo, id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response("retrieving customer", e),
    }
}

async fn apply_customer_edit(
    postgres_repo: &PostgresConnectionRepo,
    id: i32,
    form: CustomerForm,
) -> Result<Customer, ModelError> {
    let mut customer = Customer::get(postgres_repo, id).await?;
    customer.first_name = form.first_name;
    customer.last_name = form.last_name;
    customer.phone = form.phone;
    customer.set_notes(form.notes);
    customer.save(postgres_repo).await?;

    Ok(customer)
}

pub async fn edit_customer(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(id): Path<i32>,
    Json(body): Json<CustomerForm>,
) -> impl IntoResponse {
    match apply_customer_edit(&postgres_repo, id, body).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => error_response("editing customer", e),
    }
}

async fn load_customer_reservations(
    postgres_repo: &PostgresConnectionRepo,
    id: i32,
) -> Result<Vec<ReservationDetail>, ModelError> {
    let customer = Customer::get(postgres_repo, id).await?;
    describe_reservations(customer.get_reservations(postgres_repo).await?)
}

pub async fn retrieve_customer_reservations(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match load_customer_reservations(&postgres_repo, id).await {
        Ok(reservations) => (StatusCode::OK, Json(reservations)).into_response(),
        Err(e) => error_response("retrieving customer's reservations", e),
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NewReservationForm {
    pub num_guests: i32,
    #[serde(with = "start_at_format")]
    pub start_at: PrimitiveDateTime,
    pub notes: Option<String>,
}

async fn book_reservation(
    postgres_repo: &PostgresConnectionRepo,
    customer_id: i32,
    form: NewReservationForm,
) -> Result<Reservation, ModelError> {
    let mut reservation = Reservation::new(customer_id, form.num_guests, form.start_at, form.notes)?;
    Customer::get(postgres_repo, customer_id).await?;
    reservation.save(postgres_repo).await?;

    Ok(reservation)
}

pub async fn add_reservation(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(customer_id): Path<i32>,
    Json(body): Json<NewReservationForm>,
) -> impl IntoResponse {
    match book_reservation(&postgres_repo, customer_id, body).await {
        Ok(reservation) => (StatusCode::CREATED, Json(reservation)).into_response(),
        Err(e) => error_response("adding reservation for customer", e),
    }
}
