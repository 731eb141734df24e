use bb8_postgres::tokio_postgres::error::SqlState;
use bb8_postgres::tokio_postgres::{self, Row};
use serde::Serialize;
use time::macros::format_description;
use time::PrimitiveDateTime;
use tracing::debug;
use crate::models::error::ModelError;
use crate::models::normalize_notes;
use crate::repositories::postgres_repo::PostgresConnectionRepo;

const SELECT_RESERVATIONS: &str = "SELECT id, customer_id, num_guests, start_at, notes FROM reservations";

/// A reservation for a party.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub id: Option<i32>,
    pub customer_id: i32,
    num_guests: i32,
    #[serde(with = "start_at_format")]
    pub start_at: PrimitiveDateTime,
    notes: String,
}

impl Reservation {
    pub fn new(
        customer_id: i32,
        num_guests: i32,
        start_at: PrimitiveDateTime,
        notes: Option<String>,
    ) -> Result<Self, ModelError> {
        validate_num_guests(num_guests)?;
        Ok(Self {
            id: None,
            customer_id,
            num_guests,
            start_at,
            notes: normalize_notes(notes),
        })
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn num_guests(&self) -> i32 {
        self.num_guests
    }

    /// Rejects parties smaller than one guest, leaving the current value in place.
    pub fn set_num_guests(&mut self, num_guests: i32) -> Result<(), ModelError> {
        validate_num_guests(num_guests)?;
        self.num_guests = num_guests;
        Ok(())
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_notes(notes);
    }

    /// Renders the start time as e.g. `January 1st 2024, 7:05 pm`.
    pub fn formatted_start_at(&self) -> Result<String, ModelError> {
        let date = self.start_at
            .format(format_description!("[month repr:long] [day padding:none]"))?;
        let year_and_time = self.start_at
            .format(format_description!("[year], [hour repr:12 padding:none]:[minute] [period case:lower]"))?;

        Ok(format!("{}{} {}", date, ordinal_suffix(self.start_at.day()), year_and_time))
    }

    pub async fn get_reservations_for_customer(
        postgres_repo: &PostgresConnectionRepo,
        customer_id: i32,
    ) -> Result<Vec<Reservation>, ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;
        let stmt = format!("{} WHERE customer_id = $1 ORDER BY start_at, id", SELECT_RESERVATIONS);

        let rows = conn
            .query(&stmt, &[&customer_id])
            .await?;

        rows.iter()
            .map(parse_row_into_reservation)
            .collect()
    }

    /// Inserts the reservation when it has no id yet, otherwise updates the stored row.
    pub async fn save(
        &mut self,
        postgres_repo: &PostgresConnectionRepo,
    ) -> Result<(), ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;

        match self.id {
            None => {
                let row = conn
                    .query_one(
                        "INSERT INTO reservations (customer_id, num_guests, start_at, notes) \
                        VALUES ($1, $2, $3, $4) \
                        RETURNING id",
                        &[&self.customer_id, &self.num_guests, &self.start_at, &self.notes],
                    ).await
                    .map_err(|e| missing_customer_as_not_found(e, self.customer_id))?;
                let id: i32 = row.try_get("id")?;
                debug!("Inserted reservation {} for customer {}", id, self.customer_id);
                self.id = Some(id);
            }
            Some(id) => {
                let updated = conn
                    .execute(
                        "UPDATE reservations SET customer_id = $1, num_guests = $2, start_at = $3, notes = $4 \
                        WHERE id = $5",
                        &[&self.customer_id, &self.num_guests, &self.start_at, &self.notes, &id],
                    ).await
                    .map_err(|e| missing_customer_as_not_found(e, self.customer_id))?;
                if updated == 0 {
                    return Err(ModelError::not_found("reservation", id));
                }
                debug!("Updated reservation {}", id);
            }
        }

        Ok(())
    }
}

fn validate_num_guests(num_guests: i32) -> Result<(), ModelError> {
    if num_guests < 1 {
        return Err(ModelError::InvalidGuestCount(num_guests));
    }
    Ok(())
}

/// The reservations.customer_id foreign key fails when the customer does not exist.
fn missing_customer_as_not_found(error: tokio_postgres::Error, customer_id: i32) -> ModelError {
    if error.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
        return ModelError::not_found("customer", customer_id);
    }
    ModelError::Query(error)
}

fn ordinal_suffix(day: u8) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

pub(crate) fn parse_row_into_reservation(
    row: &Row,
) -> Result<Reservation, ModelError> {
    let reservation = Reservation::new(
        row.try_get("customer_id")?,
        row.try_get("num_guests")?,
        row.try_get("start_at")?,
        row.try_get("notes")?,
    )?;

    Ok(reservation.with_id(row.try_get("id")?))
}

/// JSON representation of `start_at`: `YYYY-MM-DDTHH:MM:SS`, no offset.
pub mod start_at_format {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::macros::format_description;
    use time::PrimitiveDateTime;

    pub fn serialize<S: Serializer>(
        start_at: &PrimitiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let formatted = start_at.format(format).map_err(ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<PrimitiveDateTime, D::Error> {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let raw = String::deserialize(deserializer)?;
        PrimitiveDateTime::parse(&raw, format).map_err(de::Error::custom)
    }
}
