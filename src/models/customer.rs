use bb8_postgres::tokio_postgres::Row;
use serde::Serialize;
use tracing::debug;
use crate::models::error::ModelError;
use crate::models::normalize_notes;
use crate::models::reservation::Reservation;
use crate::repositories::postgres_repo::PostgresConnectionRepo;

const SELECT_CUSTOMERS: &str = "SELECT id, first_name, last_name, phone, notes FROM customers";

/// Customer of the restaurant.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    pub id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    notes: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct TopCustomer {
    pub customer: Customer,
    pub count: i64,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone,
            notes: normalize_notes(notes),
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = normalize_notes(notes);
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn all(
        postgres_repo: &PostgresConnectionRepo,
    ) -> Result<Vec<Customer>, ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;
        let stmt = format!("{} ORDER BY last_name, first_name", SELECT_CUSTOMERS);

        let rows = conn
            .query(&stmt, &[])
            .await?;

        rows.iter()
            .map(parse_row_into_customer)
            .collect()
    }

    /// Customers whose first, last or full name starts with `term`, case-insensitively.
    pub async fn search(
        postgres_repo: &PostgresConnectionRepo,
        term: &str,
    ) -> Result<Vec<Customer>, ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;
        let stmt = format!(
            "{} WHERE first_name ILIKE $1 \
            OR last_name ILIKE $1 \
            OR (first_name || ' ' || last_name) ILIKE $1 \
            ORDER BY last_name, first_name",
            SELECT_CUSTOMERS
        );

        let rows = conn
            .query(&stmt, &[&search_pattern(term)])
            .await?;
        debug!("Search for {:?} matched {} customers", term, rows.len());

        rows.iter()
            .map(parse_row_into_customer)
            .collect()
    }

    /// The ten customers holding the most reservations, busiest first.
    pub async fn top_ten(
        postgres_repo: &PostgresConnectionRepo,
    ) -> Result<Vec<TopCustomer>, ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;

        let rows = conn
            .query(
                "SELECT c.id, c.first_name, c.last_name, c.phone, c.notes, COUNT(r.id) AS number \
                FROM reservations AS r \
                JOIN customers AS c ON c.id = r.customer_id \
                GROUP BY c.id \
                ORDER BY number DESC, c.last_name, c.first_name \
                LIMIT 10",
                &[],
            ).await?;

        rows.iter()
            .map(|row| -> Result<TopCustomer, ModelError> {
                Ok(TopCustomer {
                    customer: parse_row_into_customer(row)?,
                    count: row.try_get("number")?,
                })
            })
            .collect()
    }

    pub async fn get(
        postgres_repo: &PostgresConnectionRepo,
        id: i32,
    ) -> Result<Customer, ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;
        let stmt = format!("{} WHERE id = $1", SELECT_CUSTOMERS);

        let row = conn
            .query_opt(&stmt, &[&id])
            .await?
            .ok_or_else(|| ModelError::not_found("customer", id))?;

        parse_row_into_customer(&row)
    }

    pub async fn get_reservations(
        &self,
        postgres_repo: &PostgresConnectionRepo,
    ) -> Result<Vec<Reservation>, ModelError> {
        match self.id {
            Some(id) => Reservation::get_reservations_for_customer(postgres_repo, id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Inserts the customer when it has no id yet, otherwise updates the stored row.
    pub async fn save(
        &mut self,
        postgres_repo: &PostgresConnectionRepo,
    ) -> Result<(), ModelError> {
        let conn = postgres_repo.get_postgres_connection().await?;

        match self.id {
            None => {
                let row = conn
                    .query_one(
                        "INSERT INTO customers (first_name, last_name, phone, notes) \
                        VALUES ($1, $2, $3, $4) \
                        RETURNING id",
                        &[&self.first_name, &self.last_name, &self.phone, &self.notes],
                    ).await?;
                let id: i32 = row.try_get("id")?;
                debug!("Inserted customer {}", id);
                self.id = Some(id);
            }
            Some(id) => {
                let updated = conn
                    .execute(
                        "UPDATE customers SET first_name = $1, last_name = $2, phone = $3, notes = $4 \
                        WHERE id = $5",
                        &[&self.first_name, &self.last_name, &self.phone, &self.notes, &id],
                    ).await?;
                if updated == 0 {
                    return Err(ModelError::not_found("customer", id));
                }
                debug!("Updated customer {}", id);
            }
        }

        Ok(())
    }
}

/// Prefix pattern for ILIKE with the term's own wildcards escaped.
fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 1);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn parse_row_into_customer(
    row: &Row,
) -> Result<Customer, ModelError> {
    let customer = Customer::new(
        row.try_get::<&str, String>("first_name")?,
        row.try_get::<&str, String>("last_name")?,
        row.try_get("phone")?,
        row.try_get("notes")?,
    );

    Ok(customer.with_id(row.try_get("id")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_notes_become_empty() {
        let customer = Customer::new("Ada", "Lovelace", None, None);
        assert_eq!(customer.notes(), "");

        let mut customer = Customer::new("Ada", "Lovelace", None, Some("regular".into()));
        assert_eq!(customer.notes(), "regular");

        customer.set_notes(Some(String::new()));
        assert_eq!(customer.notes(), "");
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let customer = Customer::new("Grace", "Hopper", Some("555-0100".into()), None);
        assert_eq!(customer.full_name(), "Grace Hopper");
    }

    #[test]
    fn new_customers_have_no_id() {
        let customer = Customer::new("Grace", "Hopper", None, None);
        assert_eq!(customer.id, None);
        assert_eq!(customer.with_id(3).id, Some(3));
    }

    #[test]
    fn search_pattern_matches_prefix_literally() {
        assert_eq!(search_pattern("Jo"), "Jo%");
        assert_eq!(search_pattern(""), "%");
        assert_eq!(search_pattern("50%_off\\"), "50\\%\\_off\\\\%");
    }

    #[test]
    fn serializes_notes_as_plain_field() {
        let customer = Customer::new("Grace", "Hopper", None, None).with_id(1);

        assert_eq!(serde_json::to_value(&customer).unwrap(), json!({
            "id": 1,
            "first_name": "Grace",
            "last_name": "Hopper",
            "phone": null,
            "notes": "",
        }));
    }
}
