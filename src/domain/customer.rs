use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require, validate_email, validate_phone, ValidationError};

pub type CustomerId = i64;

/// A customer record. `id` and `created_at` are assigned by the data service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// The user-editable fields of a customer, as entered in a create or edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerDetails {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Check every field and return the trimmed details.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require("Name", &self.name)?,
            email: validate_email(&self.email)?,
            phone: validate_phone(&self.phone)?,
        })
    }
}

impl From<&Customer> for CustomerDetails {
    fn from(customer: &Customer) -> Self {
        Self::new(&customer.name, &customer.email, &customer.phone)
    }
}
