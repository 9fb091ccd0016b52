use crate::{AccountError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type AccountId = i64;

const MAX_NAME: usize = 64;
const MAX_EMAIL: usize = 64;
const MAX_ADDRESS: usize = 256;
const MAX_PHONE: usize = 32;

/// A stored customer account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub date_joined: NaiveDate,
}

impl Account {
    /// Overwrite the mutable fields with a client payload.
    ///
    /// The id never changes. `date_joined` is only replaced when the
    /// payload carries one.
    pub fn apply(&mut self, update: NewAccount) {
        self.name = update.name;
        self.email = update.email;
        self.address = update.address;
        self.phone_number = update.phone_number;
        if let Some(date_joined) = update.date_joined {
            self.date_joined = date_joined;
        }
    }
}

/// Account payload as sent by a client on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_joined: Option<NaiveDate>,
}

impl NewAccount {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
            phone_number: None,
            date_joined: None,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_date_joined(mut self, date_joined: NaiveDate) -> Self {
        self.date_joined = Some(date_joined);
        self
    }

    /// Check the payload against the column limits of the accounts table
    pub fn validate(&self) -> Result<()> {
        check_required("name", &self.name, MAX_NAME)?;
        check_required("email", &self.email, MAX_EMAIL)?;
        check_required("address", &self.address, MAX_ADDRESS)?;
        if let Some(phone) = &self.phone_number {
            check_length("phone_number", phone, MAX_PHONE)?;
        }
        Ok(())
    }

    /// Turn the payload into a stored account, defaulting `date_joined` to `today`
    pub fn into_account(self, id: AccountId, today: NaiveDate) -> Account {
        Account {
            id,
            name: self.name,
            email: self.email,
            address: self.address,
            phone_number: self.phone_number,
            date_joined: self.date_joined.unwrap_or(today),
        }
    }
}

fn check_required(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AccountError::Validation(format!("{} must not be empty", field)));
    }
    check_length(field, value, max)
}

fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(AccountError::Validation(format!(
            "{} is {} characters long, the limit is {}",
            field, len, max
        )));
    }
    Ok(())
}
