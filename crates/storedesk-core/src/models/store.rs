//! Stores, store staff and customer accounts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Pagination;
use super::validation::{
    check_email, check_phone, is_valid_opening_time, is_valid_pincode, require_finite,
    require_positive, require_text, ValidationError,
};
use crate::auth::Role;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub flatno: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Address {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.flatno, "address.flatno")?;
        require_text(&self.street, "address.street")?;
        require_text(&self.city, "address.city")?;
        require_text(&self.state, "address.state")?;
        if !is_valid_pincode(&self.pincode) {
            return Err(ValidationError::invalid(
                "address.pincode",
                "a 6-digit string",
            ));
        }
        Ok(())
    }

    /// Format the address as a single line.
    pub fn formatted(&self) -> String {
        [
            self.flatno.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.pincode.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A store as listed by the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Delivery radius around the pinned location
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub manager: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Store {
    /// Snapshot stored alongside the store id when acting as this store
    pub fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// `data` of `GET /admin/stores`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorePage {
    pub stores: Vec<Store>,
    pub pagination: Pagination,
}

/// Payload for `POST /admin/create-store`.
#[derive(Debug, Clone, Serialize)]
pub struct NewStore {
    pub name: String,
    pub address: Address,
    pub phone: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

impl NewStore {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        self.address.validate()?;
        check_phone(&self.phone, "phone")?;
        check_email(&self.email, "email")?;
        require_finite(self.latitude, "latitude")?;
        require_finite(self.longitude, "longitude")?;
        require_positive(self.radius, "radius")?;
        Ok(())
    }
}

/// Partial update for `PUT /admin/update-store`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<String>,
}

impl StoreUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.radius.is_none()
            && self.opening_time.is_none()
            && self.closing_time.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(ref name) = self.name {
            require_text(name, "name")?;
        }
        if let Some(ref phone) = self.phone {
            check_phone(phone, "phone")?;
        }
        if let Some(ref email) = self.email {
            check_email(email, "email")?;
        }
        if let Some(latitude) = self.latitude {
            require_finite(latitude, "latitude")?;
        }
        if let Some(longitude) = self.longitude {
            require_finite(longitude, "longitude")?;
        }
        if let Some(radius) = self.radius {
            require_positive(radius, "radius")?;
        }
        for (value, field) in [
            (&self.opening_time, "openingTime"),
            (&self.closing_time, "closingTime"),
        ] {
            if let Some(time) = value {
                if !is_valid_opening_time(time) {
                    return Err(ValidationError::invalid(field, "a string in format \"HH-MM\""));
                }
            }
        }
        Ok(())
    }
}

/// Payload for `POST /admin/create-admin`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

impl NewAdmin {
    /// Only superadmins and store managers are provisioned here; a store
    /// manager must be tied to a store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_text(&self.email, "email")?;
        require_text(&self.password, "password")?;
        match self.role {
            Role::SuperAdmin => Ok(()),
            Role::StoreManager => match self.store_id.as_deref() {
                Some(id) if !id.trim().is_empty() => Ok(()),
                _ => Err(ValidationError::Required("storeId")),
            },
            Role::StoreAdmin => Err(ValidationError::invalid(
                "role",
                "either \"superadmin\" or \"storemanager\"",
            )),
        }
    }

    /// Payload as sent; a store id is only meaningful for store managers.
    pub fn payload(&self) -> Self {
        let mut payload = self.clone();
        if self.role != Role::StoreManager {
            payload.store_id = None;
        }
        payload
    }
}

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_activate: Option<bool>,
    #[serde(default)]
    pub addresses: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Users listed by `GET /admin/users`, which pages at the top level.
#[derive(Debug, Clone, Default)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

/// Payload for `POST /admin/user/create`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub addresses: Vec<Value>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            addresses: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_text(&self.email, "email")?;
        require_text(&self.phone, "phone")?;
        check_phone(&self.phone, "phone")
    }
}

/// Payload for `PUT /admin/user/update/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_activate: Option<bool>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref phone) = self.phone {
            check_phone(phone, "phone")?;
        }
        Ok(())
    }
}
