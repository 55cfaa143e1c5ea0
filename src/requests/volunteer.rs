use crate::models::volunteer::{CreateVolunteer, UpdateVolunteer};
use serde::Deserialize;

/// Profile fields shared by volunteer sign-up, registration and upgrade.
#[derive(Debug, Default, Deserialize)]
pub struct VolunteerProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl VolunteerProfileRequest {
    /// `None` unless every field is present and non-blank.
    pub fn complete(&self) -> Option<CreateVolunteer> {
        Some(CreateVolunteer {
            name: filled(&self.name)?,
            email: filled(&self.email)?,
            phone: filled(&self.phone)?,
            address: filled(&self.address)?,
            city: filled(&self.city)?,
            state: filled(&self.state)?,
            zip: filled(&self.zip)?,
        })
    }

    pub fn into_update(self) -> UpdateVolunteer {
        UpdateVolunteer {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
        }
    }
}

pub(crate) fn filled(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
