use crate::models::{user::UserRole, volunteer::CreateVolunteer};
use crate::requests::volunteer::filled;
use serde::Deserialize;

/// Every field is optional on the wire so missing input is reported with
/// the API's own messages rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterError {
    MissingFields,
    InvalidEmail,
    UnknownRole,
    MissingVolunteerFields,
}

impl RegisterError {
    pub fn message(&self) -> &'static str {
        match self {
            RegisterError::MissingFields => "All fields are required",
            RegisterError::InvalidEmail => "A valid email is required",
            RegisterError::UnknownRole => "Role must be either user or volunteer",
            RegisterError::MissingVolunteerFields => {
                "Additional fields are required for volunteers"
            }
        }
    }
}

#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub volunteer: Option<CreateVolunteer>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<Registration, RegisterError> {
        let (Some(name), Some(email), Some(password), Some(role)) = (
            filled(&self.name),
            filled(&self.email),
            self.password.clone().filter(|p| !p.is_empty()),
            filled(&self.role),
        ) else {
            return Err(RegisterError::MissingFields);
        };

        if !email.contains('@') {
            return Err(RegisterError::InvalidEmail);
        }

        let role: UserRole = role.parse().map_err(|_| RegisterError::UnknownRole)?;

        let volunteer = match role {
            UserRole::Volunteer => Some(CreateVolunteer {
                name: name.clone(),
                email: email.clone(),
                phone: filled(&self.phone).ok_or(RegisterError::MissingVolunteerFields)?,
                address: filled(&self.address).ok_or(RegisterError::MissingVolunteerFields)?,
                city: filled(&self.city).ok_or(RegisterError::MissingVolunteerFields)?,
                state: filled(&self.state).ok_or(RegisterError::MissingVolunteerFields)?,
                zip: filled(&self.zip).ok_or(RegisterError::MissingVolunteerFields)?,
            }),
            UserRole::User => None,
        };

        Ok(Registration {
            name,
            email,
            password,
            role,
            volunteer,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(&self) -> Option<(String, String)> {
        let email = filled(&self.email)?;
        let password = self.password.clone().filter(|p| !p.is_empty())?;
        Some((email, password))
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeToVolunteerRequest {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl UpgradeToVolunteerRequest {
    /// The profile for `name`, or `None` if any volunteer field is blank.
    pub fn profile(&self, name: &str) -> Option<CreateVolunteer> {
        Some(CreateVolunteer {
            name: name.to_string(),
            email: self.email.trim().to_string(),
            phone: filled(&self.phone)?,
            address: filled(&self.address)?,
            city: filled(&self.city)?,
            state: filled(&self.state)?,
            zip: filled(&self.zip)?,
        })
    }
}
