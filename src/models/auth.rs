// src/models/auth.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Roles
// ---

/// Role carried inside the session token. One per identity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// Closed enumerations for workforce members
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StudentClass {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "XI")]
    Xi,
    #[serde(rename = "XII")]
    Xii,
}

impl StudentClass {
    pub const ALL: [StudentClass; 3] = [StudentClass::X, StudentClass::Xi, StudentClass::Xii];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentClass::X => "X",
            StudentClass::Xi => "XI",
            StudentClass::Xii => "XII",
        }
    }
}

impl FromStr for StudentClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudentClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Major {
    #[serde(rename = "RPL")]
    Rpl,
    #[serde(rename = "DKV1")]
    Dkv1,
    #[serde(rename = "DKV2")]
    Dkv2,
    #[serde(rename = "BR")]
    Br,
    #[serde(rename = "MP")]
    Mp,
    #[serde(rename = "AK")]
    Ak,
}

impl Major {
    pub const ALL: [Major; 6] = [Major::Rpl, Major::Dkv1, Major::Dkv2, Major::Br, Major::Mp, Major::Ak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Major::Rpl => "RPL",
            Major::Dkv1 => "DKV1",
            Major::Dkv2 => "DKV2",
            Major::Br => "BR",
            Major::Mp => "MP",
            Major::Ak => "AK",
        }
    }
}

impl FromStr for Major {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Major::ALL.into_iter().find(|m| m.as_str() == s).ok_or(())
    }
}

// ---
// Identity records
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Administrator {
    pub id: Uuid,
    pub username: String,

    #[serde(skip_serializing)] // never leaves the server
    #[schema(ignore)]
    pub password_hash: String,

    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceMember {
    pub id: Uuid,
    pub nisn: String,
    pub username: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "class")]
    pub class: StudentClass,
    pub major: Major,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Both identity classes behind one username namespace.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Identity {
    Administrator(Administrator),
    WorkforceMember(WorkforceMember),
}

impl Identity {
    pub fn id(&self) -> Uuid {
        match self {
            Identity::Administrator(a) => a.id,
            Identity::WorkforceMember(w) => w.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Identity::Administrator(_) => Role::Admin,
            Identity::WorkforceMember(_) => Role::Employee,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Identity::Administrator(a) => &a.username,
            Identity::WorkforceMember(w) => &w.username,
        }
    }
}

/// Validated registration, digest already computed.
#[derive(Debug, Clone)]
pub struct NewWorkforceMember {
    pub nisn: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub class: StudentClass,
    pub major: Major,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(
        required(message = "auth.username_required"),
        length(min = 1, message = "auth.username_required")
    )]
    #[schema(example = "admin")]
    pub username: Option<String>,

    #[validate(
        required(message = "auth.password_required"),
        length(min = 1, message = "auth.password_required")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(required(message = "field.required"), length(min = 1, message = "field.required"))]
    #[schema(example = "0051234567")]
    pub nisn: Option<String>,

    #[validate(required(message = "field.required"), length(min = 1, message = "field.required"))]
    pub username: Option<String>,

    #[validate(required(message = "field.required"), length(min = 1, message = "field.required"))]
    pub password: Option<String>,

    #[validate(required(message = "field.required"), length(min = 1, message = "field.required"))]
    pub full_name: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[validate(required(message = "field.required"))]
    #[schema(example = "XI")]
    pub student_class: Option<String>,

    #[validate(required(message = "field.required"))]
    #[schema(example = "RPL")]
    pub major: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[validate(required(message = "field.required"))]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub role: Role,
    pub token: String,
    pub profile: Identity,
}

/// Claims inside the signed session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,  // subject (identity id)
    pub role: Role,
    pub iat: i64,   // issued at, unix seconds
    pub exp: i64,   // absolute expiry, unix seconds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_enumerations_parse_only_known_values() {
        assert_eq!("XI".parse::<StudentClass>(), Ok(StudentClass::Xi));
        assert!("XIII".parse::<StudentClass>().is_err());
        assert!("xi".parse::<StudentClass>().is_err());

        assert_eq!("DKV2".parse::<Major>(), Ok(Major::Dkv2));
        assert!("TKJ".parse::<Major>().is_err());
    }

    #[test]
    fn profile_never_serializes_the_digest() {
        let member = WorkforceMember {
            id: Uuid::new_v4(),
            nisn: "123".into(),
            username: "budi".into(),
            password_hash: "$2b$04$secret".into(),
            full_name: "Budi".into(),
            phone: None,
            address: None,
            class: StudentClass::X,
            major: Major::Ak,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(Identity::WorkforceMember(member)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["class"], "X");
        assert_eq!(json["major"], "AK");
        assert_eq!(json["isActive"], true);
    }
}
