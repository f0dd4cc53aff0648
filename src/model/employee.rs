use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roster entry. The directory of team members is owned elsewhere; this is
/// the read-only view the attendance analytics work against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "6f1c2f3e-0d4b-4f8e-9d0a-3c2b1a0f9e8d",
        "name": "John Doe",
        "email": "john.doe@company.com",
        "role": "Sales Lead"
    })
)]
pub struct Employee {
    #[schema(example = "6f1c2f3e-0d4b-4f8e-9d0a-3c2b1a0f9e8d")]
    pub id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Sales Lead")]
    pub role: String,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            role: role.into(),
        }
    }
}
