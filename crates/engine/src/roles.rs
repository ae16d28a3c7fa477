//! String-backed enums stored in the database.

use crate::EngineError;

/// The kind of account a user holds. Each user has exactly one role and one
/// matching profile row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Employee,
    Customer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Employee, Role::Customer];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Employee => "employee",
            Self::Customer => "customer",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "employee" => Ok(Self::Employee),
            "customer" => Ok(Self::Customer),
            other => Err(EngineError::invalid(
                "user_type",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            other => Err(EngineError::invalid(
                "payment_method",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}
