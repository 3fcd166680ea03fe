use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The capability label stored on a user row. Users start as a single role
/// and are upgraded to `Both` the first time they act in the other capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "CUSTOMER")]
    Customer,
    #[serde(rename = "ORGANIZER")]
    Organizer,
    #[serde(rename = "BOTH")]
    Both,
}

/// The capacity a caller is acting in. Order creation targets `Customer`,
/// event creation targets `Organizer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTarget {
    Customer,
    Organizer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "CUSTOMER",
            UserRole::Organizer => "ORGANIZER",
            UserRole::Both => "BOTH",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CUSTOMER" => Some(UserRole::Customer),
            "ORGANIZER" => Some(UserRole::Organizer),
            "BOTH" => Some(UserRole::Both),
            _ => None,
        }
    }

    /// Total transition function: the role a user holds after acting in the
    /// `target` capacity. Idempotent once the target capability is held.
    pub fn upgraded_with(self, target: RoleTarget) -> Self {
        match (self, target) {
            (UserRole::Customer, RoleTarget::Organizer) => UserRole::Both,
            (UserRole::Organizer, RoleTarget::Customer) => UserRole::Both,
            (current, _) => current,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub user_type: String,
}

/// The subset of the user row returned on a successful login.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub user_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_combines_the_two_single_roles() {
        assert_eq!(
            UserRole::Customer.upgraded_with(RoleTarget::Organizer),
            UserRole::Both
        );
        assert_eq!(
            UserRole::Organizer.upgraded_with(RoleTarget::Customer),
            UserRole::Both
        );
    }

    #[test]
    fn upgrade_is_idempotent_once_capability_is_held() {
        assert_eq!(
            UserRole::Customer.upgraded_with(RoleTarget::Customer),
            UserRole::Customer
        );
        assert_eq!(
            UserRole::Organizer.upgraded_with(RoleTarget::Organizer),
            UserRole::Organizer
        );
        assert_eq!(
            UserRole::Both.upgraded_with(RoleTarget::Customer),
            UserRole::Both
        );
        assert_eq!(
            UserRole::Both.upgraded_with(RoleTarget::Organizer),
            UserRole::Both
        );
    }

    #[test]
    fn labels_round_trip() {
        for role in [UserRole::Customer, UserRole::Organizer, UserRole::Both] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("ADMIN"), None);
    }
}
