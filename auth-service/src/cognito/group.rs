//! The closed set of Cognito user groups.

use std::fmt;

/// Cognito group a registered user is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserGroup {
    Merchant,
    Standard,
}

impl UserGroup {
    pub const ALL: [UserGroup; 2] = [UserGroup::Merchant, UserGroup::Standard];

    /// Group name as configured in the user pool.
    pub fn group_name(self) -> &'static str {
        match self {
            UserGroup::Merchant => "Merchant",
            UserGroup::Standard => "Standard",
        }
    }

    /// Resolve a group name, ignoring ASCII case.
    ///
    /// Surrounding whitespace is not stripped: `" Merchant"` does not resolve.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.group_name().eq_ignore_ascii_case(value))
    }

    /// Group assigned at sign-up.
    pub fn for_registration(is_merchant: bool) -> Self {
        if is_merchant {
            UserGroup::Merchant
        } else {
            UserGroup::Standard
        }
    }
}

impl fmt::Display for UserGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}
