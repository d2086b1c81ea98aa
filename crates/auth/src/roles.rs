use serde::{Deserialize, Serialize};

use rolegate_core::DomainError;

/// Privilege level attached to every user.
///
/// Closed set, ordered by privilege: `Root > Admin > Client`. Serialized as the
/// uppercase strings `"ROOT"`, `"ADMIN"` and `"CLIENT"`.
///
/// `Admin` is reserved; no gate grants it anything beyond `Client` today.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Client,
    Admin,
    Root,
}

impl Role {
    /// Role of every user that is not created as a superuser.
    pub const BASE: Role = Role::Client;

    pub const ALL: [Role; 3] = [Role::Root, Role::Admin, Role::Client];

    /// Role assigned when a user record is first persisted.
    ///
    /// Evaluated exactly once per user. Later changes to `is_superuser` never
    /// feed back into the role.
    pub fn for_new_user(is_superuser: bool) -> Role {
        if is_superuser { Role::Root } else { Role::BASE }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Root => "ROOT",
            Role::Admin => "ADMIN",
            Role::Client => "CLIENT",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOT" => Ok(Role::Root),
            "ADMIN" => Ok(Role::Admin),
            "CLIENT" => Ok(Role::Client),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}' (expected ROOT, ADMIN or CLIENT)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn privilege_order() {
        assert!(Role::Root > Role::Admin);
        assert!(Role::Admin > Role::Client);
        assert_eq!(Role::ALL.iter().max(), Some(&Role::Root));
    }

    #[test]
    fn superuser_flag_decides_initial_role() {
        assert_eq!(Role::for_new_user(true), Role::Root);
        assert_eq!(Role::for_new_user(false), Role::Client);
        assert_eq!(Role::default(), Role::Client);
    }

    #[test]
    fn string_forms_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn parsing_is_exact() {
        assert!("root".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    proptest! {
        #[test]
        fn display_and_parse_agree(role in prop::sample::select(Role::ALL.to_vec())) {
            prop_assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }

        #[test]
        fn only_superusers_start_as_root(is_superuser in any::<bool>()) {
            let role = Role::for_new_user(is_superuser);
            prop_assert_eq!(role == Role::Root, is_superuser);
            prop_assert!(role == Role::Root || role == Role::BASE);
        }

        #[test]
        fn unknown_names_do_not_parse(raw in "[A-Za-z]{0,12}") {
            prop_assume!(!["ROOT", "ADMIN", "CLIENT"].contains(&raw.as_str()));
            prop_assert!(raw.parse::<Role>().is_err());
        }
    }
}
