//! Role-based authorization.
//!
//! Every handler names its [`Action`] and calls [`authorize`] before touching
//! the database. Store-scoped actions additionally call [`authorize_for_store`]
//! once the store's owner is known.

use thiserror::Error;

use star_rating_core::{Role, UserId};

use crate::models::Identity;

/// Why a caller was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No valid session token.
    #[error("authentication required")]
    Unauthenticated,
    /// Valid session, but the role may not perform this action.
    #[error("insufficient permissions")]
    Forbidden,
}

/// Who may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, with or without a session.
    Public,
    /// Any signed-in caller.
    Authenticated,
    /// Signed-in callers holding one of these roles.
    Roles(&'static [Role]),
}

/// Everything the API lets a caller do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    Login,
    ListUsers,
    CreateUser,
    CreateStore,
    ListStores,
    ViewStore,
    ListOwnedStores,
    SubmitRating,
    ListOwnRatings,
    ListStoreRatings,
    ViewStats,
    ViewProfile,
    UpdateProfile,
    ChangePassword,
}

impl Action {
    /// The access rule for this action.
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Register | Self::Login => Access::Public,
            Self::ListOwnRatings | Self::ViewProfile | Self::UpdateProfile | Self::ChangePassword => {
                Access::Authenticated
            }
            Self::ListUsers | Self::CreateUser | Self::ViewStats => Access::Roles(&[Role::Admin]),
            Self::CreateStore | Self::ListStoreRatings => {
                Access::Roles(&[Role::Admin, Role::StoreOwner])
            }
            Self::ListStores => Access::Roles(&[Role::Admin, Role::User]),
            Self::ViewStore => Access::Roles(&[Role::Admin, Role::User, Role::StoreOwner]),
            Self::ListOwnedStores => Access::Roles(&[Role::StoreOwner]),
            Self::SubmitRating => Access::Roles(&[Role::User]),
        }
    }
}

/// Decide whether `caller` may perform `action`.
///
/// # Errors
///
/// Returns `PolicyError::Unauthenticated` when a session is required and
/// absent, `PolicyError::Forbidden` when the caller's role is not permitted.
pub fn authorize(action: Action, caller: Option<&Identity>) -> Result<(), PolicyError> {
    match (action.access(), caller) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(PolicyError::Unauthenticated),
        (Access::Authenticated, Some(_)) => Ok(()),
        (Access::Roles(roles), Some(identity)) => {
            if roles.contains(&identity.role) {
                Ok(())
            } else {
                tracing::debug!(?action, user_id = %identity.id, role = %identity.role, "Forbidden");
                Err(PolicyError::Forbidden)
            }
        }
    }
}

/// Like [`authorize`], and additionally confines store owners to stores they own.
///
/// # Errors
///
/// Returns `PolicyError::Forbidden` when a store owner targets someone else's store.
pub fn authorize_for_store(
    action: Action,
    caller: &Identity,
    owner: UserId,
) -> Result<(), PolicyError> {
    authorize(action, Some(caller))?;
    if caller.is(Role::StoreOwner) && caller.id != owner {
        tracing::debug!(?action, user_id = %caller.id, %owner, "Store belongs to another owner");
        return Err(PolicyError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use star_rating_core::Email;

    use super::*;

    fn caller(role: Role) -> Identity {
        Identity {
            id: UserId::new(1),
            email: Email::parse("caller@x.com").unwrap(),
            role,
        }
    }

    /// (action, admin, user, `store_owner`)
    const TABLE: &[(Action, bool, bool, bool)] = &[
        (Action::Register, true, true, true),
        (Action::Login, true, true, true),
        (Action::ListUsers, true, false, false),
        (Action::CreateUser, true, false, false),
        (Action::CreateStore, true, false, true),
        (Action::ListStores, true, true, false),
        (Action::ViewStore, true, true, true),
        (Action::ListOwnedStores, false, false, true),
        (Action::SubmitRating, false, true, false),
        (Action::ListOwnRatings, true, true, true),
        (Action::ListStoreRatings, true, false, true),
        (Action::ViewStats, true, false, false),
        (Action::ViewProfile, true, true, true),
        (Action::UpdateProfile, true, true, true),
        (Action::ChangePassword, true, true, true),
    ];

    #[test]
    fn test_role_table() {
        for &(action, admin, user, owner) in TABLE {
            for (role, expected) in [
                (Role::Admin, admin),
                (Role::User, user),
                (Role::StoreOwner, owner),
            ] {
                let result = authorize(action, Some(&caller(role)));
                if expected {
                    assert_eq!(result, Ok(()), "{action:?} should allow {role}");
                } else {
                    assert_eq!(
                        result,
                        Err(PolicyError::Forbidden),
                        "{action:?} should forbid {role}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_anonymous_callers() {
        for &(action, ..) in TABLE {
            let result = authorize(action, None);
            if action.access() == Access::Public {
                assert_eq!(result, Ok(()));
            } else {
                assert_eq!(result, Err(PolicyError::Unauthenticated), "{action:?}");
            }
        }
    }

    #[test]
    fn test_store_owner_confined_to_own_stores() {
        let owner = caller(Role::StoreOwner);
        assert_eq!(
            authorize_for_store(Action::ListStoreRatings, &owner, UserId::new(1)),
            Ok(())
        );
        assert_eq!(
            authorize_for_store(Action::ListStoreRatings, &owner, UserId::new(2)),
            Err(PolicyError::Forbidden)
        );
        assert_eq!(
            authorize_for_store(Action::ViewStore, &owner, UserId::new(2)),
            Err(PolicyError::Forbidden)
        );
    }

    #[test]
    fn test_admin_reads_any_store() {
        let admin = caller(Role::Admin);
        assert_eq!(
            authorize_for_store(Action::ListStoreRatings, &admin, UserId::new(99)),
            Ok(())
        );
    }

    #[test]
    fn test_user_cannot_read_store_ratings() {
        let user = caller(Role::User);
        assert_eq!(
            authorize_for_store(Action::ListStoreRatings, &user, UserId::new(1)),
            Err(PolicyError::Forbidden)
        );
        assert_eq!(
            authorize_for_store(Action::ViewStore, &user, UserId::new(99)),
            Ok(())
        );
    }
}
