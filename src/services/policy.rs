//! Role-based access policy
//!
//! A pure mapping from (actor role, action) to allow/deny. Every mutation
//! entry point in the service layer calls [`authorize`] itself, so callers
//! cannot bypass the policy by invoking entity operations directly.

use serde::{Deserialize, Serialize};
use crate::models::user::Role;
use crate::utils::errors::{EventlyError, Result};

/// The authenticated actor attached to a request.
///
/// Always passed explicitly into policy and entity operations; the core
/// never reads identity from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

/// Every operation the policy gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Public tier
    BrowsePublishedEvents,
    ViewPublishedEvent,
    BrowseCategories,
    // Authenticated tier
    RegisterForEvent,
    ViewOwnRegistrations,
    ManageOwnProfile,
    ViewOwnDashboard,
    // Admin tier
    ManageEvents,
    ManageCategories,
    ManageRegistrations,
    ViewAdminDashboard,
    // Super-admin tier
    ManageUsers,
    ViewSystemReports,
}

/// Access tiers, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Public,
    Authenticated,
    Admin,
    SuperAdmin,
}

impl Action {
    /// Minimum tier required for the action
    pub fn required_tier(&self) -> Tier {
        match self {
            Action::BrowsePublishedEvents
            | Action::ViewPublishedEvent
            | Action::BrowseCategories => Tier::Public,
            Action::RegisterForEvent
            | Action::ViewOwnRegistrations
            | Action::ManageOwnProfile
            | Action::ViewOwnDashboard => Tier::Authenticated,
            Action::ManageEvents
            | Action::ManageCategories
            | Action::ManageRegistrations
            | Action::ViewAdminDashboard => Tier::Admin,
            Action::ManageUsers | Action::ViewSystemReports => Tier::SuperAdmin,
        }
    }
}

/// Tier a role grants
fn role_tier(role: Role) -> Tier {
    match role {
        Role::User => Tier::Authenticated,
        Role::Admin => Tier::Admin,
        Role::SuperAdmin => Tier::SuperAdmin,
    }
}

/// Pure allow/deny decision for an authenticated role
pub fn can_perform(role: Role, action: Action) -> bool {
    role_tier(role) >= action.required_tier()
}

/// Enforce the policy for an optionally-authenticated actor.
///
/// No actor on a non-public action fails with `Unauthorized`; an actor
/// below the required tier fails with `Forbidden`.
pub fn authorize(actor: Option<&Actor>, action: Action) -> Result<()> {
    if action.required_tier() == Tier::Public {
        return Ok(());
    }

    let actor = actor.ok_or(EventlyError::Unauthorized)?;

    if can_perform(actor.role, action) {
        Ok(())
    } else {
        tracing::warn!(
            actor_id = actor.id,
            role = %actor.role,
            action = ?action,
            "Access denied"
        );
        Err(EventlyError::Forbidden(format!(
            "Role {} cannot perform {:?}",
            actor.role, action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn actor(role: Role) -> Actor {
        Actor { id: 7, role }
    }

    #[test]
    fn test_public_actions_allow_everyone() {
        assert!(authorize(None, Action::BrowsePublishedEvents).is_ok());
        assert!(authorize(Some(&actor(Role::User)), Action::ViewPublishedEvent).is_ok());
    }

    #[test]
    fn test_admin_tier_includes_super_admin() {
        assert!(can_perform(Role::Admin, Action::ManageEvents));
        assert!(can_perform(Role::SuperAdmin, Action::ManageEvents));
        assert!(!can_perform(Role::User, Action::ManageEvents));
    }

    #[test]
    fn test_super_admin_tier_excludes_admin() {
        assert!(can_perform(Role::SuperAdmin, Action::ManageUsers));
        assert!(!can_perform(Role::Admin, Action::ManageUsers));
        assert!(!can_perform(Role::Admin, Action::ViewSystemReports));
    }

    #[test]
    fn test_unauthenticated_is_unauthorized() {
        assert_matches!(
            authorize(None, Action::RegisterForEvent),
            Err(EventlyError::Unauthorized)
        );
        assert_matches!(
            authorize(None, Action::ManageEvents),
            Err(EventlyError::Unauthorized)
        );
    }

    #[test]
    fn test_below_tier_is_forbidden() {
        assert_matches!(
            authorize(Some(&actor(Role::User)), Action::ManageEvents),
            Err(EventlyError::Forbidden(_))
        );
        assert_matches!(
            authorize(Some(&actor(Role::Admin)), Action::ManageUsers),
            Err(EventlyError::Forbidden(_))
        );
    }

    #[test]
    fn test_authenticated_tier_allows_any_role() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert!(can_perform(role, Action::RegisterForEvent));
            assert!(can_perform(role, Action::ManageOwnProfile));
        }
    }
}
