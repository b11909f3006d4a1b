use serde::{Serialize, Deserialize};

/// Role of the calling principal, as supplied by the authentication
/// collaborator. First registered account is the admin; everyone after
/// that is staff until promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Staff,
}

/// Opaque view of the caller. The guard never manages login or session
/// lifecycle; it only reads these three facts.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub actor_id: i64,
}

impl Principal {
    pub fn anonymous() -> Self {
        Principal {
            authenticated: false,
            role: None,
            actor_id: 0,
        }
    }

    pub fn staff(actor_id: i64) -> Self {
        Principal {
            authenticated: true,
            role: Some(Role::Staff),
            actor_id,
        }
    }

    pub fn admin(actor_id: i64) -> Self {
        Principal {
            authenticated: true,
            role: Some(Role::Admin),
            actor_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    /// Listing, detail and dashboard reads.
    Read,
    /// Create, edit, delete and bulk import.
    Mutate,
    /// Promoting and demoting accounts.
    RoleManage,
}

/// Guard verdict. Carries the user-visible notice text so the
/// presentation layer renders, never decides.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allow,
    /// Not logged in: send to the login page.
    RequireLogin,
    /// Logged in but not permitted: back to the listing with a notice.
    Deny { notice: String },
    /// Permitted but pointless: nothing changes, the caller sees why.
    NoOp { notice: String },
}

/// The role policy, as a stateless predicate.
pub fn authorize(principal: &Principal, operation: OperationClass) -> Decision {
    if !principal.authenticated {
        return Decision::RequireLogin;
    }
    match operation {
        OperationClass::Read => Decision::Allow,
        OperationClass::Mutate | OperationClass::RoleManage => match principal.role {
            Some(Role::Admin) => Decision::Allow,
            _ => Decision::Deny {
                notice: "You do not have permission to perform this action.".to_string(),
            },
        },
    }
}

/// Demotion adds one rule on top of the role policy: an admin may not
/// downgrade their own account. That case is a no-op with an advisory,
/// not a denial.
pub fn authorize_demotion(principal: &Principal, target_id: i64) -> Decision {
    match authorize(principal, OperationClass::RoleManage) {
        Decision::Allow if principal.actor_id == target_id => Decision::NoOp {
            notice: "You cannot downgrade your own account.".to_string(),
        },
        decision => decision,
    }
}
