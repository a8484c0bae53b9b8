//! Role-membership checks for the HTTP authorisation layer.
//!
//! Deterministic, pure logic. `system_admin` implicitly satisfies any
//! subordinate role check — a caller never needs both roles listed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SystemAdmin,
    Auditor,
    Supervisor,
}

/// `roles` are the raw role strings returned by the auth collaborator;
/// `role_names` resolves each [`Role`] to its configured name.
pub fn has_role(roles: &[String], role_names: &RoleNames, required: Role) -> bool {
    let admin = role_names.system_admin.as_str();
    if roles.iter().any(|r| r == admin) {
        return true;
    }
    let name = match required {
        Role::SystemAdmin => return roles.iter().any(|r| r == admin),
        Role::Auditor => role_names.auditor.as_str(),
        Role::Supervisor => role_names.supervisor.as_str(),
    };
    roles.iter().any(|r| r == name)
}

#[derive(Debug, Clone)]
pub struct RoleNames {
    pub system_admin: String,
    pub auditor: String,
    pub supervisor: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> RoleNames {
        RoleNames {
            system_admin: "system_admin".to_string(),
            auditor: "inventory_auditor".to_string(),
            supervisor: "inventory_audit_supervisor".to_string(),
        }
    }

    #[test]
    fn admin_satisfies_subordinate_roles() {
        let roles = vec!["system_admin".to_string()];
        assert!(has_role(&roles, &names(), Role::Auditor));
        assert!(has_role(&roles, &names(), Role::Supervisor));
    }

    #[test]
    fn plain_auditor_does_not_satisfy_supervisor() {
        let roles = vec!["inventory_auditor".to_string()];
        assert!(has_role(&roles, &names(), Role::Auditor));
        assert!(!has_role(&roles, &names(), Role::Supervisor));
    }
}
