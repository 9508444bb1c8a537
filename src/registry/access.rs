//! Role-based access control consumed by the registry.
//!
//! The registry only needs membership checks and grant/revoke; the
//! [`AccessControl`] trait is the seam for plugging in another engine.

use std::collections::{HashMap, HashSet};

use alloy::primitives::{keccak256, Address, B256};

/// The two fixed registry roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Manages admins; its own admin.
    SuperAdmin,
    /// Manages feed assignments and dust.
    Admin,
}

impl Role {
    /// Every role.
    pub const ALL: [Role; 2] = [Role::SuperAdmin, Role::Admin];

    /// Role name.
    pub fn name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
        }
    }

    /// Name of the contract constant holding the role id.
    pub fn constant_name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN_ROLE",
            Role::Admin => "ADMIN_ROLE",
        }
    }

    /// `keccak256` of the constant name, as used on the ABI surface.
    pub fn id(&self) -> B256 {
        keccak256(self.constant_name())
    }

    /// Look up a role by its identifier.
    pub fn from_id(id: B256) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Membership store for registry roles.
///
/// Authorization of grant/revoke callers is the registry's job; these
/// methods only mutate membership.
pub trait AccessControl: Send + Sync + std::fmt::Debug {
    /// Whether `account` holds `role`.
    fn has_role(&self, role: Role, account: Address) -> bool;

    /// Role whose members may grant and revoke `role`.
    fn get_role_admin(&self, role: Role) -> Role;

    /// Add `account` to `role`; returns false if it was already a member.
    fn grant_role(&mut self, role: Role, account: Address) -> bool;

    /// Remove `account` from `role`; returns false if it was not a member.
    fn revoke_role(&mut self, role: Role, account: Address) -> bool;
}

/// In-memory role table with `SUPER_ADMIN` administering both roles.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    members: HashMap<Role, HashSet<Address>>,
}

impl RoleTable {
    /// Create a table with one super admin and a set of admins.
    pub fn new(super_admin: Address, admins: &[Address]) -> Self {
        let mut table = Self::default();
        table.grant_role(Role::SuperAdmin, super_admin);
        for admin in admins {
            table.grant_role(Role::Admin, *admin);
        }
        table
    }

    /// Members of `role`.
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members.get(&role).map(|set| set.iter().copied().collect()).unwrap_or_default()
    }
}

impl AccessControl for RoleTable {
    fn has_role(&self, role: Role, account: Address) -> bool {
        self.members.get(&role).is_some_and(|set| set.contains(&account))
    }

    fn get_role_admin(&self, _role: Role) -> Role {
        Role::SuperAdmin
    }

    fn grant_role(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    fn revoke_role(&mut self, role: Role, account: Address) -> bool {
        self.members.get_mut(&role).is_some_and(|set| set.remove(&account))
    }
}
