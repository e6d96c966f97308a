// =============================================================================
// Access Control Account
// =============================================================================
// The single authorization object every role-gated instruction consults.
// Grants are plain (role, member) pairs; one member may hold several roles and
// one role may be held by several members.
// =============================================================================

use anchor_lang::prelude::*;

use crate::constants::MAX_ROLE_GRANTS;
use crate::error::VaultError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum Role {
    /// Updates vault configuration and manages role grants
    Admin,
    /// Appends TVL entries and confirms deposits
    Oracle,
    /// Advances and settles withdraw batches, retrieves liquidity
    Executor,
    /// Claims fees and sweeps dust
    Claimer,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub struct RoleGrant {
    pub role: Role,
    pub member: Pubkey,
}

/// PDA: ["access_control", vault]
#[account]
#[derive(InitSpace, Default)]
pub struct AccessControl {
    /// The vault these grants apply to
    pub vault: Pubkey,

    #[max_len(16)]
    pub grants: Vec<RoleGrant>,

    pub bump: u8,
}

impl AccessControl {
    pub fn has_role(&self, role: Role, member: &Pubkey) -> bool {
        self.grants
            .iter()
            .any(|grant| grant.role == role && grant.member == *member)
    }

    pub fn grant(&mut self, role: Role, member: Pubkey) -> Result<()> {
        require!(member != Pubkey::default(), VaultError::InvalidAddress);
        require!(!self.has_role(role, &member), VaultError::RoleAlreadyGranted);
        require!(
            self.grants.len() < MAX_ROLE_GRANTS,
            VaultError::RoleCapacityReached
        );

        self.grants.push(RoleGrant { role, member });

        Ok(())
    }

    pub fn revoke(&mut self, role: Role, member: &Pubkey) -> Result<()> {
        let position = self
            .grants
            .iter()
            .position(|grant| grant.role == role && grant.member == *member)
            .ok_or(error!(VaultError::RoleNotGranted))?;

        if role == Role::Admin {
            let admins = self
                .grants
                .iter()
                .filter(|grant| grant.role == Role::Admin)
                .count();
            require!(admins > 1, VaultError::LastAdmin);
        }

        self.grants.swap_remove(position);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_vault_err;

    #[test]
    fn test_grant_and_check_roles() {
        let admin = Pubkey::new_unique();
        let oracle = Pubkey::new_unique();
        let mut access = AccessControl::default();

        access.grant(Role::Admin, admin).unwrap();
        access.grant(Role::Oracle, oracle).unwrap();

        assert!(access.has_role(Role::Admin, &admin));
        assert!(access.has_role(Role::Oracle, &oracle));
        assert!(!access.has_role(Role::Oracle, &admin));
        assert!(!access.has_role(Role::Executor, &oracle));

        assert_vault_err(access.grant(Role::Oracle, oracle), VaultError::RoleAlreadyGranted);
        assert_vault_err(
            access.grant(Role::Claimer, Pubkey::default()),
            VaultError::InvalidAddress,
        );
    }

    #[test]
    fn test_revoke_keeps_last_admin() {
        let admin = Pubkey::new_unique();
        let second_admin = Pubkey::new_unique();
        let mut access = AccessControl::default();
        access.grant(Role::Admin, admin).unwrap();

        assert_vault_err(access.revoke(Role::Admin, &admin), VaultError::LastAdmin);
        assert_vault_err(
            access.revoke(Role::Executor, &admin),
            VaultError::RoleNotGranted,
        );

        access.grant(Role::Admin, second_admin).unwrap();
        access.revoke(Role::Admin, &admin).unwrap();
        assert!(!access.has_role(Role::Admin, &admin));
        assert!(access.has_role(Role::Admin, &second_admin));
    }

    #[test]
    fn test_capacity() {
        let mut access = AccessControl::default();
        for _ in 0..MAX_ROLE_GRANTS {
            access.grant(Role::Oracle, Pubkey::new_unique()).unwrap();
        }
        assert_vault_err(
            access.grant(Role::Oracle, Pubkey::new_unique()),
            VaultError::RoleCapacityReached,
        );
    }
}
