//! In-memory access-control registry.
//!
//! [`RoleRegistry`] is the reference [`AccessControl`] implementation used by
//! tests and the scenario replayer. Capabilities are granted per address; the
//! blocklist and pause switch are themselves gated by capabilities.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::error::AccessError;
use crate::traits::{AccessControl, Capability};
use crate::types::Address;

#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    grants: HashMap<Address, HashSet<Capability>>,
    blocklist: HashSet<Address>,
    paused: bool,
}

impl RoleRegistry {
    /// Registry where `owner` holds every capability.
    pub fn with_owner(owner: Address) -> Self {
        let mut registry = Self::default();
        for capability in [
            Capability::Owner,
            Capability::Pauser,
            Capability::Rescuer,
            Capability::Blocklister,
        ] {
            registry.grants.entry(owner).or_default().insert(capability);
        }
        registry
    }

    fn require(&self, caller: &Address, capability: Capability) -> Result<(), AccessError> {
        if self.has_capability(caller, capability) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized { caller: *caller, capability })
        }
    }

    /// Grant `capability` to `account`. Owner only.
    pub fn grant(
        &mut self,
        caller: &Address,
        account: Address,
        capability: Capability,
    ) -> Result<(), AccessError> {
        self.require(caller, Capability::Owner)?;
        self.grants.entry(account).or_default().insert(capability);
        info!(%account, ?capability, "access: capability granted");
        Ok(())
    }

    /// Revoke `capability` from `account`. Owner only.
    pub fn revoke(
        &mut self,
        caller: &Address,
        account: &Address,
        capability: Capability,
    ) -> Result<(), AccessError> {
        self.require(caller, Capability::Owner)?;
        if let Some(set) = self.grants.get_mut(account) {
            set.remove(&capability);
        }
        info!(%account, ?capability, "access: capability revoked");
        Ok(())
    }

    pub fn blocklist(&mut self, caller: &Address, account: Address) -> Result<(), AccessError> {
        self.require(caller, Capability::Blocklister)?;
        self.blocklist.insert(account);
        info!(%account, "access: blocklisted");
        Ok(())
    }

    pub fn unblocklist(&mut self, caller: &Address, account: &Address) -> Result<(), AccessError> {
        self.require(caller, Capability::Blocklister)?;
        self.blocklist.remove(account);
        info!(%account, "access: unblocklisted");
        Ok(())
    }

    pub fn pause(&mut self, caller: &Address) -> Result<(), AccessError> {
        self.require(caller, Capability::Pauser)?;
        self.paused = true;
        info!("access: paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<(), AccessError> {
        self.require(caller, Capability::Pauser)?;
        self.paused = false;
        info!("access: unpaused");
        Ok(())
    }
}

impl AccessControl for RoleRegistry {
    fn has_capability(&self, caller: &Address, capability: Capability) -> bool {
        self.grants
            .get(caller)
            .is_some_and(|set| set.contains(&capability))
    }

    fn is_blocklisted(&self, account: &Address) -> bool {
        self.blocklist.contains(account)
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
