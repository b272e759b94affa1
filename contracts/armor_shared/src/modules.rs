use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::interfaces::MasterClient;
use crate::ArmorError;

pub const STAKE: Symbol = symbol_short!("STAKE");
pub const CLAIM: Symbol = symbol_short!("CLAIM");
pub const REWARD: Symbol = symbol_short!("REWARD");
pub const COVER: Symbol = symbol_short!("COVER");
pub const BALANCE: Symbol = symbol_short!("BALANCE");
pub const PLAN: Symbol = symbol_short!("PLAN");

/// Resolve a required collaborator. Fails the whole invocation with
/// `NotFound` when the name is unregistered.
pub fn resolve(env: &Env, master: &Address, name: &Symbol) -> Address {
    MasterClient::new(env, master).get_module(name)
}

/// Resolve an optional collaborator.
pub fn find(env: &Env, master: &Address, name: &Symbol) -> Option<Address> {
    MasterClient::new(env, master).find_module(name)
}

/// Gate a privileged inter-module call: `caller` must authorize and be the
/// address currently registered under `name`.
pub fn require_module(
    env: &Env,
    master: &Address,
    name: &Symbol,
    caller: &Address,
) -> Result<(), ArmorError> {
    caller.require_auth();
    if MasterClient::new(env, master).is_module(name, caller) {
        Ok(())
    } else {
        Err(ArmorError::Unauthorized)
    }
}
