use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

use armor_shared::ArmorError;

#[contracttype]
pub enum DataKey {
    Admin,               // Address
    Module(Symbol),      // ModuleEntry
    ModuleName(Address), // Symbol, reverse index of Module
    Retired(Address),    // Symbol, last name the address was replaced under
    Jobs,                // Vec<Symbol> in run order
    LastKeep,            // u64 ledger timestamp of the last keep run
}

/// Current handle registered under a logical name.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleEntry {
    pub address: Address,
    /// Bumped on every re-registration so cached handles can be detected as stale
    pub generation: u32,
}

pub fn get_admin(env: &Env) -> Result<Address, ArmorError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ArmorError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_entry(env: &Env, name: &Symbol) -> Option<ModuleEntry> {
    env.storage()
        .persistent()
        .get(&DataKey::Module(name.clone()))
}

pub fn set_entry(env: &Env, name: &Symbol, entry: &ModuleEntry) {
    env.storage()
        .persistent()
        .set(&DataKey::Module(name.clone()), entry);
}

pub fn remove_entry(env: &Env, name: &Symbol) {
    env.storage()
        .persistent()
        .remove(&DataKey::Module(name.clone()));
}

pub fn get_name(env: &Env, address: &Address) -> Option<Symbol> {
    env.storage()
        .persistent()
        .get(&DataKey::ModuleName(address.clone()))
}

pub fn set_name(env: &Env, address: &Address, name: &Symbol) {
    env.storage()
        .persistent()
        .set(&DataKey::ModuleName(address.clone()), name);
}

pub fn remove_name(env: &Env, address: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::ModuleName(address.clone()));
}

pub fn get_retired(env: &Env, address: &Address) -> Option<Symbol> {
    env.storage()
        .persistent()
        .get(&DataKey::Retired(address.clone()))
}

pub fn set_retired(env: &Env, address: &Address, name: &Symbol) {
    env.storage()
        .persistent()
        .set(&DataKey::Retired(address.clone()), name);
}

pub fn get_jobs(env: &Env) -> Vec<Symbol> {
    env.storage()
        .instance()
        .get(&DataKey::Jobs)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_jobs(env: &Env, jobs: &Vec<Symbol>) {
    env.storage().instance().set(&DataKey::Jobs, jobs);
}

pub fn get_last_keep(env: &Env) -> Option<u64> {
    env.storage().instance().get(&DataKey::LastKeep)
}

pub fn set_last_keep(env: &Env, timestamp: u64) {
    env.storage().instance().set(&DataKey::LastKeep, &timestamp);
}
