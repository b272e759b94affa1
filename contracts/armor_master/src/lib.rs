#![no_std]

//! Module registry for the Armor protocol.
//!
//! Maps logical module names to contract addresses and is the only authority
//! on "is this caller a registered module". Also keeps the queue of modules
//! whose `keep` hook runs on every maintenance tick.

use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, Env, Symbol, Vec};

use armor_shared::interfaces::KeeperClient;
use armor_shared::ArmorError;

mod storage;

pub use crate::storage::ModuleEntry;
use crate::storage::*;

// Event symbols
const MODULE_REGISTERED: Symbol = symbol_short!("mod_reg");
const JOB_ADDED: Symbol = symbol_short!("job_add");
const JOB_REMOVED: Symbol = symbol_short!("job_rem");
const KEEP_RAN: Symbol = symbol_short!("keep");
const JOB_FAILED: Symbol = symbol_short!("job_fail");
const ADMIN_CHANGED: Symbol = symbol_short!("admin");

#[contract]
pub struct ArmorMaster;

#[contractimpl]
impl ArmorMaster {
    // ==================== INITIALIZATION ====================

    pub fn initialize(env: Env, admin: Address) -> Result<(), ArmorError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(ArmorError::AlreadyInitialized);
        }
        admin.require_auth();

        set_admin(&env, &admin);
        set_jobs(&env, &Vec::new(&env));

        log!(&env, "ArmorMaster: initialized with admin {}", admin);
        Ok(())
    }

    pub fn transfer_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), ArmorError> {
        Self::require_admin(&env, &admin)?;
        set_admin(&env, &new_admin);

        env.events().publish((ADMIN_CHANGED, admin), new_admin);
        Ok(())
    }

    // ==================== REGISTRY ====================

    /// Point `name` at `address`, replacing any previous handle.
    ///
    /// The previous address stops resolving as `name` immediately. An address
    /// serves a single name, so registering it under a new name drops its
    /// old registration.
    pub fn register_module(
        env: Env,
        admin: Address,
        name: Symbol,
        address: Address,
    ) -> Result<u32, ArmorError> {
        Self::require_admin(&env, &admin)?;

        let previous = get_entry(&env, &name);
        if let Some(entry) = &previous {
            if entry.address != address {
                remove_name(&env, &entry.address);
                set_retired(&env, &entry.address, &name);
            }
        }
        if let Some(other) = get_name(&env, &address) {
            if other != name {
                remove_entry(&env, &other);
                set_retired(&env, &address, &other);
            }
        }

        let generation = previous.map(|e| e.generation + 1).unwrap_or(1);
        set_entry(
            &env,
            &name,
            &ModuleEntry {
                address: address.clone(),
                generation,
            },
        );
        set_name(&env, &address, &name);

        env.events()
            .publish((MODULE_REGISTERED, name), (address, generation));
        Ok(generation)
    }

    pub fn get_module(env: Env, name: Symbol) -> Result<Address, ArmorError> {
        get_entry(&env, &name)
            .map(|e| e.address)
            .ok_or(ArmorError::NotFound)
    }

    pub fn find_module(env: Env, name: Symbol) -> Option<Address> {
        get_entry(&env, &name).map(|e| e.address)
    }

    /// 0 when `name` was never registered.
    pub fn module_generation(env: Env, name: Symbol) -> u32 {
        get_entry(&env, &name).map(|e| e.generation).unwrap_or(0)
    }

    pub fn is_module(env: Env, name: Symbol, address: Address) -> bool {
        match (get_name(&env, &address), get_entry(&env, &name)) {
            (Some(registered), Some(entry)) => registered == name && entry.address == address,
            _ => false,
        }
    }

    /// Last name `address` was replaced under, if it was ever swapped out.
    ///
    /// Lets modules recognise a retired handle, for example a previous stake
    /// ledger that still holds covers in custody.
    pub fn former_module(env: Env, address: Address) -> Option<Symbol> {
        get_retired(&env, &address)
    }

    // ==================== JOBS ====================

    pub fn add_job(env: Env, admin: Address, name: Symbol) -> Result<(), ArmorError> {
        Self::require_admin(&env, &admin)?;
        if get_entry(&env, &name).is_none() {
            return Err(ArmorError::NotFound);
        }

        let mut jobs = get_jobs(&env);
        if jobs.contains(&name) {
            return Ok(());
        }
        jobs.push_back(name.clone());
        set_jobs(&env, &jobs);

        env.events().publish((JOB_ADDED,), name);
        Ok(())
    }

    pub fn remove_job(env: Env, admin: Address, name: Symbol) -> Result<(), ArmorError> {
        Self::require_admin(&env, &admin)?;

        let mut jobs = get_jobs(&env);
        if let Some(index) = jobs.first_index_of(&name) {
            jobs.remove(index);
            set_jobs(&env, &jobs);
            env.events().publish((JOB_REMOVED,), name);
        }
        Ok(())
    }

    pub fn get_jobs(env: Env) -> Vec<Symbol> {
        get_jobs(&env)
    }

    /// Run every queued job once for the current ledger timestamp.
    ///
    /// Returns `false` without touching any module when this tick already ran.
    /// Jobs whose module has since been unregistered are skipped, and a job
    /// that fails is rolled back on its own without blocking the rest. Job
    /// hooks run with the registry on the call stack, so they must not call
    /// back into it.
    pub fn keep(env: Env) -> Result<bool, ArmorError> {
        get_admin(&env)?;

        let now = env.ledger().timestamp();
        if get_last_keep(&env) == Some(now) {
            return Ok(false);
        }
        set_last_keep(&env, now);

        let mut ran = 0u32;
        for name in get_jobs(&env).iter() {
            let Some(entry) = get_entry(&env, &name) else {
                continue;
            };
            match KeeperClient::new(&env, &entry.address).try_keep() {
                Ok(Ok(())) => ran += 1,
                _ => {
                    log!(&env, "ArmorMaster: job {} failed", name);
                    env.events().publish((JOB_FAILED, name), now);
                }
            }
        }

        env.events().publish((KEEP_RAN,), (now, ran));
        Ok(true)
    }

    pub fn get_admin(env: Env) -> Result<Address, ArmorError> {
        get_admin(&env)
    }

    // ==================== HELPERS ====================

    fn require_admin(env: &Env, admin: &Address) -> Result<(), ArmorError> {
        admin.require_auth();
        if *admin != get_admin(env)? {
            return Err(ArmorError::Unauthorized);
        }
        Ok(())
    }
}
