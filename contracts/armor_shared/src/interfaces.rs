//! Client interfaces for calls between modules.
//!
//! Each trait only lists what callers actually need from the module.

use soroban_sdk::{contractclient, Address, Env, Symbol};

use crate::{CoverStatus, CoverToken};

#[contractclient(name = "MasterClient")]
pub trait Master {
    fn get_module(env: Env, name: Symbol) -> Address;
    fn find_module(env: Env, name: Symbol) -> Option<Address>;
    fn is_module(env: Env, name: Symbol, address: Address) -> bool;
    fn former_module(env: Env, address: Address) -> Option<Symbol>;
}

/// Anything queued as a master job.
#[contractclient(name = "KeeperClient")]
pub trait Keeper {
    fn keep(env: Env);
}

#[contractclient(name = "CoverLedgerClient")]
pub trait CoverLedger {
    fn get_cover(env: Env, id: u64) -> CoverToken;
    fn owner_of(env: Env, id: u64) -> Address;
    fn transfer(env: Env, from: Address, to: Address, id: u64);
    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, id: u64);
    fn set_cover_status(env: Env, caller: Address, id: u64, status: CoverStatus);
}

#[contractclient(name = "StakeLedgerClient")]
pub trait StakeLedger {
    fn staker_of(env: Env, cover_id: u64) -> Option<Address>;
    fn freeze_claimed(env: Env, caller: Address, cover_id: u64);
}

#[contractclient(name = "RewardDistributorClient")]
pub trait RewardDistributor {
    fn stake(env: Env, caller: Address, staker: Address, protocol: Address, amount: i128);
    fn withdraw(env: Env, caller: Address, staker: Address, protocol: Address, amount: i128);
}
