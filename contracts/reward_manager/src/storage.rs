use soroban_sdk::{contracttype, Address, Env, Vec};

use armor_shared::ArmorError;

#[contracttype]
pub enum DataKey {
    Config,
    LastTick,                  // u64 ledger timestamp of the last keep
    Pools,                     // Vec<Address> protocols with a reward pool
    Pool(Address),             // RewardPool
    Position(Address, Address), // RewardPosition for (staker, protocol)
    StakerProtocols(Address),  // Vec<Address>
    Deposit(Address, Address, Address), // i128 credited by (stake ledger, staker, protocol)
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RewardConfig {
    pub admin: Address,
    pub master: Address,
    pub reward_token: Address,
    pub reward_duration: u64, // Seconds a notified amount is spread over
}

/// Reward-per-token accumulator for one protocol.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPool {
    pub reward_rate: i128, // Reward units per second
    pub period_finish: u64,
    pub last_update: u64,
    pub reward_per_token_stored: i128, // Scaled by REWARD_PRECISION
    pub total_stake: i128,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPosition {
    pub balance: i128,
    pub reward_per_token_paid: i128,
    pub rewards: i128, // Accrued and not yet claimed
}

pub fn get_config(env: &Env) -> Result<RewardConfig, ArmorError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ArmorError::NotInitialized)
}

pub fn set_config(env: &Env, config: &RewardConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_pool(env: &Env, protocol: &Address) -> RewardPool {
    env.storage()
        .persistent()
        .get(&DataKey::Pool(protocol.clone()))
        .unwrap_or_default()
}

pub fn set_pool(env: &Env, protocol: &Address, pool: &RewardPool) {
    env.storage()
        .persistent()
        .set(&DataKey::Pool(protocol.clone()), pool);
}

pub fn get_pools(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Pools)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn add_pool(env: &Env, protocol: &Address) {
    let mut pools = get_pools(env);
    if !pools.contains(protocol) {
        pools.push_back(protocol.clone());
        env.storage().persistent().set(&DataKey::Pools, &pools);
    }
}

pub fn get_position(env: &Env, staker: &Address, protocol: &Address) -> RewardPosition {
    env.storage()
        .persistent()
        .get(&DataKey::Position(staker.clone(), protocol.clone()))
        .unwrap_or_default()
}

pub fn set_position(env: &Env, staker: &Address, protocol: &Address, position: &RewardPosition) {
    env.storage()
        .persistent()
        .set(&DataKey::Position(staker.clone(), protocol.clone()), position);
}

pub fn get_deposit(env: &Env, ledger: &Address, staker: &Address, protocol: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Deposit(ledger.clone(), staker.clone(), protocol.clone()))
        .unwrap_or(0)
}

pub fn set_deposit(
    env: &Env,
    ledger: &Address,
    staker: &Address,
    protocol: &Address,
    amount: i128,
) {
    env.storage().persistent().set(
        &DataKey::Deposit(ledger.clone(), staker.clone(), protocol.clone()),
        &amount,
    );
}

pub fn get_staker_protocols(env: &Env, staker: &Address) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::StakerProtocols(staker.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn add_staker_protocol(env: &Env, staker: &Address, protocol: &Address) {
    let mut protocols = get_staker_protocols(env, staker);
    if !protocols.contains(protocol) {
        protocols.push_back(protocol.clone());
        env.storage()
            .persistent()
            .set(&DataKey::StakerProtocols(staker.clone()), &protocols);
    }
}

pub fn get_last_tick(env: &Env) -> Option<u64> {
    env.storage().instance().get(&DataKey::LastTick)
}

pub fn set_last_tick(env: &Env, timestamp: u64) {
    env.storage().instance().set(&DataKey::LastTick, &timestamp);
}
