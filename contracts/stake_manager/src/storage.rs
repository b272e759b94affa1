use soroban_sdk::{contracttype, Address, Env, Vec};

use armor_shared::ArmorError;

/// Width of an expiry bucket in seconds. Stakes are queued for the sweep
/// by the bucket their cover expires in.
pub const EXPIRY_BUCKET: u64 = 86_400;

#[contracttype]
pub enum DataKey {
    Config,
    Protocols,                     // Vec<Address>, every protocol ever toggled
    Allowed(Address),              // bool
    Stake(u64),                    // StakeRecord by cover id
    TotalStaked(Address),          // i128 per protocol
    StakerStake(Address, Address), // i128 per (staker, protocol)
    StakerTokens(Address),         // Vec<u64>
    StakedCount,                   // u32 covers in custody
    Expiring(u64),                 // Vec<u64> unfrozen stakes expiring in a bucket
    SweepCursor,                   // u64 first bucket the sweep still has to visit
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct StakeConfig {
    pub admin: Address,
    pub master: Address,
}

/// A cover token held in custody on behalf of its staker.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRecord {
    pub staker: Address,
    pub protocol: Address,
    pub cover_id: u64,
    pub amount: i128,
    pub staked_at: u64,
    pub expires_at: u64,
    /// Set once a claim is submitted; the cover can no longer leave custody
    pub frozen: bool,
    /// Reward distributor credited with this stake, if one was registered
    pub rewarded_by: Option<Address>,
}

pub fn get_config(env: &Env) -> Result<StakeConfig, ArmorError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ArmorError::NotInitialized)
}

pub fn set_config(env: &Env, config: &StakeConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

// ───────────── Allow-list ─────────────

pub fn is_allowed(env: &Env, protocol: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Allowed(protocol.clone()))
        .unwrap_or(false)
}

pub fn set_allowed(env: &Env, protocol: &Address, allowed: bool) {
    env.storage()
        .persistent()
        .set(&DataKey::Allowed(protocol.clone()), &allowed);

    let mut protocols = get_protocols(env);
    if !protocols.contains(protocol) {
        protocols.push_back(protocol.clone());
        env.storage().persistent().set(&DataKey::Protocols, &protocols);
    }
}

pub fn get_protocols(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Protocols)
        .unwrap_or_else(|| Vec::new(env))
}

// ───────────── Stakes ─────────────

pub fn get_stake(env: &Env, cover_id: u64) -> Option<StakeRecord> {
    env.storage().persistent().get(&DataKey::Stake(cover_id))
}

pub fn set_stake(env: &Env, record: &StakeRecord) {
    env.storage()
        .persistent()
        .set(&DataKey::Stake(record.cover_id), record);
}

pub fn remove_stake(env: &Env, cover_id: u64) {
    env.storage().persistent().remove(&DataKey::Stake(cover_id));
}

pub fn get_total_staked(env: &Env, protocol: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::TotalStaked(protocol.clone()))
        .unwrap_or(0)
}

pub fn set_total_staked(env: &Env, protocol: &Address, total: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::TotalStaked(protocol.clone()), &total);
}

pub fn get_staker_stake(env: &Env, staker: &Address, protocol: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::StakerStake(staker.clone(), protocol.clone()))
        .unwrap_or(0)
}

pub fn set_staker_stake(env: &Env, staker: &Address, protocol: &Address, amount: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::StakerStake(staker.clone(), protocol.clone()), &amount);
}

pub fn get_staker_tokens(env: &Env, staker: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::StakerTokens(staker.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_staker_tokens(env: &Env, staker: &Address, tokens: &Vec<u64>) {
    env.storage()
        .persistent()
        .set(&DataKey::StakerTokens(staker.clone()), tokens);
}

pub fn get_staked_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::StakedCount)
        .unwrap_or(0)
}

pub fn set_staked_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::StakedCount, &count);
}

// ───────────── Expiry queue ─────────────

pub fn bucket_of(expires_at: u64) -> u64 {
    expires_at / EXPIRY_BUCKET
}

pub fn get_expiring(env: &Env, bucket: u64) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::Expiring(bucket))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn remove_expiring(env: &Env, bucket: u64) {
    env.storage().persistent().remove(&DataKey::Expiring(bucket));
}

pub fn get_sweep_cursor(env: &Env) -> Option<u64> {
    env.storage().instance().get(&DataKey::SweepCursor)
}

pub fn set_sweep_cursor(env: &Env, bucket: u64) {
    env.storage().instance().set(&DataKey::SweepCursor, &bucket);
}

pub fn enqueue(env: &Env, record: &StakeRecord) {
    let bucket = bucket_of(record.expires_at);
    let mut ids = get_expiring(env, bucket);
    ids.push_back(record.cover_id);
    env.storage()
        .persistent()
        .set(&DataKey::Expiring(bucket), &ids);

    if get_sweep_cursor(env).map_or(true, |cursor| bucket < cursor) {
        set_sweep_cursor(env, bucket);
    }
}

pub fn dequeue(env: &Env, record: &StakeRecord) {
    let bucket = bucket_of(record.expires_at);
    let mut ids = get_expiring(env, bucket);
    without(&mut ids, record.cover_id);
    if ids.is_empty() {
        remove_expiring(env, bucket);
    } else {
        env.storage()
            .persistent()
            .set(&DataKey::Expiring(bucket), &ids);
    }
}

/// Drop the first occurrence of `id` from a token list.
pub fn without(tokens: &mut Vec<u64>, id: u64) {
    if let Some(index) = tokens.first_index_of(id) {
        tokens.remove(index);
    }
}
