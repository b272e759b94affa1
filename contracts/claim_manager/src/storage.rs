use soroban_sdk::{contracttype, Address, Env};

use armor_shared::ArmorError;

#[contracttype]
pub enum DataKey {
    Config,
    Stats,
    Hack(Address),    // HackRecord, one current record per protocol
    Claim(u64),       // ClaimRecord by cover id
    Reserve(Address), // i128 payout reserve per currency token
}

/// What `confirm_hack` does when the protocol already has a confirmed hack.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HackPolicy {
    /// Replace the record. Claims already submitted stay redeemable.
    Overwrite = 0,
    /// Fail with `HackAlreadyConfirmed`.
    Reject = 1,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimConfig {
    pub admin: Address,
    pub master: Address,
    pub hack_policy: HackPolicy,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HackRecord {
    pub protocol: Address,
    pub hack_time: u64,
    pub confirmed: bool,
    pub confirmed_at: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClaimStatus {
    Submitted = 0,
    Redeemed = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRecord {
    pub cover_id: u64,
    pub protocol: Address,
    pub hack_time: u64,
    pub beneficiary: Address, // Fixed at submission
    pub currency: Address,
    pub amount: i128,
    pub status: ClaimStatus,
    pub submitted_at: u64,
    pub redeemed_at: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClaimStats {
    pub submitted: u32,
    pub redeemed: u32,
}

pub fn get_config(env: &Env) -> Result<ClaimConfig, ArmorError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ArmorError::NotInitialized)
}

pub fn set_config(env: &Env, config: &ClaimConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_stats(env: &Env) -> ClaimStats {
    env.storage()
        .instance()
        .get(&DataKey::Stats)
        .unwrap_or_default()
}

pub fn set_stats(env: &Env, stats: &ClaimStats) {
    env.storage().instance().set(&DataKey::Stats, stats);
}

pub fn get_hack(env: &Env, protocol: &Address) -> Option<HackRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Hack(protocol.clone()))
}

pub fn set_hack(env: &Env, record: &HackRecord) {
    env.storage()
        .persistent()
        .set(&DataKey::Hack(record.protocol.clone()), record);
}

pub fn get_claim(env: &Env, cover_id: u64) -> Option<ClaimRecord> {
    env.storage().persistent().get(&DataKey::Claim(cover_id))
}

pub fn set_claim(env: &Env, claim: &ClaimRecord) {
    env.storage()
        .persistent()
        .set(&DataKey::Claim(claim.cover_id), claim);
}

pub fn get_reserve(env: &Env, currency: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Reserve(currency.clone()))
        .unwrap_or(0)
}

pub fn set_reserve(env: &Env, currency: &Address, amount: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::Reserve(currency.clone()), &amount);
}
