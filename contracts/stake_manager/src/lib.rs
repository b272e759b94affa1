#![no_std]

//! Stake ledger.
//!
//! Holds cover tokens in custody against the protocol they cover and keeps
//! per-protocol and per-staker totals. Staking requires the owner to approve
//! this contract on the cover ledger first.
//!
//! A stake whose cover is claimed is frozen: it stays in custody and counts
//! toward the totals, but stops earning rewards and leaves the expiry queue.
//! A ledger replaced under `STAKE` takes no new stakes but can still release
//! the ones it holds.

use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, Env, Symbol, Vec};

use armor_shared::interfaces::{CoverLedgerClient, MasterClient, RewardDistributorClient};
use armor_shared::modules::{self, CLAIM, COVER, REWARD, STAKE};
use armor_shared::{ArmorError, CoverStatus};

mod storage;

pub use crate::storage::{StakeConfig, StakeRecord};
use crate::storage::*;

// Event symbols
const PROTOCOL_SET: Symbol = symbol_short!("protocol");
const STAKED: Symbol = symbol_short!("staked");
const UNSTAKED: Symbol = symbol_short!("unstaked");
const EXPIRED: Symbol = symbol_short!("expired");
const FROZEN: Symbol = symbol_short!("frozen");

#[contract]
pub struct StakeManager;

#[contractimpl]
impl StakeManager {
    pub fn initialize(env: Env, admin: Address, master: Address) -> Result<(), ArmorError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ArmorError::AlreadyInitialized);
        }
        admin.require_auth();

        set_config(&env, &StakeConfig { admin, master });
        Ok(())
    }

    /// Add or remove a protocol from the allow-list.
    ///
    /// Disallowing only blocks new stakes; existing positions are untouched.
    pub fn allow_protocol(
        env: Env,
        admin: Address,
        protocol: Address,
        allowed: bool,
    ) -> Result<(), ArmorError> {
        admin.require_auth();
        let config = get_config(&env)?;
        if admin != config.admin {
            return Err(ArmorError::Unauthorized);
        }

        set_allowed(&env, &protocol, allowed);
        env.events().publish((PROTOCOL_SET, protocol), allowed);
        Ok(())
    }

    pub fn is_protocol_allowed(env: Env, protocol: Address) -> bool {
        is_allowed(&env, &protocol)
    }

    pub fn get_protocols(env: Env) -> Vec<Address> {
        get_protocols(&env)
    }

    // ───────────── Staking ─────────────

    /// Take custody of `cover_id` and count its amount toward the cover's
    /// protocol.
    ///
    /// # Arguments
    /// * `staker` - Current owner of the cover; must have approved this contract
    /// * `cover_id` - Cover token to stake
    pub fn stake_token(env: Env, staker: Address, cover_id: u64) -> Result<(), ArmorError> {
        staker.require_auth();
        let config = get_config(&env)?;
        let this = env.current_contract_address();
        if !MasterClient::new(&env, &config.master).is_module(&STAKE, &this) {
            return Err(ArmorError::Unauthorized);
        }
        let ledger = CoverLedgerClient::new(&env, &modules::resolve(&env, &config.master, &COVER));

        let cover = ledger.get_cover(&cover_id);
        if !is_allowed(&env, &cover.protocol) {
            return Err(ArmorError::ProtocolNotAllowed);
        }
        if ledger.owner_of(&cover_id) != staker {
            return Err(ArmorError::NotTokenOwner);
        }

        let now = env.ledger().timestamp();
        match cover.status {
            CoverStatus::Active => {}
            CoverStatus::Claimed => return Err(ArmorError::TokenClaimed),
            CoverStatus::Expired => return Err(ArmorError::OutsideCoverageWindow),
        }
        if cover.is_expired(now) {
            return Err(ArmorError::OutsideCoverageWindow);
        }

        ledger.transfer_from(&this, &staker, &this, &cover_id);

        let record = StakeRecord {
            staker: staker.clone(),
            protocol: cover.protocol.clone(),
            cover_id,
            amount: cover.amount,
            staked_at: now,
            expires_at: cover.expires_at(),
            frozen: false,
            rewarded_by: modules::find(&env, &config.master, &REWARD),
        };
        set_stake(&env, &record);
        enqueue(&env, &record);
        set_staked_count(&env, get_staked_count(&env) + 1);

        set_total_staked(
            &env,
            &record.protocol,
            get_total_staked(&env, &record.protocol) + record.amount,
        );
        set_staker_stake(
            &env,
            &staker,
            &record.protocol,
            get_staker_stake(&env, &staker, &record.protocol) + record.amount,
        );

        let mut tokens = get_staker_tokens(&env, &staker);
        tokens.push_back(cover_id);
        set_staker_tokens(&env, &staker, &tokens);

        if let Some(reward) = &record.rewarded_by {
            RewardDistributorClient::new(&env, reward).stake(
                &this,
                &staker,
                &record.protocol,
                &record.amount,
            );
        }

        log!(&env, "StakeManager: cover {} staked by {}", cover_id, staker);
        env.events()
            .publish((STAKED, staker), (cover_id, record.protocol, record.amount));
        Ok(())
    }

    /// Return a staked cover to its staker. Claimed covers stay in custody.
    pub fn unstake_token(env: Env, staker: Address, cover_id: u64) -> Result<(), ArmorError> {
        staker.require_auth();
        let config = get_config(&env)?;

        let record = get_stake(&env, cover_id).ok_or(ArmorError::NotFound)?;
        if record.staker != staker {
            return Err(ArmorError::NotTokenOwner);
        }
        if record.frozen {
            return Err(ArmorError::TokenClaimed);
        }

        let ledger = CoverLedgerClient::new(&env, &modules::resolve(&env, &config.master, &COVER));
        if ledger.get_cover(&cover_id).status == CoverStatus::Claimed {
            return Err(ArmorError::TokenClaimed);
        }

        Self::release(&env, &ledger, &record);
        env.events()
            .publish((UNSTAKED, staker), (cover_id, record.protocol, record.amount));
        Ok(())
    }

    /// Freeze the stake behind a claimed cover.
    ///
    /// Called by the claims engine when a claim is submitted. The cover stays
    /// in custody and its stake stops earning rewards. Repeated calls are
    /// no-ops.
    pub fn freeze_claimed(env: Env, caller: Address, cover_id: u64) -> Result<(), ArmorError> {
        let config = get_config(&env)?;
        modules::require_module(&env, &config.master, &CLAIM, &caller)?;

        let record = get_stake(&env, cover_id).ok_or(ArmorError::NotFound)?;
        if !record.frozen {
            Self::freeze(&env, record);
        }
        Ok(())
    }

    /// Release stakes whose cover has expired, walking the expiry queue from
    /// the oldest bucket. At most `limit` entries are inspected per call, so
    /// a long backlog takes several calls. Covers found claimed are frozen
    /// instead of released. Returns how many stakes were released.
    pub fn sweep_expired(env: Env, limit: u32) -> Result<u32, ArmorError> {
        let config = get_config(&env)?;
        let Some(mut bucket) = get_sweep_cursor(&env) else {
            return Ok(0);
        };
        let ledger = CoverLedgerClient::new(&env, &modules::resolve(&env, &config.master, &COVER));
        let now = env.ledger().timestamp();
        let last = bucket_of(now);

        let mut scanned = 0u32;
        let mut released = 0u32;
        while scanned < limit && bucket <= last {
            let ids = get_expiring(&env, bucket);
            if ids.is_empty() {
                scanned += 1;
            }
            for cover_id in ids.iter() {
                if scanned >= limit {
                    break;
                }
                scanned += 1;

                let Some(record) = get_stake(&env, cover_id) else {
                    continue;
                };
                if now < record.expires_at {
                    continue;
                }
                if ledger.get_cover(&cover_id).status == CoverStatus::Claimed {
                    Self::freeze(&env, record);
                    continue;
                }

                Self::release(&env, &ledger, &record);
                env.events().publish(
                    (EXPIRED, record.staker.clone()),
                    (cover_id, record.protocol.clone(), record.amount),
                );
                released += 1;
            }

            // The bucket holding `now` may still have live stakes
            if bucket == last || !get_expiring(&env, bucket).is_empty() {
                break;
            }
            bucket += 1;
            set_sweep_cursor(&env, bucket);
        }

        if released > 0 {
            log!(&env, "StakeManager: released {} expired stakes", released);
        }
        Ok(released)
    }

    // ───────────── Views ─────────────

    pub fn total_staked(env: Env, protocol: Address) -> i128 {
        get_total_staked(&env, &protocol)
    }

    pub fn stake_of(env: Env, staker: Address, protocol: Address) -> i128 {
        get_staker_stake(&env, &staker, &protocol)
    }

    pub fn get_stake(env: Env, cover_id: u64) -> Option<StakeRecord> {
        get_stake(&env, cover_id)
    }

    /// Staker behind a cover held in custody, if any.
    pub fn staker_of(env: Env, cover_id: u64) -> Option<Address> {
        get_stake(&env, cover_id).map(|record| record.staker)
    }

    pub fn tokens_of(env: Env, staker: Address) -> Vec<u64> {
        get_staker_tokens(&env, &staker)
    }

    /// Number of covers in custody, frozen ones included.
    pub fn staked_count(env: Env) -> u32 {
        get_staked_count(&env)
    }

    /// Unfrozen stakes queued for the sweep in expiry bucket `bucket`.
    pub fn expiring_in(env: Env, bucket: u64) -> Vec<u64> {
        get_expiring(&env, bucket)
    }

    pub fn sweep_cursor(env: Env) -> Option<u64> {
        get_sweep_cursor(&env)
    }

    pub fn get_config(env: Env) -> Result<StakeConfig, ArmorError> {
        get_config(&env)
    }

    // ───────────── Internal ─────────────

    fn release(env: &Env, ledger: &CoverLedgerClient, record: &StakeRecord) {
        let this = env.current_contract_address();
        ledger.transfer(&this, &record.staker, &record.cover_id);

        remove_stake(env, record.cover_id);
        dequeue(env, record);
        set_staked_count(env, get_staked_count(env) - 1);
        set_total_staked(
            env,
            &record.protocol,
            get_total_staked(env, &record.protocol) - record.amount,
        );
        set_staker_stake(
            env,
            &record.staker,
            &record.protocol,
            get_staker_stake(env, &record.staker, &record.protocol) - record.amount,
        );

        let mut tokens = get_staker_tokens(env, &record.staker);
        without(&mut tokens, record.cover_id);
        set_staker_tokens(env, &record.staker, &tokens);

        if let Some(reward) = &record.rewarded_by {
            RewardDistributorClient::new(env, reward).withdraw(
                &this,
                &record.staker,
                &record.protocol,
                &record.amount,
            );
        }
    }

    fn freeze(env: &Env, mut record: StakeRecord) {
        record.frozen = true;
        set_stake(env, &record);
        dequeue(env, &record);

        if let Some(reward) = &record.rewarded_by {
            RewardDistributorClient::new(env, reward).withdraw(
                &env.current_contract_address(),
                &record.staker,
                &record.protocol,
                &record.amount,
            );
        }

        log!(env, "StakeManager: cover {} frozen by a claim", record.cover_id);
        env.events()
            .publish((FROZEN, record.staker), (record.cover_id, record.protocol));
    }
}
