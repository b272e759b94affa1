#![no_std]

//! Reward distributor.
//!
//! Each protocol has its own pool that streams a funded reward amount over
//! `reward_duration` seconds. A staker earns from a pool in proportion to its
//! share of that protocol's stake, so `stake_of / total_staked` decides the
//! split. Stake is credited by the registered `STAKE` module and can only be
//! withdrawn by the stake ledger that credited it.

use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Symbol};

use armor_shared::modules::{self, STAKE};
use armor_shared::ArmorError;

mod storage;

pub use crate::storage::{RewardConfig, RewardPool, RewardPosition};
use crate::storage::*;

const REWARD_PRECISION: i128 = 1_000_000_000_000;

// Event symbols
const REWARD_ADDED: Symbol = symbol_short!("rwd_add");
const REWARD_PAID: Symbol = symbol_short!("rwd_paid");
const BALANCE_UP: Symbol = symbol_short!("bal_up");
const BALANCE_DOWN: Symbol = symbol_short!("bal_down");

#[contract]
pub struct RewardManager;

#[contractimpl]
impl RewardManager {
    pub fn initialize(
        env: Env,
        admin: Address,
        master: Address,
        reward_token: Address,
        reward_duration: u64,
    ) -> Result<(), ArmorError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ArmorError::AlreadyInitialized);
        }
        admin.require_auth();
        if reward_duration == 0 {
            return Err(ArmorError::InvalidAmount);
        }

        set_config(
            &env,
            &RewardConfig {
                admin,
                master,
                reward_token,
                reward_duration,
            },
        );
        Ok(())
    }

    pub fn set_reward_duration(env: Env, admin: Address, duration: u64) -> Result<(), ArmorError> {
        let mut config = Self::require_admin(&env, &admin)?;
        if duration == 0 {
            return Err(ArmorError::InvalidAmount);
        }
        config.reward_duration = duration;
        set_config(&env, &config);
        Ok(())
    }

    /// Fund a protocol's pool. Any amount still undistributed from the
    /// running period is rolled into the new one.
    pub fn notify_reward_amount(
        env: Env,
        admin: Address,
        protocol: Address,
        amount: i128,
    ) -> Result<(), ArmorError> {
        let config = Self::require_admin(&env, &admin)?;
        if amount <= 0 {
            return Err(ArmorError::InvalidAmount);
        }

        let token_client = token::Client::new(&env, &config.reward_token);
        token_client.transfer(&admin, &env.current_contract_address(), &amount);

        let now = env.ledger().timestamp();
        let mut pool = Self::checkpoint_pool(&env, &protocol, now);
        let duration = config.reward_duration as i128;

        pool.reward_rate = if now >= pool.period_finish {
            amount / duration
        } else {
            let leftover = (pool.period_finish - now) as i128 * pool.reward_rate;
            (amount + leftover) / duration
        };
        pool.last_update = now;
        pool.period_finish = now + config.reward_duration;

        set_pool(&env, &protocol, &pool);
        add_pool(&env, &protocol);

        env.events()
            .publish((REWARD_ADDED, protocol), (amount, pool.reward_rate));
        Ok(())
    }

    // ───────────── Stake notifications ─────────────

    pub fn stake(
        env: Env,
        caller: Address,
        staker: Address,
        protocol: Address,
        amount: i128,
    ) -> Result<(), ArmorError> {
        let config = get_config(&env)?;
        modules::require_module(&env, &config.master, &STAKE, &caller)?;
        if amount <= 0 {
            return Err(ArmorError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let mut pool = Self::checkpoint_pool(&env, &protocol, now);
        let mut position = Self::checkpoint_position(&env, &pool, &staker, &protocol);

        pool.total_stake += amount;
        position.balance += amount;
        let deposited = get_deposit(&env, &caller, &staker, &protocol);
        set_deposit(&env, &caller, &staker, &protocol, deposited + amount);

        set_pool(&env, &protocol, &pool);
        set_position(&env, &staker, &protocol, &position);
        add_pool(&env, &protocol);
        add_staker_protocol(&env, &staker, &protocol);

        env.events()
            .publish((BALANCE_UP, staker), (protocol, amount));
        Ok(())
    }

    /// Take stake out of a position.
    ///
    /// Only the stake ledger that credited the stake can withdraw it, and
    /// only up to what it credited. A stake ledger that has since been
    /// replaced under `STAKE` can still release its own positions.
    pub fn withdraw(
        env: Env,
        caller: Address,
        staker: Address,
        protocol: Address,
        amount: i128,
    ) -> Result<(), ArmorError> {
        caller.require_auth();
        get_config(&env)?;

        let deposited = get_deposit(&env, &caller, &staker, &protocol);
        if deposited == 0 {
            return Err(ArmorError::Unauthorized);
        }
        if amount <= 0 || amount > deposited {
            return Err(ArmorError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let mut pool = Self::checkpoint_pool(&env, &protocol, now);
        let mut position = Self::checkpoint_position(&env, &pool, &staker, &protocol);

        pool.total_stake -= amount;
        position.balance -= amount;
        set_deposit(&env, &caller, &staker, &protocol, deposited - amount);

        set_pool(&env, &protocol, &pool);
        set_position(&env, &staker, &protocol, &position);

        env.events()
            .publish((BALANCE_DOWN, staker), (protocol, amount));
        Ok(())
    }

    // ───────────── Accrual and payout ─────────────

    /// Bring a position up to the current ledger time and return what it has
    /// accrued so far.
    pub fn accrue(env: Env, staker: Address, protocol: Address) -> Result<i128, ArmorError> {
        get_config(&env)?;
        let now = env.ledger().timestamp();
        let pool = Self::checkpoint_pool(&env, &protocol, now);
        let position = Self::checkpoint_position(&env, &pool, &staker, &protocol);

        set_pool(&env, &protocol, &pool);
        set_position(&env, &staker, &protocol, &position);
        Ok(position.rewards)
    }

    pub fn claim_rewards(env: Env, staker: Address) -> Result<i128, ArmorError> {
        staker.require_auth();
        let config = get_config(&env)?;
        let now = env.ledger().timestamp();

        let mut total = 0i128;
        for protocol in get_staker_protocols(&env, &staker).iter() {
            let pool = Self::checkpoint_pool(&env, &protocol, now);
            let mut position = Self::checkpoint_position(&env, &pool, &staker, &protocol);
            total += position.rewards;
            position.rewards = 0;

            set_pool(&env, &protocol, &pool);
            set_position(&env, &staker, &protocol, &position);
        }

        if total > 0 {
            let token_client = token::Client::new(&env, &config.reward_token);
            token_client.transfer(&env.current_contract_address(), &staker, &total);

            log!(&env, "RewardManager: paid {} to {}", total, staker);
            env.events().publish((REWARD_PAID, staker), total);
        }
        Ok(total)
    }

    /// Maintenance tick: checkpoint every pool. Runs at most once per ledger
    /// timestamp.
    pub fn keep(env: Env) -> Result<(), ArmorError> {
        get_config(&env)?;
        let now = env.ledger().timestamp();
        if get_last_tick(&env) == Some(now) {
            return Ok(());
        }
        set_last_tick(&env, now);

        for protocol in get_pools(&env).iter() {
            let pool = Self::checkpoint_pool(&env, &protocol, now);
            set_pool(&env, &protocol, &pool);
        }
        Ok(())
    }

    // ───────────── Views ─────────────

    pub fn earned(env: Env, staker: Address, protocol: Address) -> i128 {
        let now = env.ledger().timestamp();
        let pool = get_pool(&env, &protocol);
        let position = get_position(&env, &staker, &protocol);
        Self::earned_at(&position, Self::reward_per_token_at(&pool, now))
    }

    pub fn reward_per_token(env: Env, protocol: Address) -> i128 {
        let pool = get_pool(&env, &protocol);
        Self::reward_per_token_at(&pool, env.ledger().timestamp())
    }

    pub fn get_pool(env: Env, protocol: Address) -> RewardPool {
        get_pool(&env, &protocol)
    }

    pub fn get_position(env: Env, staker: Address, protocol: Address) -> RewardPosition {
        get_position(&env, &staker, &protocol)
    }

    pub fn get_config(env: Env) -> Result<RewardConfig, ArmorError> {
        get_config(&env)
    }

    // ───────────── Internal ─────────────

    fn require_admin(env: &Env, admin: &Address) -> Result<RewardConfig, ArmorError> {
        admin.require_auth();
        let config = get_config(env)?;
        if *admin != config.admin {
            return Err(ArmorError::Unauthorized);
        }
        Ok(config)
    }

    fn last_time_applicable(pool: &RewardPool, now: u64) -> u64 {
        now.min(pool.period_finish)
    }

    fn reward_per_token_at(pool: &RewardPool, now: u64) -> i128 {
        if pool.total_stake == 0 {
            return pool.reward_per_token_stored;
        }
        let elapsed = Self::last_time_applicable(pool, now).saturating_sub(pool.last_update);
        pool.reward_per_token_stored
            + (elapsed as i128 * pool.reward_rate * REWARD_PRECISION) / pool.total_stake
    }

    fn earned_at(position: &RewardPosition, reward_per_token: i128) -> i128 {
        position.balance * (reward_per_token - position.reward_per_token_paid) / REWARD_PRECISION
            + position.rewards
    }

    /// Returned pool is not persisted; callers store it after applying their
    /// own change.
    fn checkpoint_pool(env: &Env, protocol: &Address, now: u64) -> RewardPool {
        let mut pool = get_pool(env, protocol);
        pool.reward_per_token_stored = Self::reward_per_token_at(&pool, now);
        pool.last_update = Self::last_time_applicable(&pool, now).max(pool.last_update);
        pool
    }

    fn checkpoint_position(
        env: &Env,
        pool: &RewardPool,
        staker: &Address,
        protocol: &Address,
    ) -> RewardPosition {
        let mut position = get_position(env, staker, protocol);
        position.rewards = Self::earned_at(&position, pool.reward_per_token_stored);
        position.reward_per_token_paid = pool.reward_per_token_stored;
        position
    }
}

#[cfg(test)]
mod test;
