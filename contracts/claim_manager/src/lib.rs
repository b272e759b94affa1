#![no_std]

//! Claims engine.
//!
//! Records confirmed hacks per protocol, accepts claims against cover tokens
//! whose coverage window contains the confirmed hack time, and pays each
//! claim out of a per-currency reserve exactly once.
//!
//! A claim moves `Submitted -> Redeemed`. Submission marks the cover token
//! `Claimed` on the ledger in the same invocation, so a second submission for
//! the same token cannot pass validation. A cover held by a stake ledger,
//! current or retired, pays its staker and has its stake frozen so it stops
//! earning rewards.

use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Symbol};

use armor_shared::interfaces::{CoverLedgerClient, MasterClient, StakeLedgerClient};
use armor_shared::modules::{self, COVER, STAKE};
use armor_shared::{ArmorError, CoverStatus};

mod storage;

pub use crate::storage::{ClaimConfig, ClaimRecord, ClaimStats, ClaimStatus, HackPolicy, HackRecord};
use crate::storage::*;

// Event symbols
const HACK_CONFIRMED: Symbol = symbol_short!("hack");
const CLAIM_SUBMITTED: Symbol = symbol_short!("submit");
const CLAIM_REDEEMED: Symbol = symbol_short!("redeem");
const RESERVE_FUNDED: Symbol = symbol_short!("fund");
const POLICY_SET: Symbol = symbol_short!("policy");

#[contract]
pub struct ClaimManager;

#[contractimpl]
impl ClaimManager {
    pub fn initialize(
        env: Env,
        admin: Address,
        master: Address,
        hack_policy: HackPolicy,
    ) -> Result<(), ArmorError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ArmorError::AlreadyInitialized);
        }
        admin.require_auth();

        set_config(
            &env,
            &ClaimConfig {
                admin,
                master,
                hack_policy,
            },
        );
        set_stats(&env, &ClaimStats::default());
        Ok(())
    }

    pub fn set_hack_policy(env: Env, admin: Address, policy: HackPolicy) -> Result<(), ArmorError> {
        let mut config = Self::require_admin(&env, &admin)?;
        config.hack_policy = policy;
        set_config(&env, &config);

        env.events().publish((POLICY_SET, admin), policy);
        Ok(())
    }

    // ───────────── Hack confirmation ─────────────

    /// Confirm that `protocol` was hacked at `hack_time`.
    ///
    /// # Arguments
    /// * `admin` - Contract admin
    /// * `protocol` - The hacked protocol
    /// * `hack_time` - Ledger timestamp of the hack, strictly in the past
    pub fn confirm_hack(
        env: Env,
        admin: Address,
        protocol: Address,
        hack_time: u64,
    ) -> Result<(), ArmorError> {
        let config = Self::require_admin(&env, &admin)?;

        let now = env.ledger().timestamp();
        if hack_time >= now {
            return Err(ArmorError::InvalidHackTime);
        }

        if let Some(existing) = get_hack(&env, &protocol) {
            if existing.confirmed && config.hack_policy == HackPolicy::Reject {
                return Err(ArmorError::HackAlreadyConfirmed);
            }
        }

        set_hack(
            &env,
            &HackRecord {
                protocol: protocol.clone(),
                hack_time,
                confirmed: true,
                confirmed_at: now,
            },
        );

        log!(&env, "ClaimManager: hack on {} confirmed at {}", protocol, hack_time);
        env.events().publish((HACK_CONFIRMED, protocol), hack_time);
        Ok(())
    }

    // ───────────── Claims ─────────────

    /// Submit a claim for `cover_id` against the confirmed hack at
    /// `hack_time`. Anyone may submit; the payout always goes to the
    /// beneficiary resolved here.
    pub fn submit_claim(env: Env, cover_id: u64, hack_time: u64) -> Result<(), ArmorError> {
        let config = get_config(&env)?;
        if get_claim(&env, cover_id).is_some() {
            return Err(ArmorError::AlreadyClaimed);
        }

        let ledger = CoverLedgerClient::new(&env, &modules::resolve(&env, &config.master, &COVER));
        let cover = ledger.get_cover(&cover_id);

        match get_hack(&env, &cover.protocol) {
            Some(hack) if hack.confirmed && hack.hack_time == hack_time => {}
            _ => return Err(ArmorError::HackNotConfirmed),
        }
        if !cover.covers(hack_time) {
            return Err(ArmorError::OutsideCoverageWindow);
        }
        match cover.status {
            CoverStatus::Active => {}
            CoverStatus::Claimed => return Err(ArmorError::AlreadyClaimed),
            CoverStatus::Expired => return Err(ArmorError::OutsideCoverageWindow),
        }

        // A staked cover pays its staker, not the ledger holding it
        let this = env.current_contract_address();
        let owner = ledger.owner_of(&cover_id);
        let master = MasterClient::new(&env, &config.master);
        let custodian = if master.is_module(&STAKE, &owner)
            || master.former_module(&owner) == Some(STAKE)
        {
            Some(StakeLedgerClient::new(&env, &owner))
        } else {
            None
        };
        let beneficiary = match &custodian {
            Some(stakes) => stakes.staker_of(&cover_id).ok_or(ArmorError::NotFound)?,
            None => owner,
        };

        ledger.set_cover_status(&this, &cover_id, &CoverStatus::Claimed);
        if let Some(stakes) = custodian {
            stakes.freeze_claimed(&this, &cover_id);
        }

        let now = env.ledger().timestamp();
        set_claim(
            &env,
            &ClaimRecord {
                cover_id,
                protocol: cover.protocol.clone(),
                hack_time,
                beneficiary: beneficiary.clone(),
                currency: cover.currency,
                amount: cover.amount,
                status: ClaimStatus::Submitted,
                submitted_at: now,
                redeemed_at: None,
            },
        );

        let mut stats = get_stats(&env);
        stats.submitted += 1;
        set_stats(&env, &stats);

        log!(&env, "ClaimManager: claim on cover {} for {}", cover_id, beneficiary);
        env.events()
            .publish((CLAIM_SUBMITTED, cover_id), (beneficiary, cover.amount));
        Ok(())
    }

    /// Pay out a submitted claim. Returns the amount paid.
    pub fn redeem_claim(env: Env, cover_id: u64) -> Result<i128, ArmorError> {
        get_config(&env)?;
        let mut claim = get_claim(&env, cover_id).ok_or(ArmorError::NoSuchClaim)?;
        if claim.status == ClaimStatus::Redeemed {
            return Err(ArmorError::AlreadyRedeemed);
        }

        let reserve = get_reserve(&env, &claim.currency);
        if reserve < claim.amount {
            return Err(ArmorError::InsufficientReserve);
        }

        let token_client = token::Client::new(&env, &claim.currency);
        token_client.transfer(
            &env.current_contract_address(),
            &claim.beneficiary,
            &claim.amount,
        );
        set_reserve(&env, &claim.currency, reserve - claim.amount);

        claim.status = ClaimStatus::Redeemed;
        claim.redeemed_at = Some(env.ledger().timestamp());
        set_claim(&env, &claim);

        let mut stats = get_stats(&env);
        stats.redeemed += 1;
        set_stats(&env, &stats);

        env.events().publish(
            (CLAIM_REDEEMED, cover_id),
            (claim.beneficiary, claim.amount),
        );
        Ok(claim.amount)
    }

    // ───────────── Payout reserve ─────────────

    pub fn fund_reserve(
        env: Env,
        funder: Address,
        currency: Address,
        amount: i128,
    ) -> Result<(), ArmorError> {
        funder.require_auth();
        get_config(&env)?;
        if amount <= 0 {
            return Err(ArmorError::InvalidAmount);
        }

        let token_client = token::Client::new(&env, &currency);
        token_client.transfer(&funder, &env.current_contract_address(), &amount);
        set_reserve(&env, &currency, get_reserve(&env, &currency) + amount);

        env.events().publish((RESERVE_FUNDED, currency), (funder, amount));
        Ok(())
    }

    pub fn reserve_of(env: Env, currency: Address) -> i128 {
        get_reserve(&env, &currency)
    }

    // ───────────── Views ─────────────

    pub fn get_hack(env: Env, protocol: Address) -> Option<HackRecord> {
        get_hack(&env, &protocol)
    }

    pub fn is_hack_confirmed(env: Env, protocol: Address, hack_time: u64) -> bool {
        matches!(
            get_hack(&env, &protocol),
            Some(hack) if hack.confirmed && hack.hack_time == hack_time
        )
    }

    pub fn get_claim(env: Env, cover_id: u64) -> Result<ClaimRecord, ArmorError> {
        get_claim(&env, cover_id).ok_or(ArmorError::NoSuchClaim)
    }

    pub fn get_stats(env: Env) -> ClaimStats {
        get_stats(&env)
    }

    pub fn get_config(env: Env) -> Result<ClaimConfig, ArmorError> {
        get_config(&env)
    }

    // ───────────── Internal ─────────────

    fn require_admin(env: &Env, admin: &Address) -> Result<ClaimConfig, ArmorError> {
        admin.require_auth();
        let config = get_config(env)?;
        if *admin != config.admin {
            return Err(ArmorError::Unauthorized);
        }
        Ok(config)
    }
}
