#![no_std]

//! Cover token ledger.
//!
//! Issues one non-fungible token per coverage policy and tracks ownership,
//! approvals and policy status. Status writes are reserved to the admin and
//! to whichever contract the registry currently lists as `CLAIM`.

use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, Address, Env, Symbol,
};

use armor_shared::interfaces::MasterClient;
use armor_shared::modules::CLAIM;
use armor_shared::{ArmorError, CoverStatus, CoverTerms, CoverToken};

#[contracttype]
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub admin: Address,
    pub master: Address,
}

#[contracttype]
pub enum DataKey {
    Config,
    NextId,          // u64, first cover id is 1
    Cover(u64),      // CoverToken
    Owner(u64),      // Address
    Approved(u64),   // Address allowed to move the token once
}

const COVER_BOUGHT: Symbol = symbol_short!("bought");
const APPROVED: Symbol = symbol_short!("approve");
const TRANSFERRED: Symbol = symbol_short!("transfer");
const STATUS_SET: Symbol = symbol_short!("status");

#[contract]
pub struct CoverNft;

#[contractimpl]
impl CoverNft {
    pub fn initialize(env: Env, admin: Address, master: Address) -> Result<(), ArmorError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ArmorError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::Config, &LedgerConfig { admin, master });
        env.storage().instance().set(&DataKey::NextId, &1u64);
        Ok(())
    }

    /// Issue a cover to `buyer`.
    ///
    /// `inception` backdates the purchase time; 0 means the current ledger time.
    pub fn buy_cover(
        env: Env,
        buyer: Address,
        protocol: Address,
        currency: Address,
        terms: CoverTerms,
        cover_period: u64,
        inception: u64,
    ) -> Result<u64, ArmorError> {
        buyer.require_auth();
        Self::load_config(&env)?;

        if terms.amount <= 0 || terms.price < 0 || cover_period == 0 {
            return Err(ArmorError::InvalidAmount);
        }

        let id: u64 = env.storage().instance().get(&DataKey::NextId).unwrap_or(1);
        let purchase_time = if inception == 0 {
            env.ledger().timestamp()
        } else {
            inception
        };

        let cover = CoverToken {
            id,
            protocol: protocol.clone(),
            currency,
            amount: terms.amount,
            price: terms.price,
            price_timestamp: terms.price_timestamp,
            generation_id: terms.generation_id,
            purchase_time,
            cover_period,
            status: CoverStatus::Active,
        };

        env.storage().persistent().set(&DataKey::Cover(id), &cover);
        env.storage().persistent().set(&DataKey::Owner(id), &buyer);
        env.storage().instance().set(&DataKey::NextId, &(id + 1));

        env.events()
            .publish((COVER_BOUGHT, buyer), (id, protocol, terms.amount));
        Ok(id)
    }

    pub fn approve(env: Env, owner: Address, spender: Address, id: u64) -> Result<(), ArmorError> {
        owner.require_auth();
        if Self::owner_of(env.clone(), id)? != owner {
            return Err(ArmorError::NotTokenOwner);
        }

        env.storage()
            .persistent()
            .set(&DataKey::Approved(id), &spender);

        env.events().publish((APPROVED, owner), (spender, id));
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, id: u64) -> Result<(), ArmorError> {
        from.require_auth();
        if Self::owner_of(env.clone(), id)? != from {
            return Err(ArmorError::NotTokenOwner);
        }
        Self::move_token(&env, &from, &to, id);
        Ok(())
    }

    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        id: u64,
    ) -> Result<(), ArmorError> {
        spender.require_auth();
        if Self::owner_of(env.clone(), id)? != from {
            return Err(ArmorError::NotTokenOwner);
        }
        if Self::get_approved(env.clone(), id) != Some(spender) {
            return Err(ArmorError::NotApproved);
        }
        Self::move_token(&env, &from, &to, id);
        Ok(())
    }

    /// Move a cover along its status lifecycle.
    ///
    /// Only `Active` covers change status, and only to `Claimed` or
    /// `Expired`. A claimed cover can never be claimed again or revived.
    pub fn set_cover_status(
        env: Env,
        caller: Address,
        id: u64,
        status: CoverStatus,
    ) -> Result<(), ArmorError> {
        caller.require_auth();
        let config = Self::load_config(&env)?;
        let master = MasterClient::new(&env, &config.master);
        if caller != config.admin && !master.is_module(&CLAIM, &caller) {
            return Err(ArmorError::Unauthorized);
        }

        let mut cover = Self::get_cover(env.clone(), id)?;
        match cover.status {
            CoverStatus::Active => {}
            CoverStatus::Claimed => return Err(ArmorError::AlreadyClaimed),
            CoverStatus::Expired => return Err(ArmorError::OutsideCoverageWindow),
        }
        if status == CoverStatus::Active {
            return Err(ArmorError::InvalidStatus);
        }

        cover.status = status;
        env.storage().persistent().set(&DataKey::Cover(id), &cover);

        log!(&env, "CoverNft: cover {} status set by {}", id, caller);
        env.events().publish((STATUS_SET, id), status);
        Ok(())
    }

    // ───────────── Views ─────────────

    pub fn get_cover(env: Env, id: u64) -> Result<CoverToken, ArmorError> {
        env.storage()
            .persistent()
            .get(&DataKey::Cover(id))
            .ok_or(ArmorError::NotFound)
    }

    pub fn owner_of(env: Env, id: u64) -> Result<Address, ArmorError> {
        env.storage()
            .persistent()
            .get(&DataKey::Owner(id))
            .ok_or(ArmorError::NotFound)
    }

    pub fn get_approved(env: Env, id: u64) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Approved(id))
    }

    /// Number of covers ever issued. Ids run from 1 to `total_supply`.
    pub fn total_supply(env: Env) -> u64 {
        let next: u64 = env.storage().instance().get(&DataKey::NextId).unwrap_or(1);
        next - 1
    }

    pub fn get_config(env: Env) -> Result<LedgerConfig, ArmorError> {
        Self::load_config(&env)
    }

    // ───────────── Internal ─────────────

    fn load_config(env: &Env) -> Result<LedgerConfig, ArmorError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ArmorError::NotInitialized)
    }

    fn move_token(env: &Env, from: &Address, to: &Address, id: u64) {
        env.storage().persistent().remove(&DataKey::Approved(id));
        env.storage().persistent().set(&DataKey::Owner(id), to);

        env.events()
            .publish((TRANSFERRED, from.clone()), (to.clone(), id));
    }
}
