#![cfg(test)]

use super::*;
use armor_master::{ArmorMaster, ArmorMasterClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

struct Setup<'a> {
    rewards: RewardManagerClient<'a>,
    master: ArmorMasterClient<'a>,
    token: TokenClient<'a>,
    admin: Address,
    // Registered as the STAKE module
    stake_module: Address,
    protocol: Address,
}

fn setup(env: &Env) -> Setup<'_> {
    env.mock_all_auths();

    let admin = Address::generate(env);
    let master_id = env.register_contract(None, ArmorMaster);
    let master = ArmorMasterClient::new(env, &master_id);
    master.initialize(&admin);

    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    let token_address = sac.address();
    StellarAssetClient::new(env, &token_address).mint(&admin, &1_000_000);

    let rewards_id = env.register_contract(None, RewardManager);
    let rewards = RewardManagerClient::new(env, &rewards_id);
    rewards.initialize(&admin, &master_id, &token_address, &100);

    let stake_module = Address::generate(env);
    master.register_module(&admin, &STAKE, &stake_module);

    Setup {
        rewards,
        master,
        token: TokenClient::new(env, &token_address),
        admin,
        stake_module,
        protocol: Address::generate(env),
    }
}

#[test]
fn test_initialize() {
    let env = Env::default();
    let s = setup(&env);

    let config = s.rewards.get_config();
    assert_eq!(config.admin, s.admin);
    assert_eq!(config.reward_duration, 100);
    assert_eq!(
        s.rewards
            .try_initialize(&s.admin, &s.master.address, &s.token.address, &100),
        Err(Ok(ArmorError::AlreadyInitialized))
    );
}

#[test]
fn test_rewards_split_by_stake_share() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &30);
    s.rewards.stake(&s.stake_module, &bob, &s.protocol, &10);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);

    env.ledger().set_timestamp(50);
    assert_eq!(s.rewards.earned(&alice, &s.protocol), 375);
    assert_eq!(s.rewards.earned(&bob, &s.protocol), 125);

    // Nothing accrues past the end of the period
    env.ledger().set_timestamp(500);
    assert_eq!(s.rewards.earned(&alice, &s.protocol), 750);
    assert_eq!(s.rewards.earned(&bob, &s.protocol), 250);
}

#[test]
fn test_claim_rewards_pays_once() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);
    env.ledger().set_timestamp(100);

    assert_eq!(s.rewards.claim_rewards(&alice), 1_000);
    assert_eq!(s.token.balance(&alice), 1_000);
    assert_eq!(s.rewards.claim_rewards(&alice), 0);
    assert_eq!(s.token.balance(&alice), 1_000);
}

#[test]
fn test_claim_across_protocols() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);
    let other = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    s.rewards.stake(&s.stake_module, &alice, &other, &10);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);
    s.rewards.notify_reward_amount(&s.admin, &other, &500);
    env.ledger().set_timestamp(100);

    assert_eq!(s.rewards.claim_rewards(&alice), 1_500);
}

#[test]
fn test_withdraw_stops_accrual() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    s.rewards.stake(&s.stake_module, &bob, &s.protocol, &10);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);

    env.ledger().set_timestamp(50);
    s.rewards.withdraw(&s.stake_module, &bob, &s.protocol, &10);

    env.ledger().set_timestamp(100);
    assert_eq!(s.rewards.earned(&bob, &s.protocol), 250);
    assert_eq!(s.rewards.earned(&alice, &s.protocol), 750);
    assert_eq!(s.rewards.get_pool(&s.protocol).total_stake, 10);
}

#[test]
fn test_only_stake_module_moves_balances() {
    let env = Env::default();
    let s = setup(&env);
    let stranger = Address::generate(&env);
    let alice = Address::generate(&env);

    assert_eq!(
        s.rewards.try_stake(&stranger, &alice, &s.protocol, &10),
        Err(Ok(ArmorError::Unauthorized))
    );
    assert_eq!(
        s.rewards.try_withdraw(&stranger, &alice, &s.protocol, &10),
        Err(Ok(ArmorError::Unauthorized))
    );
}

#[test]
fn test_withdraw_more_than_balance() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    assert_eq!(
        s.rewards.try_withdraw(&s.stake_module, &alice, &s.protocol, &11),
        Err(Ok(ArmorError::InvalidAmount))
    );
}

#[test]
fn test_notify_rolls_over_leftover() {
    let env = Env::default();
    let s = setup(&env);

    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);
    assert_eq!(s.rewards.get_pool(&s.protocol).reward_rate, 10);

    env.ledger().set_timestamp(50);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);

    let pool = s.rewards.get_pool(&s.protocol);
    assert_eq!(pool.reward_rate, 15);
    assert_eq!(pool.period_finish, 150);
    assert_eq!(s.token.balance(&s.rewards.address), 2_000);
}

#[test]
fn test_notify_requires_admin() {
    let env = Env::default();
    let s = setup(&env);
    let stranger = Address::generate(&env);

    assert_eq!(
        s.rewards.try_notify_reward_amount(&stranger, &s.protocol, &1_000),
        Err(Ok(ArmorError::Unauthorized))
    );
}

#[test]
fn test_accrue_checkpoints_position() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);
    env.ledger().set_timestamp(40);

    assert_eq!(s.rewards.accrue(&alice, &s.protocol), 400);
    let position = s.rewards.get_position(&alice, &s.protocol);
    assert_eq!(position.rewards, 400);
    assert_eq!(position.balance, 10);
}

#[test]
fn test_keep_is_idempotent_per_tick() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    s.rewards.notify_reward_amount(&s.admin, &s.protocol, &1_000);
    env.ledger().set_timestamp(30);

    s.rewards.keep();
    let after_first = s.rewards.get_pool(&s.protocol);
    s.rewards.keep();

    assert_eq!(s.rewards.get_pool(&s.protocol), after_first);
    assert_eq!(after_first.last_update, 30);
    assert_eq!(s.rewards.earned(&alice, &s.protocol), 300);
}

#[test]
fn test_replaced_stake_module_can_still_withdraw() {
    let env = Env::default();
    let s = setup(&env);
    let alice = Address::generate(&env);
    let successor = Address::generate(&env);

    s.rewards.stake(&s.stake_module, &alice, &s.protocol, &10);
    s.master.register_module(&s.admin, &STAKE, &successor);

    // The old ledger can no longer credit stake
    assert_eq!(
        s.rewards.try_stake(&s.stake_module, &alice, &s.protocol, &5),
        Err(Ok(ArmorError::Unauthorized))
    );

    // The successor cannot take out stake it never credited
    assert_eq!(
        s.rewards.try_withdraw(&successor, &alice, &s.protocol, &10),
        Err(Ok(ArmorError::Unauthorized))
    );

    s.rewards.withdraw(&s.stake_module, &alice, &s.protocol, &10);
    assert_eq!(s.rewards.get_position(&alice, &s.protocol).balance, 0);
    assert_eq!(s.rewards.get_pool(&s.protocol).total_stake, 0);
}
