use soroban_sdk::contracterror;

/// Error codes returned by every Armor contract.
///
/// Codes are stable: clients match on the numeric value.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ArmorError {
    /// Contract not initialized
    NotInitialized = 1,
    /// Already initialized
    AlreadyInitialized = 2,
    /// Caller lacks the required role or module identity
    Unauthorized = 3,
    /// Unknown module, protocol, stake or cover token
    NotFound = 4,
    ProtocolNotAllowed = 5,
    NotTokenOwner = 6,
    HackNotConfirmed = 7,
    OutsideCoverageWindow = 8,
    /// Cover token already has a claim against it
    AlreadyClaimed = 9,
    /// Cover token is frozen by a claim and cannot leave the stake ledger
    TokenClaimed = 10,
    NoSuchClaim = 11,
    AlreadyRedeemed = 12,
    /// A hack is already confirmed and the policy rejects re-confirmation
    HackAlreadyConfirmed = 13,
    /// Hack time is not in the past
    InvalidHackTime = 14,
    /// Payout reserve cannot cover the claim
    InsufficientReserve = 15,
    InvalidAmount = 16,
    /// Spender holds no approval for the cover token
    NotApproved = 17,
    /// Requested status change does not move the cover forward
    InvalidStatus = 18,
}
