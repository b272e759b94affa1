use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoverStatus {
    Active = 0,
    Claimed = 1,
    Expired = 2,
}

/// Purchase terms quoted for a cover.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverTerms {
    pub amount: i128,         // Covered amount, paid out in `currency` on a valid claim
    pub price: i128,          // Premium paid
    pub price_timestamp: u64, // When the quote was signed
    pub generation_id: u64,
}

/// A coverage policy as held by the cover ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoverToken {
    pub id: u64,
    pub protocol: Address,
    pub currency: Address,
    pub amount: i128,
    pub price: i128,
    pub price_timestamp: u64,
    pub generation_id: u64,
    pub purchase_time: u64,
    pub cover_period: u64, // In seconds
    pub status: CoverStatus,
}

impl CoverToken {
    pub fn expires_at(&self) -> u64 {
        self.purchase_time.saturating_add(self.cover_period)
    }

    /// Coverage is open at both ends: a hack at the purchase instant or at
    /// the expiry instant is not covered.
    pub fn covers(&self, hack_time: u64) -> bool {
        hack_time > self.purchase_time && hack_time < self.expires_at()
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at()
    }
}
