//! In-process resolver for offline play. Keeps its own balance and settles
//! bets with the house rules, the same way the remote service does.

use super::{
    Outcome,
    Resolution,
    Resolver,
    SpinFailure,
};
use crate::{
    bet::StagedBet,
    money::Chips,
    wheel::{
        POCKET_COUNT,
        Pocket,
    },
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use std::sync::{
    Arc,
    Mutex,
};
use tracing::info;

pub const INSUFFICIENT_BALANCE: &str = "insufficient balance";

#[derive(Debug)]
struct House {
    balance: Chips,
    rng: StdRng,
}

#[derive(Clone, Debug)]
pub struct HouseResolver {
    house: Arc<Mutex<House>>,
}

impl HouseResolver {
    pub fn new(balance: Chips, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            house: Arc::new(Mutex::new(House { balance, rng })),
        }
    }

    pub fn balance(&self) -> Chips {
        self.lock().balance
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, House> {
        // Balance updates are single assignments, so a poisoned lock is still consistent.
        self.house.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Settles `bets` against the house balance with a uniformly drawn pocket.
    pub fn settle(&self, bets: &[StagedBet]) -> Resolution {
        let mut house = self.lock();
        let index = house.rng.random_range(0..POCKET_COUNT);
        let Some(pocket) = Pocket::from_index(index) else {
            return Resolution::Failed(SpinFailure::Resolver(format!(
                "drew pocket index {index} outside the wheel"
            )));
        };
        settle_on(&mut house.balance, bets, pocket)
    }
}

fn settle_on(balance: &mut Chips, bets: &[StagedBet], pocket: Pocket) -> Resolution {
    let total: Chips = bets.iter().map(StagedBet::stake).sum();
    let Some(remaining) = balance.checked_sub(total) else {
        return Resolution::Failed(SpinFailure::Resolver(INSUFFICIENT_BALANCE.into()));
    };
    let winnings: Chips = bets
        .iter()
        .filter(|staged| staged.bet().wins(pocket))
        .map(|staged| staged.bet().gross_return(staged.stake()))
        .sum();
    let settled = remaining.saturating_add(winnings);
    *balance = settled;
    info!(%pocket, %total, %winnings, balance = %settled, "house settled spin");
    Resolution::Settled(Outcome {
        pocket,
        color: pocket.color(),
        bankroll: settled,
        winnings: Some(winnings),
    })
}

impl Resolver for HouseResolver {
    async fn resolve(&self, bets: &[StagedBet]) -> Resolution {
        self.settle(bets)
    }
}
