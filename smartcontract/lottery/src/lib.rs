// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! ABI of the Lottery Application */

use async_graphql::{Request, Response, SimpleObject};
use linera_sdk::{
    linera_base_types::{AccountOwner, Amount, ArithmeticError, ContractAbi, ServiceAbi},
    views::ViewError,
};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Entry minimum used when no parameters are given: one hundredth of a token.
pub const DEFAULT_MINIMUM_ENTRY_MILLIS: u128 = 10;

pub struct LotteryAbi;

impl ContractAbi for LotteryAbi {
    type Operation = Operation;
    type Response = LotteryResponse;
}

impl ServiceAbi for LotteryAbi {
    type Query = Request;
    type QueryResponse = Response;
}

/// Application parameters, fixed when the application is created.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LotteryParameters {
    /// Smallest amount an entry must exceed.
    pub minimum_entry: Amount,
}

impl Default for LotteryParameters {
    fn default() -> Self {
        LotteryParameters {
            minimum_entry: Amount::from_millis(DEFAULT_MINIMUM_ENTRY_MILLIS),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Operation {
    /// Pay `amount` into the pot and join the current round.
    Enter { amount: Amount },
    /// Pick a winner, pay out the whole pot and start a new round. Manager only.
    PickWinner,
    /// List the players of the current round, in entry order.
    Players,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum LotteryResponse {
    Entered { position: u64, pot: Amount },
    WinnerPicked(Draw),
    Players(Vec<AccountOwner>),
}

/// The outcome of one round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, SimpleObject)]
pub struct Draw {
    pub round: u64,
    pub winner: AccountOwner,
    pub prize: Amount,
    /// Number of entries that took part, duplicates included.
    pub entries: u64,
    /// Block timestamp of the draw, in microseconds.
    pub drawn_at: u64,
}

#[derive(Debug, Error)]
pub enum LotteryError {
    #[error("entry of {paid} must exceed the minimum of {minimum}")]
    InsufficientPayment { paid: Amount, minimum: Amount },

    #[error("only the manager can pick a winner")]
    Unauthorized,

    #[error("operation requires an authenticated signer")]
    Unauthenticated,

    #[error("no players have entered the current round")]
    NoPlayers,

    #[error("pot cannot hold this entry: {0}")]
    PotOverflow(#[from] ArithmeticError),

    #[error("failed to access lottery state: {0}")]
    View(#[from] ViewError),
}

/// Chain state sampled when the winner is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawEntropy {
    pub timestamp_micros: u64,
    pub block_height: u64,
}

/// Picks the index of the winning entry.
///
/// The choice is a Keccak-256 digest of the block timestamp, the block height and the
/// ordered player list, reduced modulo the number of entries. Anyone who can predict the
/// block timestamp can predict the winner, so this is only fit for low stakes.
pub fn winner_index(entropy: &DrawEntropy, players: &[AccountOwner]) -> Option<usize> {
    if players.is_empty() {
        return None;
    }

    let mut hasher = Keccak256::new();
    hasher.update(entropy.timestamp_micros.to_le_bytes());
    hasher.update(entropy.block_height.to_le_bytes());
    for player in players {
        hasher.update(player.to_string().as_bytes());
    }
    let digest = hasher.finalize();

    let mut word = [0u8; 16];
    word.copy_from_slice(&digest[..16]);
    let index = u128::from_le_bytes(word) % players.len() as u128;
    Some(index as usize)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use linera_sdk::linera_base_types::CryptoHash;

    use super::*;

    fn owner(seed: u64) -> AccountOwner {
        let hash: CryptoHash = format!("{seed:064x}").parse().expect("valid hash");
        AccountOwner::from(hash)
    }

    fn entropy(block_height: u64) -> DrawEntropy {
        DrawEntropy {
            timestamp_micros: 1_700_000_000_000_000 + block_height * 1_000,
            block_height,
        }
    }

    #[test]
    fn empty_round_has_no_winner() {
        assert_eq!(winner_index(&entropy(1), &[]), None);
    }

    #[test]
    fn single_player_always_wins() {
        let players = [owner(1)];
        for height in 0..50 {
            assert_eq!(winner_index(&entropy(height), &players), Some(0));
        }
    }

    #[test]
    fn same_entropy_picks_same_winner() {
        let players = [owner(1), owner(2), owner(3), owner(4)];
        let first = winner_index(&entropy(9), &players);
        let second = winner_index(&entropy(9), &players);
        assert_eq!(first, second);
    }

    #[test]
    fn every_entry_can_win() {
        let players = [owner(1), owner(2), owner(3)];
        let mut seen = HashSet::new();
        for height in 0..300 {
            let index = winner_index(&entropy(height), &players).expect("non-empty round");
            assert!(index < players.len());
            seen.insert(index);
        }
        assert_eq!(seen.len(), players.len());
    }

    #[test]
    fn default_minimum_is_one_hundredth_of_a_token() {
        let parameters = LotteryParameters::default();
        assert_eq!(parameters.minimum_entry, Amount::from_millis(10));
        assert!(Amount::from_millis(20) > parameters.minimum_entry);
    }
}
