// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use linera_sdk::linera_base_types::{AccountOwner, Amount};
use linera_sdk::views::{linera_views, LogView, RegisterView, RootView, View, ViewStorageContext};
use lottery::{winner_index, Draw, DrawEntropy, LotteryError};

/// The application state for the Lottery.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct LotteryState {
    /// The account that created the application. Only it can pick a winner.
    pub manager: RegisterView<Option<AccountOwner>>,
    /// Entries of the current round, in entry order.
    pub players: LogView<AccountOwner>,
    /// Sum of the entries of the current round.
    pub pot: RegisterView<Amount>,
    /// Number of the current round, starting at 1.
    pub round: RegisterView<u64>,
    /// Completed rounds.
    pub draws: LogView<Draw>,
}

#[allow(dead_code)]
impl LotteryState {
    /// Opens the first round under `manager`.
    pub fn initialize(&mut self, manager: AccountOwner) {
        self.manager.set(Some(manager));
        self.round.set(1);
    }

    /// Records an entry and returns the new number of players.
    ///
    /// Nothing is written unless `amount` is strictly greater than `minimum` and fits in the pot.
    pub fn enter(
        &mut self,
        player: AccountOwner,
        amount: Amount,
        minimum: Amount,
    ) -> Result<u64, LotteryError> {
        if amount <= minimum {
            return Err(LotteryError::InsufficientPayment {
                paid: amount,
                minimum,
            });
        }

        let pot = self.pot.get().try_add(amount)?;
        self.players.push(player);
        self.pot.set(pot);

        Ok(self.players.count() as u64)
    }

    pub async fn players(&self) -> Result<Vec<AccountOwner>, LotteryError> {
        Ok(self.players.read(..).await?)
    }

    pub async fn draws(&self) -> Result<Vec<Draw>, LotteryError> {
        Ok(self.draws.read(..).await?)
    }

    pub async fn last_draw(&self) -> Result<Option<Draw>, LotteryError> {
        match self.draws.count() {
            0 => Ok(None),
            count => Ok(self.draws.get(count - 1).await?),
        }
    }

    /// Picks the winner of the current round and resets it.
    ///
    /// The returned draw carries the prize; moving the funds is up to the caller. On error
    /// the state is left untouched.
    pub async fn pick_winner(
        &mut self,
        caller: Option<AccountOwner>,
        entropy: DrawEntropy,
    ) -> Result<Draw, LotteryError> {
        let manager = *self.manager.get();
        if caller.is_none() || caller != manager {
            return Err(LotteryError::Unauthorized);
        }

        let players = self.players().await?;
        let index = winner_index(&entropy, &players).ok_or(LotteryError::NoPlayers)?;

        let draw = Draw {
            round: *self.round.get(),
            winner: players[index],
            prize: *self.pot.get(),
            entries: players.len() as u64,
            drawn_at: entropy.timestamp_micros,
        };

        self.players.clear();
        self.pot.set(Amount::ZERO);
        self.round.set(draw.round + 1);
        self.draws.push(draw.clone());

        Ok(draw)
    }
}
