// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use linera_sdk::{
    linera_base_types::{Account, AccountOwner, WithContractAbi},
    views::{RootView, View},
    Contract, ContractRuntime,
};
use log::{info, warn};
use lottery::{DrawEntropy, LotteryAbi, LotteryError, LotteryParameters, LotteryResponse, Operation};

use self::state::LotteryState;

pub struct LotteryContract {
    state: LotteryState,
    runtime: ContractRuntime<Self>,
}

linera_sdk::contract!(LotteryContract);

impl WithContractAbi for LotteryContract {
    type Abi = LotteryAbi;
}

impl Contract for LotteryContract {
    type Message = ();
    type Parameters = LotteryParameters;
    type InstantiationArgument = ();
    type EventValue = ();

    async fn load(runtime: ContractRuntime<Self>) -> Self {
        let state = LotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LotteryContract { state, runtime }
    }

    async fn instantiate(&mut self, _argument: Self::InstantiationArgument) {
        let parameters = self.runtime.application_parameters();
        let manager = self
            .runtime
            .authenticated_signer()
            .expect("Lottery must be created by an authenticated signer");

        info!(
            "Lottery created by {manager} with a minimum entry of {}",
            parameters.minimum_entry
        );
        self.state.initialize(manager);
    }

    async fn execute_operation(&mut self, operation: Self::Operation) -> Self::Response {
        match self.apply(operation).await {
            Ok(response) => response,
            Err(error) => {
                warn!("Rejected lottery operation: {error}");
                panic!("{error}");
            }
        }
    }

    async fn execute_message(&mut self, _message: Self::Message) {
        panic!("Lottery application doesn't support any cross-chain messages");
    }

    async fn store(mut self) {
        self.state.save().await.expect("Failed to save state");
    }
}

impl LotteryContract {
    async fn apply(&mut self, operation: Operation) -> Result<LotteryResponse, LotteryError> {
        match operation {
            Operation::Enter { amount } => {
                let player = self
                    .runtime
                    .authenticated_signer()
                    .ok_or(LotteryError::Unauthenticated)?;
                let minimum = self.runtime.application_parameters().minimum_entry;

                let position = self.state.enter(player, amount, minimum)?;
                let pot_account = self.pot_account();
                self.runtime.transfer(player, pot_account, amount);

                let pot = *self.state.pot.get();
                info!("{player} entered round {} with {amount}, pot is {pot}", self.state.round.get());
                Ok(LotteryResponse::Entered { position, pot })
            }

            Operation::PickWinner => {
                let caller = self.runtime.authenticated_signer();
                let entropy = DrawEntropy {
                    timestamp_micros: self.runtime.system_time().micros(),
                    block_height: self.runtime.block_height().into(),
                };

                let draw = self.state.pick_winner(caller, entropy).await?;
                let winner_account = Account {
                    chain_id: self.runtime.chain_id(),
                    owner: draw.winner,
                };
                let pot_account = self.pot_account();
                self.runtime
                    .transfer(pot_account.owner, winner_account, draw.prize);

                info!(
                    "Round {} won by {} out of {} entries, prize {}",
                    draw.round, draw.winner, draw.entries, draw.prize
                );
                Ok(LotteryResponse::WinnerPicked(draw))
            }

            Operation::Players => Ok(LotteryResponse::Players(self.state.players().await?)),
        }
    }

    /// The application's own account, which holds the pot between draws.
    fn pot_account(&mut self) -> Account {
        let owner: AccountOwner = self.runtime.application_id().forget_abi().into();
        Account {
            chain_id: self.runtime.chain_id(),
            owner,
        }
    }
}
