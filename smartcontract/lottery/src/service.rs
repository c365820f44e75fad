// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema};
use linera_sdk::{
    linera_base_types::{AccountOwner, Amount, WithServiceAbi},
    views::View,
    Service, ServiceRuntime,
};
use lottery::{Draw, LotteryAbi, LotteryError, LotteryParameters, Operation};

use self::state::LotteryState;

pub struct LotteryService {
    state: Arc<LotteryState>,
    runtime: Arc<ServiceRuntime<Self>>,
}

linera_sdk::service!(LotteryService);

impl WithServiceAbi for LotteryService {
    type Abi = LotteryAbi;
}

impl Service for LotteryService {
    type Parameters = LotteryParameters;

    async fn new(runtime: ServiceRuntime<Self>) -> Self {
        let state = LotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LotteryService {
            state: Arc::new(state),
            runtime: Arc::new(runtime),
        }
    }

    async fn handle_query(&self, request: Request) -> Response {
        let schema = Schema::build(
            QueryRoot {
                state: self.state.clone(),
                runtime: self.runtime.clone(),
            },
            MutationRoot {
                runtime: self.runtime.clone(),
            },
            EmptySubscription,
        )
        .finish();
        schema.execute(request).await
    }
}

fn graphql_error(error: LotteryError) -> async_graphql::Error {
    async_graphql::Error::new(error.to_string())
}

struct QueryRoot {
    state: Arc<LotteryState>,
    runtime: Arc<ServiceRuntime<LotteryService>>,
}

#[Object]
impl QueryRoot {
    /// The account allowed to pick a winner
    async fn manager(&self) -> Option<AccountOwner> {
        *self.state.manager.get()
    }

    /// Players of the current round, in entry order
    async fn players(&self) -> async_graphql::Result<Vec<AccountOwner>> {
        self.state.players().await.map_err(graphql_error)
    }

    async fn player_count(&self) -> u64 {
        self.state.players.count() as u64
    }

    /// Total paid into the current round
    async fn pot(&self) -> Amount {
        *self.state.pot.get()
    }

    async fn round(&self) -> u64 {
        *self.state.round.get()
    }

    /// Entries must pay more than this
    async fn minimum_entry(&self) -> Amount {
        self.runtime.application_parameters().minimum_entry
    }

    /// All completed rounds, oldest first
    async fn draws(&self) -> async_graphql::Result<Vec<Draw>> {
        self.state.draws().await.map_err(graphql_error)
    }

    async fn last_draw(&self) -> async_graphql::Result<Option<Draw>> {
        self.state.last_draw().await.map_err(graphql_error)
    }
}

struct MutationRoot {
    runtime: Arc<ServiceRuntime<LotteryService>>,
}

#[Object]
impl MutationRoot {
    /// Enter the current round, paying `amount` into the pot
    async fn enter(&self, amount: Amount) -> String {
        self.runtime.schedule_operation(&Operation::Enter { amount });
        "Entry scheduled".to_string()
    }

    /// Pick the winner of the current round (manager only)
    async fn pick_winner(&self) -> String {
        self.runtime.schedule_operation(&Operation::PickWinner);
        "PickWinner operation scheduled".to_string()
    }
}
