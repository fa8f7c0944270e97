// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Ranking view: players ordered by rating, highest first. The ratings are
//! read as stored; nothing is computed here.

use crate::error::Result;
use crate::model::Player;
use crate::store::{Row, SelectQuery, Stores};

pub fn ranking_query() -> SelectQuery {
    SelectQuery::columns(Player::COLUMNS).order_desc("rating")
}

/// Read the players table in ranking order. Rows are returned exactly as the
/// store sent them.
pub async fn fetch_ranking(stores: &Stores) -> Result<Vec<Row>> {
    stores
        .rows
        .select(&stores.layout.players_table, &ranking_query())
        .await
}

/// Ranking decoded for display.
pub async fn fetch_players(stores: &Stores) -> Result<Vec<Player>> {
    fetch_ranking(stores)
        .await?
        .into_iter()
        .map(Player::from_row)
        .collect()
}
