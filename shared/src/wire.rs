//! JSON shapes of the read api, shared by the server that renders them and
//! the client that consumes them.

use serde::{Deserialize, Serialize};

use crate::{ColorIndex, Timestamp};

/// One entry of the recent-pixels feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPixel {
    pub px: u32,
    pub py: u32,
    pub color: ColorIndex,
    pub timestamp: Timestamp,
}

/// One entry of the recent-shards feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedShard {
    pub shard_x: u16,
    pub shard_y: u16,
    pub timestamp: Timestamp,
}

/// `GET /feed`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub pixels: Vec<FeedPixel>,
    pub shards: Vec<FeedShard>,
}

/// `GET /stats`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_pixels_placed: u64,
    pub total_shards_deployed: u64,
}

/// `GET /user?address=`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub pixels_placed_count: u64,
    pub shards_owned_count: u64,
}
