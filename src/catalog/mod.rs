//! Client for the remote mountaineering catalog.
//!
//! Ranges are fetched once at startup, areas are memoized per range for the
//! lifetime of the client, summits and routes always go to the server.

pub mod model;
pub mod query;
pub mod tables;
pub mod transport;

use std::collections::HashSet;

use tokio::sync::Mutex;

use crate::config::CatalogConfig;
use crate::error::Result;
use model::{MountainArea, MountainRange, Route, Summit, decode, parse_routes, parse_summits};
use query::{RouteQuery, RouteQueryBuilder};
use transport::{HttpTransport, Transport};

const RANGES_PATH: &str = "/api/mountainregions";
const ROUTES_PATH: &str = "/api/mountainroutes";

fn areas_path(range_id: u32) -> String {
    format!("/api/mountainareas/{range_id}")
}

fn summits_path(area_id: u32) -> String {
    format!("/api/mountains/{area_id}/by/area")
}

/// Append-only reference data cache.
#[derive(Debug, Default)]
struct CatalogCache {
    ranges: Vec<MountainRange>,
    areas: Vec<MountainArea>,
    fetched_ranges: HashSet<u32>,
}

impl CatalogCache {
    fn areas_of(&self, range_id: u32) -> Vec<MountainArea> {
        self.areas
            .iter()
            .filter(|a| a.parent_range_id == range_id)
            .cloned()
            .collect()
    }
}

/// Fetches and memoizes catalog reference data.
pub struct CatalogClient<T: Transport = HttpTransport> {
    transport: T,
    cache: Mutex<CatalogCache>,
}

impl CatalogClient<HttpTransport> {
    /// Creates a client talking HTTP to the configured host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: &CatalogConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> CatalogClient<T> {
    /// Creates a client over an arbitrary transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cache: Mutex::new(CatalogCache::default()),
        }
    }

    /// Returns a reference to the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches all mountain ranges, replacing any cached list.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network/HTTP failure and a decode error on a malformed body.
    pub async fn fetch_ranges(&self) -> Result<Vec<MountainRange>> {
        let body = self.transport.get_json(RANGES_PATH, &[]).await?;
        let ranges: Vec<MountainRange> = decode(RANGES_PATH, &body)?;
        log::info!("Fetched {} mountain ranges", ranges.len());
        self.cache.lock().await.ranges.clone_from(&ranges);
        Ok(ranges)
    }

    /// Returns the ranges from the last [`fetch_ranges`](Self::fetch_ranges) call.
    pub async fn ranges(&self) -> Vec<MountainRange> {
        self.cache.lock().await.ranges.clone()
    }

    /// Returns the areas of a range, calling the server only the first time a
    /// range id is seen.
    ///
    /// The cache lock is held across the request, so concurrent callers asking
    /// for the same range still produce one remote call. A failed request does
    /// not mark the range as fetched.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network/HTTP failure and a decode error on a malformed body.
    pub async fn fetch_areas(&self, range_id: u32) -> Result<Vec<MountainArea>> {
        let mut cache = self.cache.lock().await;
        if cache.fetched_ranges.contains(&range_id) {
            log::debug!("Areas of range {range_id} served from cache");
            return Ok(cache.areas_of(range_id));
        }

        let path = areas_path(range_id);
        let body = self.transport.get_json(&path, &[]).await?;
        let areas: Vec<MountainArea> = decode(&path, &body)?;

        let foreign = areas
            .iter()
            .filter(|a| a.parent_range_id != range_id)
            .count();
        if foreign > 0 {
            log::warn!("{foreign} area(s) returned for range {range_id} belong to another range");
        }

        cache.areas.extend(areas);
        cache.fetched_ranges.insert(range_id);
        Ok(cache.areas_of(range_id))
    }

    /// Loads the areas of every cached range into the cache.
    ///
    /// # Errors
    ///
    /// Stops at the first range whose areas cannot be fetched.
    pub async fn fetch_all_areas(&self) -> Result<Vec<MountainArea>> {
        let mut all = Vec::new();
        for range in self.ranges().await {
            all.extend(self.fetch_areas(range.id).await?);
        }
        Ok(all)
    }

    /// Fetches the summits of an area. Never cached.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network/HTTP failure and a decode error on a malformed body.
    pub async fn fetch_summits(&self, area_id: u32) -> Result<Vec<Summit>> {
        let path = summits_path(area_id);
        let body = self.transport.get_json(&path, &[]).await?;
        parse_summits(&path, &body)
    }

    /// Runs a filtered route search.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network/HTTP failure and a decode error on a malformed body.
    pub async fn query_routes(&self, query: &RouteQuery) -> Result<Vec<Route>> {
        let params = RouteQueryBuilder::new(query).build();
        let body = self.transport.get_json(ROUTES_PATH, &params).await?;
        let routes = parse_routes(ROUTES_PATH, &body)?;
        log::debug!("Route query {query:?} matched {} route(s)", routes.len());
        Ok(routes)
    }
}
