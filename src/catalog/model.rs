//! Catalog entities and their wire representations.
//!
//! The service returns loosely structured JSON. Each public type here has a
//! private `Raw*` counterpart that mirrors the wire shape; conversion into the
//! public type is where the parsing rules live:
//!
//! - a summit is the *first* peak record of a mountain. Mountains made of
//!   several peaks therefore report only the first peak's height.
//! - the route search answers with one group per queried mountain, and the
//!   route is element `0` of that group. A group is either an object keyed by
//!   string indices (`{"0": {...}}`) or a plain array.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level catalog region grouping several areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountainRange {
    pub id: u32,
    pub name: String,
}

/// Subdivision of a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountainArea {
    pub id: u32,
    #[serde(rename = "mountain_region_id")]
    pub parent_range_id: u32,
    pub name: String,
}

/// A named peak with its height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summit {
    pub id: u32,
    pub name: String,
    pub height: u32,
}

/// A description document attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: u64,
    /// Filename the document was uploaded with. May be empty.
    pub original_name: String,
}

/// A climbing route with everything needed to place its documents on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub complexity_name: String,
    pub type_name: String,
    pub name: String,
    pub peak_name: String,
    pub region_name: String,
    pub area_name: String,
    pub height: u32,
    pub documents: Vec<Document>,
}

#[derive(Deserialize)]
struct RawMountain {
    #[serde(default)]
    mountain_peaks: Vec<RawSummitPeak>,
}

#[derive(Deserialize)]
struct RawSummitPeak {
    mountain_id: u32,
    #[serde(default)]
    short_mountain_name: Option<String>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Deserialize)]
struct Named {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawRoute {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mountain_route_complexity: Option<Named>,
    #[serde(default)]
    mountain_route_type: Option<Named>,
    #[serde(default)]
    mountain_peaks: Vec<RawRoutePeak>,
    #[serde(default)]
    documents_files: Vec<RawDocument>,
}

#[derive(Deserialize)]
struct RawRoutePeak {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    mountain_region_name: Option<String>,
    #[serde(default)]
    mountain_area_name: Option<String>,
}

#[derive(Deserialize)]
struct RawDocument {
    id: u64,
    #[serde(default)]
    original_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRouteGroup {
    Indexed(BTreeMap<String, serde_json::Value>),
    Listed(Vec<serde_json::Value>),
}

impl RawRouteGroup {
    fn into_first(self) -> Option<serde_json::Value> {
        let first = match self {
            Self::Indexed(mut map) => map.remove("0"),
            Self::Listed(list) => list.into_iter().next(),
        };
        first.filter(|v| !v.is_null())
    }
}

fn name_of(named: Option<Named>) -> String {
    named.and_then(|n| n.name).unwrap_or_default()
}

impl RawRoute {
    fn into_route(self, endpoint: &str) -> Result<Route> {
        let mut peaks = self.mountain_peaks.into_iter();
        let peak = peaks.next().ok_or_else(|| Error::Decode {
            endpoint: endpoint.to_string(),
            message: format!(
                "route \"{}\" has no peak record",
                self.name.as_deref().unwrap_or_default()
            ),
        })?;

        Ok(Route {
            complexity_name: name_of(self.mountain_route_complexity),
            type_name: name_of(self.mountain_route_type),
            name: self.name.unwrap_or_default(),
            peak_name: peak.name.unwrap_or_default(),
            region_name: peak.mountain_region_name.unwrap_or_default(),
            area_name: peak.mountain_area_name.unwrap_or_default(),
            height: peak.height.unwrap_or_default(),
            documents: self
                .documents_files
                .into_iter()
                .map(|d| Document {
                    id: d.id,
                    original_name: d.original_name.unwrap_or_default(),
                })
                .collect(),
        })
    }
}

/// Deserializes a JSON body, tagging failures with the endpoint they came from.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::decode(endpoint, &e))
}

/// Parses the per-area mountain list into summits (first peak of each mountain).
pub(crate) fn parse_summits(endpoint: &str, body: &[u8]) -> Result<Vec<Summit>> {
    let mountains: Vec<RawMountain> = decode(endpoint, body)?;
    Ok(mountains
        .into_iter()
        .filter_map(|m| m.mountain_peaks.into_iter().next())
        .map(|p| Summit {
            id: p.mountain_id,
            name: p.short_mountain_name.unwrap_or_default(),
            height: p.height.unwrap_or_default(),
        })
        .collect())
}

/// Parses a route-search response, taking element `0` of every group.
pub(crate) fn parse_routes(endpoint: &str, body: &[u8]) -> Result<Vec<Route>> {
    let groups: Vec<RawRouteGroup> = decode(endpoint, body)?;
    let mut routes = Vec::with_capacity(groups.len());
    for (idx, group) in groups.into_iter().enumerate() {
        let Some(first) = group.into_first() else {
            log::warn!("Route group {idx} from {endpoint} has no element 0, skipping");
            continue;
        };
        let raw: RawRoute =
            serde_json::from_value(first).map_err(|e| Error::decode(endpoint, &e))?;
        routes.push(raw.into_route(endpoint)?);
    }
    Ok(routes)
}
