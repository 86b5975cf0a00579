//! Route search filters and their translation into query parameters.

use std::collections::BTreeSet;

/// Lower height bound sent when the caller sets none.
pub const DEFAULT_HEIGHT_MIN: u32 = 0;
/// Upper height bound sent when the caller sets none.
pub const DEFAULT_HEIGHT_MAX: u32 = 8848;
/// Page size. The server caps results at this value; further pages are not requested.
pub const PAGE_LIMIT: u32 = 100;

/// Filters for the route search. Every field is optional.
///
/// `None` means "no filter" and the key is left out of the request entirely,
/// which is not the same as `Some(0)`: an explicit zero is sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub region_id: Option<u32>,
    pub area_id: Option<u32>,
    pub mountain_id: Option<u32>,
    /// Grade codes, see [`crate::catalog::tables::GRADES`].
    pub complexities: BTreeSet<u32>,
    /// Route-type codes, see [`crate::catalog::tables::ROUTE_TYPES`].
    pub types: BTreeSet<u32>,
    pub height_min: Option<u32>,
    pub height_max: Option<u32>,
}

impl RouteQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for every route of one mountain inside a range/area.
    #[must_use]
    pub fn for_mountain(region_id: Option<u32>, area_id: Option<u32>, mountain_id: u32) -> Self {
        Self {
            region_id,
            area_id,
            mountain_id: Some(mountain_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_region(mut self, id: u32) -> Self {
        self.region_id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_area(mut self, id: u32) -> Self {
        self.area_id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_mountain(mut self, id: u32) -> Self {
        self.mountain_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_complexity(mut self, code: u32) -> Self {
        self.complexities.insert(code);
        self
    }

    #[must_use]
    pub fn with_type(mut self, code: u32) -> Self {
        self.types.insert(code);
        self
    }

    #[must_use]
    pub const fn with_height_min(mut self, height: u32) -> Self {
        self.height_min = Some(height);
        self
    }

    #[must_use]
    pub const fn with_height_max(mut self, height: u32) -> Self {
        self.height_max = Some(height);
        self
    }
}

/// Turns a [`RouteQuery`] into the parameter list of `/api/mountainroutes`.
///
/// Merge rule: a value set on the query always wins over the default for the
/// same key. Defaults exist only for the height bounds, `order_by` and the
/// pagination keys; the identifier filters have no default and are omitted
/// when unset.
#[derive(Debug, Clone, Copy)]
pub struct RouteQueryBuilder<'a> {
    query: &'a RouteQuery,
}

impl<'a> RouteQueryBuilder<'a> {
    #[must_use]
    pub const fn new(query: &'a RouteQuery) -> Self {
        Self { query }
    }

    /// Builds the ordered `(key, value)` list. Set filters become repeated keys.
    #[must_use]
    pub fn build(self) -> Vec<(&'static str, String)> {
        let q = self.query;
        let mut params = Vec::new();

        let ids = [
            ("region_id", q.region_id),
            ("area_id", q.area_id),
            ("mountain_id", q.mountain_id),
        ];
        params.extend(
            ids.into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
        );
        params.extend(
            q.complexities
                .iter()
                .map(|c| ("route_complexities[]", c.to_string())),
        );
        params.extend(q.types.iter().map(|t| ("route_types[]", t.to_string())));

        params.push((
            "peak_height_min",
            q.height_min.unwrap_or(DEFAULT_HEIGHT_MIN).to_string(),
        ));
        params.push((
            "peak_height_max",
            q.height_max.unwrap_or(DEFAULT_HEIGHT_MAX).to_string(),
        ));
        params.push(("order_by", String::new()));
        params.push(("offset", "0".to_string()));
        params.push(("limit", PAGE_LIMIT.to_string()));
        params
    }
}
