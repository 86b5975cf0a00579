//! Static grade and route-type code tables.

/// Climbing difficulty grades, keyed by the numeric code the catalog uses.
pub const GRADES: &[(u32, &str)] = &[
    (1, "1Б"),
    (21, "1Б*"),
    (2, "2А"),
    (3, "2А*"),
    (4, "2Б"),
    (5, "2Б*"),
    (6, "3А"),
    (7, "3А*"),
    (8, "3Б"),
    (9, "3Б*"),
    (10, "4А"),
    (11, "4А*"),
    (12, "4Б"),
    (13, "4Б*"),
    (14, "5А"),
    (15, "5А*"),
    (16, "5Б"),
    (17, "5Б*"),
    (18, "6А"),
    (19, "6А*"),
    (20, "6Б"),
];

/// Route types: combined, ice, ice/rock, rock, snow.
pub const ROUTE_TYPES: &[(u32, &str)] = &[(1, "к"), (2, "л"), (3, "лс"), (4, "ск"), (5, "сн")];

fn label_of(table: &'static [(u32, &'static str)], id: u32) -> Option<&'static str> {
    table.iter().find(|(code, _)| *code == id).map(|(_, label)| *label)
}

fn id_of(table: &[(u32, &str)], label: &str) -> Option<u32> {
    let label = label.trim();
    table
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(code, _)| *code)
}

/// Returns the human label of a grade code, e.g. `2` → `"2А"`.
#[must_use]
pub fn grade_label(id: u32) -> Option<&'static str> {
    label_of(GRADES, id)
}

/// Returns the grade code for a label, e.g. `"3Б*"` → `9`.
#[must_use]
pub fn grade_id(label: &str) -> Option<u32> {
    id_of(GRADES, label)
}

/// Returns the human label of a route-type code.
#[must_use]
pub fn route_type_label(id: u32) -> Option<&'static str> {
    label_of(ROUTE_TYPES, id)
}

/// Returns the route-type code for a label.
#[must_use]
pub fn route_type_id(label: &str) -> Option<u32> {
    id_of(ROUTE_TYPES, label)
}
