//! Local directory layout of downloaded route documents.
//!
//! `<root>/<range>/<area>/<peak> <height>/<grade> <route> <type>/<file>`
//!
//! Every component has the characters `< > : " / \ | ? *` replaced by a
//! single space each. No other escaping is done, except that a component
//! that would read as `.` or `..` becomes `_`.

use std::path::{Path, PathBuf};

use crate::catalog::model::Route;

const FORBIDDEN: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces every forbidden character with a space.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { ' ' } else { c })
        .collect();
    match cleaned.as_str() {
        "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Reduces a server-supplied name to a bare, sanitized filename.
///
/// Returns `None` when nothing usable is left.
#[must_use]
pub fn bare_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    if last.trim().is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(sanitize_component(last))
}

/// `"<grade> <route name> <type>"`, sanitized.
#[must_use]
pub fn route_label(route: &Route) -> String {
    sanitize_component(&format!(
        "{} {} {}",
        route.complexity_name, route.name, route.type_name
    ))
}

/// `"<peak name> <height>"`, sanitized.
#[must_use]
pub fn peak_label(route: &Route) -> String {
    sanitize_component(&format!("{} {}", route.peak_name, route.height))
}

/// Directory that receives the documents of `route`.
#[must_use]
pub fn route_dir(root: &Path, route: &Route) -> PathBuf {
    root.join(sanitize_component(&route.region_name))
        .join(sanitize_component(&route.area_name))
        .join(peak_label(route))
        .join(route_label(route))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route {
            complexity_name: "2А".into(),
            type_name: "к".into(),
            name: "North Ridge".into(),
            peak_name: "Peak X".into(),
            region_name: "Caucasus".into(),
            area_name: "Bezengi".into(),
            height: 3500,
            documents: vec![],
        }
    }

    #[test]
    fn forbidden_chars_become_single_spaces() {
        assert_eq!(sanitize_component("A/B:C\"D"), "A B C D");
        assert_eq!(sanitize_component("<>|?*\\"), "      ");
        assert_eq!(sanitize_component("Пик Ленина"), "Пик Ленина");
    }

    #[test]
    fn dot_components_are_neutralized() {
        assert_eq!(sanitize_component(".."), "_");
        assert_eq!(sanitize_component("."), "_");
        assert_eq!(sanitize_component("..."), "...");
    }

    #[test]
    fn bare_filename_strips_directories() {
        assert_eq!(bare_filename("desc.pdf").as_deref(), Some("desc.pdf"));
        assert_eq!(bare_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(bare_filename("C:\\docs\\scheme.jpg").as_deref(), Some("scheme.jpg"));
        assert_eq!(bare_filename("a:b.txt").as_deref(), Some("a b.txt"));
        assert_eq!(bare_filename("dir/"), None);
        assert_eq!(bare_filename(".."), None);
        assert_eq!(bare_filename(""), None);
    }

    #[test]
    fn route_dir_follows_layout() {
        let dir = route_dir(Path::new("downloads"), &route());
        assert_eq!(
            dir,
            PathBuf::from("downloads/Caucasus/Bezengi/Peak X 3500/2А North Ridge к")
        );
    }

    #[test]
    fn route_label_is_sanitized() {
        let mut r = route();
        r.name = "Ridge \"West\"/Couloir".into();
        assert_eq!(route_label(&r), "2А Ridge  West  Couloir к");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sanitize_preserves_char_count(s in "\\PC*") {
                let out = sanitize_component(&s);
                if out != "_" {
                    prop_assert_eq!(out.chars().count(), s.chars().count());
                }
            }

            #[test]
            fn sanitize_removes_forbidden(s in "\\PC*") {
                let out = sanitize_component(&s);
                prop_assert!(!out.contains(FORBIDDEN));
            }

            #[test]
            fn bare_filename_has_no_separators(s in "\\PC*") {
                if let Some(name) = bare_filename(&s) {
                    prop_assert!(!name.contains('/') && !name.contains('\\'));
                    prop_assert!(!name.is_empty());
                }
            }
        }
    }
}
