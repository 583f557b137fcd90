/// Lowercases a CSV header and collapses every run of whitespace, `_`, or
/// `-` into a single space. Byte-order marks and zero-width spaces that
/// spreadsheet exports leave behind are dropped.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let spaced = cleaned.replace(['_', '-'], " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Record field a normalized header feeds, if any. `camelCase` headers
/// arrive here already lowercased, so `appId` reads as `appid`.
pub(crate) fn field_for_header(normalized: &str) -> Option<&'static str> {
    match normalized {
        "app id" | "appid" | "application id" | "applicationid" | "id" => Some("app_id"),
        "city" | "placement city" => Some("city"),
        "state" | "state name" | "statename" | "placement state" => Some("state"),
        "placement date" | "placementdate" | "placed at" | "placedat" | "date" => {
            Some("placement_date")
        }
        _ => None,
    }
}
