// src/models/region.rs

//! Storefront region table.
//!
//! The App Store partitions its catalog by country/region code. The list
//! below is ordered by expected hit likelihood; the prober walks a prefix
//! of it (see `lookup.probe_limit` in the configuration).

/// Lookup regions in priority order.
pub const REGIONS: [&str; 20] = [
    "cn", "us", "hk", "tw", "jp", "kr", "gb", "sg", "au", "de", "fr", "ca", "it", "es", "ru", "br",
    "mx", "in", "th", "vn",
];

/// Human-readable name for a region code.
///
/// Unknown codes fall back to the uppercased code.
pub fn display_name(code: &str) -> String {
    let name = match code {
        "cn" => "China",
        "us" => "United States",
        "hk" => "Hong Kong",
        "tw" => "Taiwan",
        "jp" => "Japan",
        "kr" => "South Korea",
        "gb" => "United Kingdom",
        "sg" => "Singapore",
        "au" => "Australia",
        "de" => "Germany",
        "fr" => "France",
        "ca" => "Canada",
        "it" => "Italy",
        "es" => "Spain",
        "ru" => "Russia",
        "br" => "Brazil",
        "mx" => "Mexico",
        "in" => "India",
        "th" => "Thailand",
        "vn" => "Vietnam",
        _ => return code.to_uppercase(),
    };
    name.to_string()
}
