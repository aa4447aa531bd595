//! Static IBM Cloud catalogs and membership checks.

/// IBM Cloud regions.
pub const ZONES: &[&str] = &[
    "ap-north",
    "jp-tok",
    "ap-south",
    "au-syd",
    "eu-central",
    "eu-de",
    "uk-south",
    "eu-gb",
    "us-east",
    "us-south",
];

/// Data center locations accepted by `--location`.
pub const LOCATIONS: &[&str] = &["ams03", "fra02", "par01"];

/// Worker machine types accepted by `--machine-type`.
pub const MACHINE_TYPES: &[&str] = &[
    "b2c.16x64",
    "b2c.32x128",
    "b2c.4x16",
    "b2c.56x242",
    "dal10",
    "dal12",
    "dal13",
    "mb1c.16x64",
    "mb1c.4x32",
    "md1c.16x64.4x4tb",
    "md1c.28x512.4x4tb",
    "mr1c.28x512",
    "sao01",
    "u2c.2x4",
];

/// Hardware isolation levels accepted by `--hardware`.
pub const HARDWARE_ISOLATION_LEVELS: &[&str] = &["dedicated", "shared"];

/// Check whether `value` is one of the entries in `catalog`.
///
/// Matching is exact and case-sensitive.
#[must_use]
pub fn is_valid(value: &str, catalog: &[&str]) -> bool {
    catalog.iter().any(|valid| *valid == value)
}
