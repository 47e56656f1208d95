/// Data preparation for the forecast service.
///
/// Submodules:
/// - `cleaning`: turns raw daily values into a gap-free, invalid-nulled series.
/// - `seasonal`: pivots raw daily values into a day-of-year × year table.

pub mod cleaning;
pub mod seasonal;
