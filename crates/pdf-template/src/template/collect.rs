//! Gathering one value per marker

use crate::markers::{Markers, ReplacementTable};
use crate::source::ValueSource;

/// Ask `source` for the value of each marker, in marker order.
///
/// Every marker gets an entry; a missing answer is stored as the empty
/// string so the placeholder is removed from the output.
pub fn collect(markers: &Markers, source: &mut dyn ValueSource) -> ReplacementTable {
    let mut table = ReplacementTable::new();
    for marker in markers.iter() {
        let value = source.value_for(marker).unwrap_or_default();
        log::debug!("{{{}}} -> {:?}", marker, value);
        table.insert(marker, value);
    }
    table
}
