//! # CSV Export
//!
//! Renders sales rows as a CSV document held in memory.

use gustanto_core::Sale;

/// Header row of every export.
pub const CSV_HEADER: [&str; 3] = ["Item", "Price", "Timestamp"];

/// Writes `Item,Price,Timestamp` plus one record per sale.
///
/// Item names are quoted by the writer when they contain commas, quotes or
/// line breaks.
pub fn sales_csv(sales: &[Sale]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for sale in sales {
        writer.write_record([
            sale.item.as_str(),
            &sale.price.to_string(),
            sale.timestamp.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
