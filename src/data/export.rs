use std::io::Write;
use std::path::Path;

use crate::data::table::{SignalTable, BLADDER_PRESSURE, ELAPSED_TIME, SCALE};
use crate::error::Result;

/// Write `table` as CSV: header row, then one row per sample.
/// The `Scale` column is written only when the table carries one; missing cells stay empty.
pub fn write_table_csv<W: Write>(writer: W, table: &SignalTable) -> Result<()> {
	let mut w = csv::Writer::from_writer(writer);
	let scale = table.scale.as_deref();
	if scale.is_some() {
		w.write_record([ELAPSED_TIME, BLADDER_PRESSURE, SCALE])?;
	} else {
		w.write_record([ELAPSED_TIME, BLADDER_PRESSURE])?;
	}
	for (row, p) in table.points.iter().enumerate() {
		let t = p[0].to_string();
		let v = p[1].to_string();
		match scale {
			Some(cells) => {
				let s = cells.get(row).copied().flatten().map(|s| s.to_string()).unwrap_or_default();
				w.write_record([t, v, s])?;
			}
			None => w.write_record([t, v])?,
		}
	}
	w.flush()?;
	Ok(())
}

pub fn save_table_csv<P: AsRef<Path>>(path: P, table: &SignalTable) -> Result<()> {
	let f = std::fs::File::create(path)?;
	write_table_csv(std::io::BufWriter::new(f), table)
}

#[cfg(feature = "parquet")]
pub fn save_table_parquet<P: AsRef<Path>>(path: P, table: &SignalTable) -> Result<()> {
	use std::sync::Arc;
	use arrow_array::{ArrayRef, Float64Array, RecordBatch};
	use arrow_schema::{DataType, Field, Schema};
	use parquet::arrow::arrow_writer::ArrowWriter;
	use parquet::file::properties::WriterProperties;

	let mut fields = vec![
		Field::new(ELAPSED_TIME, DataType::Float64, false),
		Field::new(BLADDER_PRESSURE, DataType::Float64, false),
	];
	let mut columns: Vec<ArrayRef> = vec![
		Arc::new(Float64Array::from(table.times())),
		Arc::new(Float64Array::from(table.values())),
	];
	if let Some(scale) = &table.scale {
		fields.push(Field::new(SCALE, DataType::Float64, true));
		columns.push(Arc::new(Float64Array::from(scale.clone())));
	}
	let schema = Arc::new(Schema::new(fields));
	let batch = RecordBatch::try_new(schema.clone(), columns)?;
	let file = std::fs::File::create(path)?;
	let props = WriterProperties::builder().build();
	let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
	writer.write(&batch)?;
	writer.close()?;
	Ok(())
}
