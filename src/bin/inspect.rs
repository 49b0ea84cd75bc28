use arrow::array::{Array, Float64Array, StringArray, UInt64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::env;
use std::fs::File;

/// Print an exported chart or metrics parquet file
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <parquet_file>", args[0]);
        std::process::exit(1);
    }

    let filepath = &args[1];
    println!("\n{}", "=".repeat(80));
    println!("Inspecting: {}", filepath);
    println!("{}", "=".repeat(80));

    let file = File::open(filepath)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let columns: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    if columns.len() != 2 {
        anyhow::bail!("Expected a label and a value column, found {:?}", columns);
    }

    println!("{:<40} {:>20}", columns[0], columns[1]);
    println!("{}", "-".repeat(80));

    let mut total_rows = 0;
    let mut empty_labels = 0;
    let mut total_value = 0.0;

    for batch_result in reader {
        let batch = batch_result?;
        let labels = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow::anyhow!("Failed to cast label column"))?;

        let values: Vec<f64> = if let Some(floats) = batch.column(1).as_any().downcast_ref::<Float64Array>() {
            floats.values().iter().copied().collect()
        } else if let Some(ints) = batch.column(1).as_any().downcast_ref::<UInt64Array>() {
            ints.values().iter().map(|v| *v as f64).collect()
        } else {
            anyhow::bail!("Unsupported value column type: {}", batch.column(1).data_type());
        };

        for (i, value) in values.iter().enumerate() {
            let label = labels.value(i);
            if label.is_empty() || labels.is_null(i) {
                empty_labels += 1;
            }
            println!("{:<40} {:>20.2}", label, value);
            total_value += value;
        }
        total_rows += batch.num_rows();
    }

    println!("{}", "-".repeat(80));
    println!("Total rows: {}", total_rows);
    println!("Sum of values: {:.2}", total_value);

    println!("\n{} SANITY CHECKS {}", "=".repeat(32), "=".repeat(33));
    if empty_labels == 0 {
        println!("✓ Every row has a label");
    } else {
        println!("✗ {} rows without a label", empty_labels);
    }

    Ok(())
}
