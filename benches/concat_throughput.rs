use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_concat::{RunOptions, execute};
use tempfile::TempDir;

const COLUMNS: [&str; 4] = ["id", "ordered_at", "ship_time", "status"];

fn generate_orders(dir: &Path, name: &str, order: &[usize], rows: usize) -> PathBuf {
    let csv_path = dir.join(name);
    let mut file = BufWriter::new(File::create(&csv_path).expect("create csv"));
    let header = order.iter().map(|&idx| COLUMNS[idx]).collect::<Vec<_>>();
    writeln!(file, "{}", header.join(",")).expect("header");
    for i in 0..rows {
        let status = match i % 3 {
            0 => "shipped",
            1 => "pending",
            _ => "processing",
        };
        let day = (i % 28) + 1;
        let hour = (i % 23) + 1;
        let values = [
            i.to_string(),
            format!("2024-01-{day:02}"),
            format!("{hour:02}:00:00"),
            status.to_string(),
        ];
        let row = order
            .iter()
            .map(|&idx| values[idx].as_str())
            .collect::<Vec<_>>();
        writeln!(file, "{}", row.join(",")).expect("row");
    }
    csv_path
}

fn bench_concat(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("temp dir");
    let first = generate_orders(temp_dir.path(), "first.csv", &[0, 1, 2, 3], 50_000);
    let second = generate_orders(temp_dir.path(), "second.csv", &[3, 2, 1, 0], 50_000);
    let output = temp_dir.path().join("merged.csv");

    let positional = RunOptions::new(vec![first.clone(), second.clone()], &output);
    let reordered = positional.clone().with_headers(true, true);

    let mut group = c.benchmark_group("concat");

    group.bench_function("positional", |b| {
        b.iter_batched(
            || (),
            |_| {
                execute(&positional).expect("concat positional");
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("header_reorder", |b| {
        b.iter_batched(
            || (),
            |_| {
                execute(&reordered).expect("concat reordered");
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
    drop(temp_dir);
}

criterion_group!(benches, bench_concat);
criterion_main!(benches);
