use auditrack::model::{FunctionRecord, RootState, TrackedFile};
use auditrack::reconcile::reconcile;
use auditrack::store::normalize::normalize_state;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::Path;

const FILE: &str = "/audit/src/Vault.sol";

fn records(count: u32, shift: u32) -> Vec<FunctionRecord> {
    (0..count)
        .map(|i| {
            let start = i * 12 + shift;
            let mut record = FunctionRecord::new(FILE, &format!("function_{i}"), start, start + 10);
            record.read_count = i % 2;
            record
        })
        .collect()
}

fn benchmark_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for count in [10, 100, 1000] {
        let previous = records(count, 0);

        group.bench_with_input(BenchmarkId::new("unchanged", count), &count, |b, &n| {
            b.iter(|| reconcile(black_box(&previous), records(n, 0)));
        });

        group.bench_with_input(BenchmarkId::new("shifted", count), &count, |b, &n| {
            b.iter(|| reconcile(black_box(&previous), records(n, 3)));
        });
    }

    group.finish();
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut state = RootState::default();
    for i in 0..200 {
        let path = format!("/audit/src/Contract{i}.sol");
        let mut file = TrackedFile::new(&path, &format!("src/Contract{i}.sol"));
        file.functions = (0..20)
            .map(|j| FunctionRecord::new(&path, &format!("f{j}"), j * 8, j * 8 + 6))
            .collect();
        state.files.insert(path, file);
    }
    let document = serde_json::to_value(&state).unwrap();

    c.bench_function("normalize_200_files", |b| {
        b.iter(|| normalize_state(black_box(&document), Path::new("/audit")));
    });
}

criterion_group!(benches, benchmark_reconcile, benchmark_normalize);
criterion_main!(benches);
