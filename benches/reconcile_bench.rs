use cardmirror::catalog::{Catalog, CatalogKind};
use cardmirror::reconcile::{SuffixRule, reconcile};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::fs;
use std::hint::black_box;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

/// `size` cards spread over `size / 20` directories. The destination has
/// every other card, half of those stale, plus a few orphans.
fn create_catalogs(size: usize) -> (Catalog, Catalog) {
    let mut source = Catalog::new("/cards", ".kra");
    let mut destination = Catalog::new("/rendered", ".jpg");

    for i in 0..size {
        let dir = format!("set_{}", i / 20);
        source.insert_card(format!("{dir}/card_{i}.kra"), at(2_000));
        if i % 2 == 0 {
            let secs = if i % 4 == 0 { 3_000 } else { 1_000 };
            destination.insert_card(format!("{dir}/card_{i}.jpg"), at(secs));
        }
    }
    for i in 0..size / 50 {
        destination.insert_card(format!("retired/old_{i}.jpg"), at(1_000));
    }

    (source, destination)
}

fn benchmark_reconcile(c: &mut Criterion) {
    let rule = SuffixRule::new(".kra", ".jpg");
    let mut group = c.benchmark_group("reconcile");

    for size in [100, 1_000, 10_000] {
        let (source, destination) = create_catalogs(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| reconcile(black_box(&source), black_box(&destination), |p| rule.derive(p)));
        });
    }

    group.finish();
}

fn benchmark_scan(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("cards");

    for i in 0..500 {
        let sub = root.join(format!("set_{}", i / 25));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("card_{i}.kra")), "card").unwrap();
        if i % 10 == 0 {
            fs::write(sub.join(format!("notes_{i}.txt")), "notes").unwrap();
        }
    }

    c.bench_function("scan_500_cards", |b| {
        b.iter(|| Catalog::scan(black_box(&root), CatalogKind::Source, ".kra").unwrap());
    });
}

criterion_group!(benches, benchmark_reconcile, benchmark_scan);
criterion_main!(benches);
