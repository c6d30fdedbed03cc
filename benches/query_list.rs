use std::cell::Cell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use querylist::{ChangeStreamConfig, QueryList};

fn bench_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_list/reset");
    for size in [16usize, 256, 4096] {
        let items: Vec<u64> = (0..size as u64).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            let mut list = QueryList::new();
            b.iter(|| {
                list.reset(items.iter().copied());
                black_box(list.len());
            });
        });
    }
    group.finish();
}

fn bench_notify_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_list/notify");
    for observers in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(observers), &observers, |b, &observers| {
            let list = QueryList::from(vec![1u64, 2, 3]);
            let hits = Rc::new(Cell::new(0u64));
            let _subs: Vec<_> = (0..observers)
                .map(|_| {
                    let hits = Rc::clone(&hits);
                    list.subscribe(move |l: &QueryList<u64>| {
                        hits.set(hits.get() + l.len() as u64);
                        Ok(())
                    })
                })
                .collect();

            b.iter(|| list.notify_change().unwrap());
            black_box(hits.get());
        });
    }
    group.finish();
}

fn bench_change_stream(c: &mut Criterion) {
    c.bench_function("query_list/change_stream_notify_drain", |b| {
        let list = QueryList::from(vec![0u8; 32]);
        let stream = list
            .change_stream(&ChangeStreamConfig { capacity: 64 })
            .expect("valid stream config");
        b.iter(|| {
            list.notify_change().unwrap();
            black_box(stream.drain());
        });
    });
}

criterion_group!(benches, bench_reset, bench_notify_fanout, bench_change_stream);
criterion_main!(benches);
