use arbitrary::{Arbitrary, Unstructured};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdreplay::{BTreeBook, Book, OrderRecord, Side};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

const SAMPLE_SECS: u64 = 5;
const BUFLEN: usize = 256;

fn make_orders(n: usize) -> Vec<(Side, OrderRecord)> {
    let mut rng = StdRng::seed_from_u64(42); // Deterministic RNG for reproducibility
    (0..n)
        .map(|i| {
            let mut bytes = vec![0u8; BUFLEN];
            rng.fill_bytes(&mut bytes);
            let mut unstructured = Unstructured::new(&bytes);
            let side = Side::arbitrary(&mut unstructured)
                .expect("Failed to generate instance");
            let mut order = OrderRecord::arbitrary(&mut unstructured)
                .expect("Failed to generate instance");
            order.order_id = i as u64; // Unique ids so every add rests
            order.quantity = rng.gen_range(1..1_000);
            order.price = rng.gen_range(10.0..100.0); // Set realistic price ranges
            (side, order)
        })
        .collect()
}

fn insert_into_book(orders: &[(Side, OrderRecord)], book: &mut BTreeBook) {
    orders.iter().for_each(|(side, order)| {
        let _ = book.add(order.order_id, *side, order.quantity, order.price);
    });
}

fn benchmark_1000(c: &mut Criterion) {
    let orders = make_orders(black_box(1000));

    c.bench_function("insert 1000", |b| {
        b.iter(|| {
            let mut book = BTreeBook::new("BENCH");
            insert_into_book(&orders, &mut book)
        })
    });
}

fn benchmark_10000(c: &mut Criterion) {
    let orders = make_orders(black_box(10000));

    c.bench_function("insert 10000", |b| {
        b.iter(|| {
            let mut book = BTreeBook::new("BENCH");
            insert_into_book(&orders, &mut book)
        })
    });
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .measurement_time(std::time::Duration::from_secs(SAMPLE_SECS))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = benchmark_1000, benchmark_10000,
}
criterion_main!(benches);
