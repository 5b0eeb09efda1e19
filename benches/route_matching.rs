use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use storefront_shell::router::{Route, RouteTable};

fn table(dynamic_routes: usize) -> RouteTable {
    let mut table = RouteTable::new();
    table.insert(Route::new("/", "Home"));
    for i in 0..dynamic_routes {
        table.insert(Route::new(&format!("/section{i}/:id/reviews/:review"), "Reviews"));
    }
    table.insert(Route::new("/products/:id", "ProductDetail"));
    table.insert(Route::new("*", "NotFound"));
    table
}

fn benchmark(c: &mut Criterion) {
    let table = table(50);

    c.bench_function("exact", |b| b.iter(|| table.match_path(black_box("/"))));

    c.bench_function("dynamic-last", |b| {
        b.iter(|| table.match_path(black_box("/products/42")))
    });

    c.bench_function("catch-all", |b| {
        b.iter(|| table.match_path(black_box("/no/such/page")))
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
