// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use apiscope::{ExportFormat, Scanner};

const PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Shop</title></head>
    <body>
        <a href="/api/products">Products</a>
        <form action="/api/checkout" method="post">
            <input type="text" name="card" required>
            <input type="submit">
        </form>
        <button data-api="/api/cart" data-method="post">Add</button>
        <script>
            fetch("https://api.example.com/v1/items");
            axios.get("/api/reviews");
            var apiKey = "aB3xK9mQ2rT7wZ5cJ1nH8dF4gS6pL0vY";
            const ws = new WebSocket("wss://example.com/live");
        </script>
    </body>
    </html>
"#;

fn scan_benchmark(c: &mut Criterion) {
    let scanner = Scanner::new();

    c.bench_function("scan_page", |b| {
        b.iter(|| {
            let outcome = scanner
                .scan_content(black_box(PAGE.as_bytes()), Some("text/html"), "bench", vec![])
                .unwrap();
            black_box(outcome.findings.len())
        })
    });
}

fn export_benchmark(c: &mut Criterion) {
    let scanner = Scanner::new();
    let outcome = scanner
        .scan_content(PAGE.as_bytes(), Some("text/html"), "bench", vec![])
        .unwrap();

    c.bench_function("export_json", |b| {
        b.iter(|| black_box(outcome.export(ExportFormat::Json).unwrap().content.len()))
    });
}

criterion_group!(benches, scan_benchmark, export_benchmark);
criterion_main!(benches);
