use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pageshots::fanout::{fan_out, sizes_for};
use pageshots::resolve::resolve;
use pageshots::{ConfigFile, Settings, Shots, TargetInput};

fn bench_resolve(c: &mut Criterion) {
    let mut settings = Settings::new();
    settings.set_base_url("https://www.mysite.com");
    settings.set_dir("images");
    settings.set_name_format("{stub}-{width}x{height}-{full}");
    let target = TargetInput::new("/products/some-long-product-name?ref=bench");

    c.bench_function("resolve_target", |b| {
        b.iter(|| resolve(black_box(&target), black_box(&settings)))
    });

    for size in ["1300x800", "1024x768", "768x1024", "375x812"] {
        settings.add_size(size);
    }
    c.bench_function("fan_out_four_sizes", |b| {
        b.iter(|| {
            let base = resolve(black_box(&target), &settings);
            fan_out(base, sizes_for(&target, &settings))
        })
    });
}

fn bench_config(c: &mut Criterion) {
    let urls: Vec<String> = (0..50).map(|i| format!("\"/page/{}\"", i)).collect();
    let json = format!(
        r#"{{"baseUrl":"https://www.mysite.com","sizes":["1300x800","375x812"],"urls":[{}]}}"#,
        urls.join(",")
    );

    c.bench_function("load_config_and_plan", |b| {
        b.iter(|| {
            let config = ConfigFile::from_json(black_box(&json)).unwrap();
            let mut shots = Shots::new();
            config.apply(&mut shots);
            shots.jobs()
        })
    });
}

criterion_group!(benches, bench_resolve, bench_config);
criterion_main!(benches);
