use criterion::{Criterion, criterion_group, criterion_main};
use retrace::Regex;
use std::hint::black_box;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("match", |b| {
        b.iter(|| {
            let re = Regex::new(r"\d+").unwrap();
            let _result = re.find(black_box("Price: $123"));
        })
    });

    c.bench_function("complex match", |b| {
        b.iter(|| {
            let re = Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap();
            let _result = re.find(black_box("Born on 12/25/1990 and graduated on 5/15/2012"));
        })
    });

    let haystack = "lorem ipsum dolor sit amet ".repeat(200) + "needle";
    c.bench_function("literal prefix search", |b| {
        let re = Regex::new("needle").unwrap();
        b.iter(|| re.find(black_box(haystack.as_str())))
    });

    c.bench_function("backtracking", |b| {
        let re = Regex::new(r"(a|aa)+b").unwrap();
        let text = "a".repeat(18);
        b.iter(|| re.find(black_box(text.as_str())))
    });

    c.bench_function("traced match", |b| {
        let re = Regex::new(r"(\w+)\s(\w+)").unwrap();
        b.iter(|| re.exec_debug(black_box("hello big world"), 0, false, false))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
