use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;
use text_pipeline::{registry, StageInstance, WorkHook, END_TOKEN};

/// Terminal hook that discards items, keeping stdout out of the measurement.
fn null_hook() -> WorkHook {
    Arc::new(|_item: &str| Ok(()))
}

fn build_chain(stage_names: &[&str], queue_size: usize) -> Vec<StageInstance> {
    let mut stages: Vec<StageInstance> = stage_names
        .iter()
        .map(|name| {
            StageInstance::new(*name, registry::create(name).expect("unknown stage"))
        })
        .collect();
    for stage in &mut stages {
        stage.init(queue_size).expect("init failed");
    }
    for index in 0..stages.len() - 1 {
        let hook = stages[index + 1].work_hook().expect("hook");
        stages[index].attach(Some(hook)).expect("attach");
    }
    stages
        .last()
        .expect("chain")
        .attach(Some(null_hook()))
        .expect("attach");
    stages
}

fn drive(mut stages: Vec<StageInstance>, lines: usize) {
    let first = stages.first().expect("chain");
    for i in 0..lines {
        first
            .place_work(black_box(&format!("line {i}")))
            .expect("place_work failed");
    }
    first.place_work(END_TOKEN).expect("sentinel rejected");
    for stage in &stages {
        stage.wait_finished().expect("wait failed");
    }
    for stage in &mut stages {
        stage.fini().expect("fini failed");
    }
}

fn benchmark_single_stage_throughput(c: &mut Criterion) {
    c.bench_function("single_stage_1000_lines", |b| {
        b.iter(|| drive(build_chain(&["uppercaser"], 1000), 1000));
    });
}

fn benchmark_three_stage_throughput(c: &mut Criterion) {
    c.bench_function("three_stage_1000_lines", |b| {
        b.iter(|| {
            drive(
                build_chain(&["uppercaser", "flipper", "rotator"], 1000),
                1000,
            )
        });
    });
}

fn benchmark_small_queue_throughput(c: &mut Criterion) {
    // Capacity 2 keeps every hand-off on the blocking path.
    c.bench_function("three_stage_1000_lines_queue_2", |b| {
        b.iter(|| drive(build_chain(&["uppercaser", "flipper", "rotator"], 2), 1000));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = benchmark_single_stage_throughput, benchmark_three_stage_throughput, benchmark_small_queue_throughput
);
criterion_main!(benches);
