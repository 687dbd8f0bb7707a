use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use tau_eval::{
    ArgValue, EvaluationConfig, ExpectedAction, PartialCreditScorer, ReusePolicy, ScoringConfig,
    SimilarityEngine, TaskEvaluator, TaskRecord, ToolInvocation,
};

fn nested_args(depth: usize, seed: i64) -> Value {
    let mut value = json!({
        "user_id": format!("user_{}", seed),
        "amount": seed * 10,
        "items": [seed, seed + 1, seed + 2],
    });
    for level in 0..depth {
        value = json!({ "level": level, "inner": value, "tags": ["a", "b", seed.to_string()] });
    }
    value
}

fn actions(n: usize) -> (Vec<ExpectedAction>, Vec<ToolInvocation>) {
    let expected = (0..n)
        .map(|i| {
            ExpectedAction::new(&format!("tool_{}", i % 7)).with_kwargs(nested_args(2, i as i64))
        })
        .collect();
    let actual = (0..n)
        .rev()
        .map(|i| {
            let seed = if i % 3 == 0 { i as i64 + 1 } else { i as i64 };
            ToolInvocation::new(&format!("tool_{}", i % 7)).with_args(nested_args(2, seed))
        })
        .collect();
    (expected, actual)
}

fn benchmark_similarity(c: &mut Criterion) {
    let engine = SimilarityEngine::new();
    let mut group = c.benchmark_group("argument_similarity");

    for depth in [1, 4, 8] {
        let left = ArgValue::from(nested_args(depth, 1));
        let right = ArgValue::from(nested_args(depth, 2));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| engine.similarity(black_box(&left), black_box(&right)));
        });
    }
    group.finish();
}

fn benchmark_score_task(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_task");

    for size in [4, 16, 64] {
        let (expected, actual) = actions(size);
        let one_to_one = PartialCreditScorer::new();
        let reuse = PartialCreditScorer::with_config(
            ScoringConfig::default().with_reuse(ReusePolicy::AllowReuse),
        );

        group.bench_with_input(BenchmarkId::new("one_to_one", size), &size, |b, _| {
            b.iter(|| one_to_one.score_task(black_box(&expected), black_box(&actual)));
        });
        group.bench_with_input(BenchmarkId::new("allow_reuse", size), &size, |b, _| {
            b.iter(|| reuse.score_task(black_box(&expected), black_box(&actual)));
        });
    }
    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let records: Vec<TaskRecord> = (0..200)
        .map(|i| {
            let (expected, actual) = actions(6);
            let calls: Vec<Value> = actual
                .iter()
                .map(|call| {
                    json!({"function": {
                        "name": call.name,
                        "arguments": serde_json::to_string(&call.arguments).unwrap_or_default()
                    }})
                })
                .collect();
            serde_json::from_value(json!({
                "task_id": i,
                "reward": (i % 2) as f64,
                "info": {"reward_info": {"actions": expected}},
                "traj": [{"role": "assistant", "tool_calls": calls}]
            }))
            .unwrap()
        })
        .collect();

    let parallel = TaskEvaluator::new(EvaluationConfig::default()).unwrap();
    let sequential =
        TaskEvaluator::new(EvaluationConfig { parallel: false, ..Default::default() }).unwrap();

    c.bench_function("evaluate_batch_parallel", |b| {
        b.iter(|| parallel.evaluate_batch(black_box(&records)));
    });
    c.bench_function("evaluate_batch_sequential", |b| {
        b.iter(|| sequential.evaluate_batch(black_box(&records)));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchmark_similarity, benchmark_score_task, benchmark_batch
}
criterion_main!(benches);
