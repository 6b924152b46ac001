use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_wire::*;
use std::sync::{Arc, Mutex};

// ===== Micro Benchmarks =====

fn bench_cached_get(c: &mut Criterion) {
    let container = ContainerBuilder::new().instance("Port", 8080u16).build();

    // Prime the cache
    let _ = container.get("Port").unwrap();

    c.bench_function("get_cached", |b| {
        b.iter(|| {
            let v = container.get(black_box("Port")).unwrap();
            black_box(v);
        })
    });
}

fn bench_make_autowired(c: &mut Criterion) {
    struct Repository {
        _db: Arc<String>,
    }

    let container = ContainerBuilder::new()
        .instance("Dsn", "postgres://localhost".to_string())
        .register_type(TypeDef::concrete(
            "Repository",
            Constructor::new(vec![Param::typed("db", "Dsn")], |_, _, args| {
                Ok(Repository { _db: args.get::<String>(0)? })
            }),
        ))
        .build();

    c.bench_function("make_autowired", |b| {
        b.iter(|| {
            let v = container.make("Repository", &Params::new()).unwrap();
            black_box(v);
        })
    });

    c.bench_function("make_with_surplus_override", |b| {
        let params = Params::new().with("cache", Arg::reference("#hot"));
        b.iter(|| {
            let v = container.make("Repository", black_box(&params)).unwrap();
            black_box(v);
        })
    });
}

fn bench_alias_chain_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("alias_chain_cold");
    for length in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::new("get", length), &length, |b, &length| {
            b.iter_batched(
                || {
                    let mut builder = ContainerBuilder::new().instance("Link0", 1u64);
                    for i in 1..=length {
                        let target = format!("@Link{}", i - 1);
                        builder = builder.define_str(format!("Link{}", i), &target);
                    }
                    builder.build()
                },
                |container| {
                    let v = container.get(&format!("Link{}", length)).unwrap();
                    black_box(v);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// ===== Context Benchmarks =====

#[derive(Default)]
struct RequestContext {
    _path: Mutex<String>,
}
impl ContextState for RequestContext {}

struct Request {
    handle: Handle,
}

impl Component for Request {
    fn handle(&self) -> &Handle {
        &self.handle
    }
}

fn bench_context_lookup(c: &mut Criterion) {
    let registry =
        ContextRegistry::new().register(ContextType::of::<RequestContext>("RequestContext"));
    let request = Request {
        handle: Handle::new("Request"),
    };

    let flat = Contextor::new(Scheduler::Inactive, registry.clone());
    let _ = flat.context_any(&request).unwrap();
    c.bench_function("context_flat_hit", |b| {
        b.iter(|| black_box(flat.context_any(&request).unwrap()))
    });

    let cooperative = Contextor::new(Scheduler::Cooperative, registry);
    unit::root_sync(|| {
        let _ = cooperative.context_any(&request).unwrap();
        c.bench_function("context_unit_hit", |b| {
            b.iter(|| black_box(cooperative.context_any(&request).unwrap()))
        });
    });
}

fn bench_context_inherit(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let contextor = Arc::new(Contextor::new(
        Scheduler::Cooperative,
        ContextRegistry::new().register(ContextType::of::<RequestContext>("RequestContext")),
    ));
    let request = Arc::new(Request {
        handle: Handle::new("Request"),
    });

    c.bench_function("context_child_inherit", |b| {
        b.iter(|| {
            runtime.block_on(unit::root({
                let contextor = contextor.clone();
                let request = request.clone();
                async move {
                    contextor.context_any(&*request).unwrap();
                    unit::spawn(async move { black_box(contextor.context_any(&*request).unwrap()) })
                        .await
                        .unwrap()
                }
            }))
        })
    });
}

criterion_group!(
    micro_benches,
    bench_cached_get,
    bench_make_autowired,
    bench_alias_chain_cold,
    bench_context_lookup,
    bench_context_inherit
);

criterion_main!(micro_benches);
