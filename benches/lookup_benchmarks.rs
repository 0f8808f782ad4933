//! Performance benchmarks for the binding hot paths.
//!
//! - Path resolution: flat, nested and deep separator paths
//! - `__index` dispatch through [`ScriptTable`]
//! - Pointer conversion through a populated registry
//!
//! ```bash
//! cargo bench --bench lookup_benchmarks
//! ```

use std::hint::black_box;
use std::ptr::NonNull;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scriptbind::{
    IndexKey, Inherits, Lineage, ScriptTable, SharedObject, Table, Tagged, TypeKey, TypeRegistry,
    TypeTag,
};

fn path_of(depth: usize) -> String {
    (0..depth)
        .map(|i| format!("n{i}"))
        .collect::<Vec<_>>()
        .join("::")
}

fn path_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("table/path_get");

    for depth in [1usize, 4, 16, 64] {
        let table = Table::namespace();
        let key = path_of(depth);
        let value: SharedObject = Rc::new(depth as i64);
        table
            .set(&key, Some(value))
            .expect("fresh namespace accepts any path");

        group.bench_with_input(BenchmarkId::from_parameter(depth), &key, |b, key| {
            b.iter(|| black_box(table.get(black_box(key))))
        });
    }

    group.finish();

    c.bench_function("table/path_set_overwrite", |b| {
        let table = Table::namespace();
        let key = path_of(8);
        b.iter(|| {
            table
                .set(black_box(&key), Some(Rc::new(1i64)))
                .expect("path stays table-shaped")
        })
    });
}

fn index_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("table/index");

    let table = Table::namespace();
    for i in 0..256 {
        table
            .set(&format!("mod{}::item{i}", i % 16), Some(Rc::new(i as i64)))
            .expect("fresh namespace accepts any path");
    }

    group.bench_function("hit", |b| {
        b.iter(|| black_box(table.index(black_box(IndexKey::Str("mod3::item19")))))
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(table.index(black_box(IndexKey::Str("mod3::absent")))))
    });
    group.bench_function("int_key", |b| {
        b.iter(|| black_box(table.index(black_box(IndexKey::Int(7)))))
    });

    group.finish();
}

#[allow(dead_code)]
#[repr(C)]
struct Node {
    tag: TypeTag,
    weight: u32,
}

impl Lineage for Node {}

impl Tagged for Node {
    fn type_tag(&self) -> TypeTag {
        self.tag
    }
}

#[allow(dead_code)]
#[repr(C)]
struct Leaf {
    node: Node,
    label: u64,
}

impl Lineage for Leaf {}

unsafe impl Inherits<Node> for Leaf {}

fn conversion_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/convert");

    let mut registry = TypeRegistry::new();
    registry.declare_relation::<Leaf, Node>();

    let mut leaf = Leaf {
        node: Node {
            tag: TypeTag::of::<Leaf>(),
            weight: 1,
        },
        label: 2,
    };
    let ptr: NonNull<()> = NonNull::from(&mut leaf).cast();
    let node = TypeKey::of::<Node>();
    let leaf_key = TypeKey::of::<Leaf>();

    group.bench_function("identity", |b| {
        b.iter(|| unsafe { registry.convert(black_box(leaf_key), black_box(leaf_key), ptr) })
    });
    group.bench_function("upcast", |b| {
        b.iter(|| unsafe { registry.convert(black_box(leaf_key), black_box(node), ptr) })
    });
    group.bench_function("downcast", |b| {
        b.iter(|| unsafe { registry.convert(black_box(node), black_box(leaf_key), ptr) })
    });
    group.bench_function("missing_edge", |b| {
        let other = TypeKey::of::<u8>();
        b.iter(|| unsafe { registry.convert(black_box(leaf_key), black_box(other), ptr) })
    });

    group.finish();
}

criterion_group!(
    benches,
    path_benchmarks,
    index_benchmarks,
    conversion_benchmarks
);
criterion_main!(benches);
