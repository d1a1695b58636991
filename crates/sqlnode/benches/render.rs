use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlnode::qb::{Select, SqlQb};
use sqlnode::schema::{Column, Expr};
use sqlnode::sql::{self, FragmentList, literal, param};

/// SELECT `col0`, ... FROM `t` AS `t1` WHERE `col0` = %s AND `col1` = %s ...
fn build_select(n: usize) -> Select {
    let columns: Vec<Column> = (0..n).map(|i| Column::new("t", format!("col{i}"))).collect();
    let filter = Expr::and(
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.eq(i as i64))
            .collect(),
    );
    Select::new("t", columns).filter(filter)
}

fn bench_render_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");

    for n in [1, 5, 10, 50, 100] {
        let select = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &select, |b, select| {
            b.iter(|| black_box(select.statement()));
        });
    }

    group.finish();
}

fn bench_flat_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/flat_list");

    for n in [5, 20, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut q = FragmentList::with_glue(" ");
                q.append(literal("SELECT * FROM t WHERE id IN"))
                    .append(sql::enclosed((0..n as i64).map(param)));
                black_box(sql::render(&q))
            });
        });
    }

    group.finish();
}

fn bench_postgres_translation(c: &mut Criterion) {
    let stmt = build_select(50).statement().expect("valid select");
    c.bench_function("render/to_postgres", |b| {
        b.iter(|| black_box(sqlnode::to_postgres(stmt.text())));
    });
}

criterion_group!(
    benches,
    bench_render_select,
    bench_flat_list,
    bench_postgres_translation
);
criterion_main!(benches);
