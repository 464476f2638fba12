//! Performance benchmarks for the RTI engine.
//!
//! Covers the hot paths of a filing run:
//! - Field validation of a single worker record
//! - Building a periodic payment filing for payroll runs of varying size
//! - Validating a stored submission end to end through the manager
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;

use rti_engine::compliance::{build_periodic_payment_filing, validate_worker_record};
use rti_engine::config::{EmployerConfig, GatewayConfig, RtiConfig};
use rti_engine::lifecycle::SubmissionManager;
use rti_engine::models::{Address, WorkerPayRecord};

fn employer() -> EmployerConfig {
    EmployerConfig {
        employer_ref: "123/AB45678".to_string(),
        accounts_office_ref: "123PA00045678".to_string(),
    }
}

/// Creates a valid worker record with pay figures derived from `n`.
fn create_worker(n: usize) -> WorkerPayRecord {
    WorkerPayRecord {
        worker_ref: format!("W{:05}", n),
        ni_number: "AB123456C".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Smith".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 15),
        address: Address {
            lines: vec!["1 High Street".to_string()],
            postcode: "SW1A 1AA".to_string(),
        },
        tax_code: "1257L".to_string(),
        gross_pay: Decimal::new(200_000 + n as i64, 2),
        income_tax: Decimal::new(20_000, 2),
        employee_ni: Decimal::new(10_000, 2),
        employer_ni: Decimal::new(14_000, 2),
        ..Default::default()
    }
}

fn create_workers(count: usize) -> Vec<WorkerPayRecord> {
    (0..count).map(create_worker).collect()
}

fn payment_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 25).expect("valid date")
}

fn bench_validate_worker_record(c: &mut Criterion) {
    let record = create_worker(1);

    c.bench_function("validate_worker_record", |b| {
        b.iter(|| validate_worker_record(black_box(&record)))
    });
}

fn bench_build_filing(c: &mut Criterion) {
    let employer = employer();
    let mut group = c.benchmark_group("build_periodic_payment_filing");

    for worker_count in [1usize, 10, 100, 1000].iter() {
        let records = create_workers(*worker_count);
        group.throughput(Throughput::Elements(*worker_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(worker_count),
            &records,
            |b, records| {
                b.iter(|| {
                    build_periodic_payment_filing(
                        "run_bench",
                        black_box(records.clone()),
                        payment_date(),
                        &employer,
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_validate_submission(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let config = RtiConfig {
        employer: employer(),
        gateway: GatewayConfig::default(),
    };
    let manager = SubmissionManager::in_memory(&config);

    let mut group = c.benchmark_group("validate_submission");
    for worker_count in [10usize, 100].iter() {
        let (_, submission) = rt
            .block_on(manager.finalize_payroll_run(
                "run_bench",
                create_workers(*worker_count),
                payment_date(),
            ))
            .expect("Failed to record filing");

        group.throughput(Throughput::Elements(*worker_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(worker_count),
            &submission.id,
            |b, id| {
                let manager = &manager;
                b.to_async(&rt).iter(|| async move {
                    let result = manager.validate(black_box(*id)).await;
                    assert!(result.can_submit);
                    result
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_validate_worker_record,
    bench_build_filing,
    bench_validate_submission
);
criterion_main!(benches);
