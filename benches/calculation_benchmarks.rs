//! Performance benchmarks for the Benefit Calculation Engine.
//!
//! Measures the full recalculation cycle (strategy selection, merging,
//! partitioning, row building and instalment splitting):
//! - Salary benefit over a single range: < 20μs mean
//! - Salary benefit over several sub-ranges: < 50μs mean
//! - Batch of 1000 mixed applications: < 50ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use benefit_engine::calculation::BenefitCalculator;
use benefit_engine::config::ConfigLoader;
use benefit_engine::models::{
    Application, ApplicationStatus, BenefitType, Employment, PaySubsidy, StateAidMaxPercentage,
    TrainingCompensation,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn create_calculator() -> BenefitCalculator {
    let config = ConfigLoader::load("./config").expect("Failed to load config");
    BenefitCalculator::new(config.into_config())
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).expect("valid date")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
}

/// Creates a salary benefit application in handling with `subsidies` pay
/// subsidy periods spread over the year.
fn create_salary_application(subsidies: usize) -> Application {
    let mut application = Application::new(
        Some(BenefitType::SalaryBenefit),
        Employment {
            monthly_pay: Some(Decimal::from(2400)),
            vacation_money: Some(Decimal::from(200)),
            other_expenses: Some(Decimal::from(150)),
            start_date: Some(date(1, 1)),
            end_date: Some(date(12, 31)),
        },
    );
    application
        .set_status(ApplicationStatus::Handling)
        .expect("draft can move to handling");
    if let Some(calculation) = application.calculation.as_mut() {
        calculation.state_aid_max_percentage = Some(StateAidMaxPercentage::Hundred);
    }

    let percents = [50, 70, 100];
    for i in 0..subsidies {
        let month = (i as u32 * 2) % 12 + 1;
        application.pay_subsidies.push(PaySubsidy::new(
            date(month, 1),
            date(month, 28),
            percents[i % percents.len()],
        ));
    }
    if subsidies > 0 {
        application.training_compensations.push(TrainingCompensation {
            start_date: date(3, 15),
            end_date: date(9, 15),
            monthly_amount: Decimal::from(250),
        });
    }
    application
}

/// Benchmark: Salary benefit without deductions.
///
/// Target: < 20μs mean
fn bench_single_range(c: &mut Criterion) {
    let calculator = create_calculator();
    let application = create_salary_application(0);

    c.bench_function("salary_benefit_single_range", |b| {
        b.iter(|| {
            let mut application = application.clone();
            let outcome = calculator.calculate_on(&mut application, false, today());
            black_box(outcome)
        })
    });
}

/// Benchmark: Salary benefit split by subsidies and training compensation.
///
/// Target: < 50μs mean
fn bench_sub_ranges(c: &mut Criterion) {
    let calculator = create_calculator();
    let mut group = c.benchmark_group("salary_benefit_sub_ranges");

    for subsidies in [1usize, 2, 5] {
        let application = create_salary_application(subsidies);
        group.bench_with_input(
            BenchmarkId::from_parameter(subsidies),
            &application,
            |b, application| {
                b.iter(|| {
                    let mut application = application.clone();
                    let outcome = calculator.calculate_on(&mut application, false, today());
                    black_box(outcome)
                })
            },
        );
    }
    group.finish();
}

/// Benchmark: Batch of 1000 applications of every benefit kind.
///
/// Target: < 50ms mean
fn bench_batch_1000(c: &mut Criterion) {
    let calculator = create_calculator();
    let applications: Vec<Application> = (0..1000)
        .map(|i| {
            let mut application = create_salary_application(i % 3);
            application.benefit_type = match i % 4 {
                0 => Some(BenefitType::EmployeeBenefit),
                1 => None,
                _ => Some(BenefitType::SalaryBenefit),
            };
            if i % 10 == 0 {
                if let Some(calculation) = application.calculation.as_mut() {
                    calculation.override_monthly_benefit_amount = Some(Decimal::from(700));
                }
            }
            application
        })
        .collect();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(1000));
    group.sample_size(20);
    group.bench_function("batch_1000", |b| {
        b.iter(|| {
            let mut results = Vec::with_capacity(applications.len());
            for application in &applications {
                let mut application = application.clone();
                results.push(calculator.calculate_on(&mut application, false, today()));
            }
            black_box(results)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_single_range,
    bench_sub_ranges,
    bench_batch_1000
);
criterion_main!(benches);
