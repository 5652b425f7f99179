// ============================================================================
// Settlement Engine Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Fixed-Point - Parsing, rendering and precision conversion
// 2. Formula - Mixed-precision evaluation with and without a denominator
// 3. Settlement - Full waterfall across healthy and clamped inputs
// ============================================================================

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use settlement_engine::prelude::*;
use std::hint::black_box;

// ============================================================================
// Fixed-Point Benchmarks
// ============================================================================

fn benchmark_decimal_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimal_parsing");

    for input in ["1", "45000.123456789", "123456789012345678901234567890.123456789012345678"].iter() {
        group.bench_with_input(BenchmarkId::new("from_decimal_str", input.len()), input, |b, input| {
            b.iter(|| black_box(FixedPointValue::from_decimal_str(input, 18)))
        });
    }

    group.finish();
}

fn benchmark_precision_conversion(c: &mut Criterion) {
    let value = FixedPointValue::from_decimal_str("98765.4321", 18).unwrap_or_default();

    c.bench_function("convert_down_18_to_9", |b| {
        b.iter(|| black_box(value.convert_to(9)))
    });
    c.bench_function("convert_up_18_to_36", |b| {
        b.iter(|| black_box(value.convert_to(36)))
    });
    c.bench_function("to_decimal_string", |b| {
        b.iter(|| black_box(value.to_decimal_string()))
    });
}

// ============================================================================
// Formula Benchmarks
// ============================================================================

fn benchmark_formula(c: &mut Criterion) {
    let size = FixedPointValue::from_integer(3, 18);
    let price = Price::from_integer(45_000);
    let notional = UsdValue::from_integer(135_000);
    let rate = FixedPointValue::from_raw(5, 4);

    c.bench_function("formula_notional", |b| {
        b.iter(|| {
            black_box(
                Formula::first(size.clone())
                    .multiply_by(price.clone())
                    .calculate::<UsdDecimals>(),
            )
        })
    });

    c.bench_function("formula_average_price", |b| {
        b.iter(|| {
            black_box(
                Formula::first(notional.clone())
                    .divide_by(size.clone())
                    .and_then(|f| f.calculate::<PriceDecimals>()),
            )
        })
    });

    c.bench_function("formula_funding_payment", |b| {
        b.iter(|| {
            black_box(
                Formula::first(rate.clone())
                    .multiply_by(notional.clone())
                    .in_denominator(|f| f.value(FixedPointValue::from_integer(100, 0)))
                    .and_then(|f| f.calculate::<UsdDecimals>()),
            )
        })
    });

    let mut group = c.benchmark_group("formula_chain_length");
    for terms in [2usize, 8, 32].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(terms), terms, |b, &terms| {
            b.iter(|| {
                let formula = (1..terms).fold(Formula::first(size.clone()), |f, i| {
                    if i % 2 == 0 {
                        f.add(FixedPointValue::from_integer(1, 9))
                    } else {
                        f.subtract_by(FixedPointValue::from_integer(1, 6))
                    }
                });
                black_box(formula.evaluate(18))
            })
        });
    }
    group.finish();
}

// ============================================================================
// Settlement Benchmarks
// ============================================================================

fn benchmark_settlement(c: &mut Criterion) {
    let healthy = SettlementInput::new(UsdValue::from_integer(10_000), UsdValue::from_integer(1_000_000))
        .with_protocol_fee(UsdValue::from_integer(1))
        .with_liquidity_fee(UsdValue::from_integer(1))
        .with_funding_rate(UsdValue::from_integer(100), true)
        .with_pnl_delta(UsdValue::from_integer(500), true);

    let clamped = SettlementInput::new(UsdValue::from_integer(60), UsdValue::from_integer(70))
        .with_protocol_fee(UsdValue::from_integer(60))
        .with_liquidation_fee(UsdValue::from_integer(80))
        .with_funding_rate(UsdValue::from_integer(80), true)
        .with_pnl_delta(UsdValue::from_integer(60), true);

    let mut group = c.benchmark_group("settlement");
    for (name, input) in [("healthy", &healthy), ("clamped", &clamped)] {
        group.bench_with_input(BenchmarkId::new("settle", name), input, |b, input| {
            b.iter(|| black_box(input.settle()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_decimal_parsing,
    benchmark_precision_conversion,
    benchmark_formula,
    benchmark_settlement,
);
criterion_main!(benches);
