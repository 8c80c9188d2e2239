use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use shipcheck::domain::rule::ValueConditions;
use shipcheck::domain::{
    ComplianceRule, RestrictedCountry, RestrictedItem, RuleDraft, Severity, Shipment,
};
use shipcheck::engine::{evaluate, BatchRunner};
use shipcheck::rules::{RestrictedItemCheck, RuleSet, ShipmentCheck, ValueThresholdCheck};

fn rule(rule_type: &str, product: Option<&str>, conditions: serde_json::Value) -> ComplianceRule {
    ComplianceRule::from_draft(
        Uuid::new_v4(),
        RuleDraft {
            rule_name: None,
            rule_type: rule_type.to_string(),
            product_name: product.map(str::to_string),
            rule_conditions: conditions,
            description: None,
            source_link: None,
            last_verified: None,
            is_active: true,
        },
    )
}

fn restricted_items(count: usize) -> Vec<RestrictedItem> {
    (0..count)
        .map(|i| RestrictedItem {
            id: Uuid::new_v4(),
            item_name: format!("restricted-good-{}", i),
            severity: if i % 2 == 0 {
                Severity::Prohibited
            } else {
                Severity::Restricted
            },
            category: "Bench".to_string(),
            description: "Synthetic entry".to_string(),
            requirements: None,
            source_link: None,
            effective_date: None,
        })
        .collect()
}

fn countries() -> Vec<RestrictedCountry> {
    ["IR", "KP", "CU", "SY", "RU"]
        .iter()
        .map(|code| RestrictedCountry {
            id: Uuid::new_v4(),
            country_code: code.to_string(),
            country_name: String::new(),
            restriction_level: "EMBARGO".to_string(),
            restriction_reason: None,
        })
        .collect()
}

fn rules(products: usize) -> Vec<ComplianceRule> {
    let mut rules = vec![
        rule("VALUE", None, json!({ "threshold": 2500 })),
        rule("WEIGHT", None, json!({ "max_weight": 30, "unit": "kg" })),
    ];
    for i in 0..products {
        rules.push(rule(
            "TARIFF",
            Some(&format!("product-{}", i)),
            json!({ "to_countries": ["US", "CA"], "tariff_rate": "10%" }),
        ));
    }
    rules
}

fn shipment() -> Shipment {
    Shipment::new("Cotton T-Shirts", "DE")
        .with_value(Decimal::new(1200, 0))
        .with_weight(Decimal::new(5, 0))
        .with_origin("US")
}

fn bench_value_check(c: &mut Criterion) {
    let check = ValueThresholdCheck::new(
        "value",
        ValueConditions {
            threshold: Some(Decimal::new(2500, 0)),
            currency: None,
            documentation_required: Vec::new(),
        },
    );
    let shipment = shipment();

    c.bench_function("value_check_below_threshold", |b| {
        b.iter(|| check.evaluate(black_box(&shipment)))
    });
}

fn bench_restricted_item_miss(c: &mut Criterion) {
    let check = RestrictedItemCheck::new("items", restricted_items(1000));
    let shipment = shipment();

    c.bench_function("restricted_item_check_miss_1000", |b| {
        b.iter(|| check.evaluate(black_box(&shipment)))
    });
}

fn bench_full_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_evaluation");

    for products in [0usize, 10, 100] {
        let rules = rules(products);
        let countries = countries();
        let items = restricted_items(200);
        let shipment = shipment();

        group.bench_with_input(BenchmarkId::from_parameter(products), &products, |b, _| {
            b.iter(|| {
                evaluate(
                    black_box(&shipment),
                    black_box(&rules),
                    black_box(&countries),
                    black_box(&items),
                )
            })
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let ruleset = Arc::new(RuleSet::build(&rules(10), &countries(), &restricted_items(200)));
    let shipments: Vec<Shipment> = (0..500).map(|_| shipment()).collect();
    let runner = BatchRunner::default();

    c.bench_function("batch_500_shipments", |b| {
        b.to_async(&runtime).iter(|| {
            runner.run(Arc::clone(&ruleset), black_box(shipments.clone()))
        })
    });
}

criterion_group!(
    benches,
    bench_value_check,
    bench_restricted_item_miss,
    bench_full_evaluation,
    bench_batch,
);
criterion_main!(benches);
