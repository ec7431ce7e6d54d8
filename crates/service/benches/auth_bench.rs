use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use chrono::NaiveDate;
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::{AuthConfig, AuthService, PASSWORD_ALGORITHM};
use service::dashboard::aggregate::monthly_series;

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(
        repo,
        AuthConfig { jwt_secret: "bench-secret".into(), token_ttl_hours: 12, password_algorithm: PASSWORD_ALGORITHM.into() },
    );

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.register(RegisterInput { email: "bench@example.com".into(), name: "Bench".into(), password: "Benchmark1".into() }))
        .unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt
                .block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() }))
                .unwrap();
            svc.verify_token(&session.token).unwrap();
        });
    });
}

fn bench_monthly_series(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
    let entries: Vec<(NaiveDate, i64)> = (0..10_000i64).map(|i| (today - chrono::Duration::days(i % 400), 1_000 + i)).collect();
    c.bench_function("dashboard_monthly_series_10k", |b| {
        b.iter(|| monthly_series(entries.iter().copied(), today, 12));
    });
}

criterion_group!(benches, bench_login, bench_monthly_series);
criterion_main!(benches);
