use chrono::{TimeDelta, Utc};
use loanbook::application::registry::LoanRegistry;
use loanbook::domain::loan::{LoanConfig, LoanOptions, LoanStatus};
use loanbook::domain::ports::ClockBox;
use loanbook::error::LoanError;
use loanbook::infrastructure::clock::ManualClock;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn micro_loan(id: &str) -> LoanOptions {
    LoanOptions::new()
        .with_id(id)
        .with_config(LoanConfig::new(dec!(1000000), dec!(0.10), 50).unwrap())
}

#[test]
fn test_loan_lifecycle_over_simulated_weeks() {
    let clock = ManualClock::new(Utc::now());
    let registry = LoanRegistry::with_clock(Box::new(clock.clone()) as ClockBox);
    registry.create(micro_loan("loan1")).unwrap();

    // Weeks 0 and 1 paid on time
    registry.apply_payment("loan1", dec!(22000)).unwrap();
    clock.advance(TimeDelta::weeks(1));
    registry.apply_payment("loan1", dec!(22000)).unwrap();

    // Three weeks of silence
    clock.advance(TimeDelta::weeks(3));
    assert!(registry.is_delinquent("loan1").unwrap());
    assert_eq!(registry.status_of("loan1").unwrap(), LoanStatus::Delinquent);

    let err = registry.apply_payment("loan1", dec!(22000)).unwrap_err();
    assert!(matches!(err, LoanError::InsufficientPayment { missed: 3, .. }));

    registry.apply_payment("loan1", dec!(66000)).unwrap();
    assert_eq!(registry.status_of("loan1").unwrap(), LoanStatus::Active);
    assert_eq!(registry.outstanding_of("loan1").unwrap(), dec!(990000));

    let loan = registry.get("loan1").unwrap();
    let paid_at: Vec<_> = loan.payments().iter().map(|p| p.paid_at).collect();
    assert!(paid_at.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(registry.billing_schedule_of("loan1").unwrap().len(), 50);
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(LoanRegistry::new());
    for i in 0..16 {
        registry.create(micro_loan(&format!("loan{i}"))).unwrap();
    }

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let id = format!("loan{i}");
                for _ in 0..5 {
                    registry.apply_payment(&id, dec!(22000)).unwrap();
                    registry.outstanding_of(&id).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for loan in registry.snapshot() {
        assert_eq!(loan.payments().len(), 5);
        assert_eq!(loan.outstanding(), dec!(990000));
    }
}

#[tokio::test]
async fn test_registry_usable_from_tasks() {
    let registry = Arc::new(LoanRegistry::new());

    let creator = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.create(micro_loan("task-loan")).map(|_| ()) })
    };
    creator.await.unwrap().unwrap();

    let payer = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move { registry.apply_payment("task-loan", dec!(22000)) })
    };
    payer.await.unwrap().unwrap();

    assert_eq!(registry.outstanding_of("task-loan").unwrap(), dec!(1078000));
}
