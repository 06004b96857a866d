use emi_engine::amortization::{emi, prepayment, schedule};
use emi_engine::types::LoanTerms;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loans() -> Vec<LoanTerms> {
    vec![
        LoanTerms::new(dec!(2500000), dec!(8.5), 240),
        LoanTerms::new(dec!(5000000), dec!(8.75), 360),
        LoanTerms::new(dec!(1000000), dec!(12), 120),
        LoanTerms::new(dec!(800000), dec!(9.5), 60),
        LoanTerms::new(dec!(300000), dec!(18), 36),
        LoanTerms::new(dec!(120000), Decimal::ZERO, 12),
        LoanTerms::new(dec!(99999), dec!(0.01), 7),
        LoanTerms::new(dec!(50000), dec!(36), 1),
    ]
}

// ===========================================================================
// EMI
// ===========================================================================

#[test]
fn test_emi_reference_values() {
    let cases = [
        (LoanTerms::new(dec!(2500000), dec!(8.5), 240), dec!(21696)),
        (LoanTerms::new(dec!(1000000), dec!(12), 120), dec!(14347)),
        (LoanTerms::new(dec!(500000), dec!(10), 60), dec!(10624)),
        (LoanTerms::new(dec!(120000), dec!(0), 12), dec!(10000)),
    ];
    for (terms, expected) in cases {
        let result = emi::compute_emi(&terms).unwrap();
        assert_eq!(result.monthly_installment, expected, "{terms:?}");
        assert_eq!(
            result.total_interest,
            result.total_payment - terms.principal,
            "{terms:?}"
        );
    }
}

#[test]
fn test_emi_envelope_metadata() {
    let out = emi::analyze_emi(&LoanTerms::new(dec!(120000), dec!(0), 12)).unwrap();
    assert_eq!(out.methodology, "EMI (zero-rate straight-line repayment)");
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert_eq!(out.result.monthly_installment, dec!(10000));
}

// ===========================================================================
// Schedule properties
// ===========================================================================

#[test]
fn test_schedule_length_and_final_balance() {
    for terms in loans() {
        let entries = schedule::generate_schedule(&terms).unwrap();
        assert_eq!(entries.len(), terms.tenure_months as usize, "{terms:?}");
        assert_eq!(entries.last().unwrap().remaining_balance, Decimal::ZERO, "{terms:?}");
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(e.month, i as u32 + 1);
        }
    }
}

#[test]
fn test_schedule_portions_sum_to_installment() {
    for terms in loans() {
        for e in schedule::generate_schedule(&terms).unwrap() {
            assert_eq!(e.principal_portion + e.interest_portion, e.installment, "{terms:?}");
        }
    }
}

#[test]
fn test_schedule_principal_sums_to_loan() {
    for terms in loans() {
        let entries = schedule::generate_schedule(&terms).unwrap();
        let repaid: Decimal = entries.iter().map(|e| e.principal_portion).sum();
        let drift = (repaid - terms.principal).abs();
        assert!(
            drift <= Decimal::from(terms.tenure_months),
            "{terms:?}: repaid {repaid}, drift {drift}"
        );
    }
}

#[test]
fn test_schedule_balance_non_increasing() {
    for terms in loans() {
        let entries = schedule::generate_schedule(&terms).unwrap();
        for pair in entries.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance, "{terms:?}");
        }
    }
}

#[test]
fn test_schedule_regular_months_pay_the_emi() {
    let terms = LoanTerms::new(dec!(2500000), dec!(8.5), 240);
    let entries = schedule::generate_schedule(&terms).unwrap();
    assert!(entries[..239].iter().all(|e| e.installment == dec!(21696)));
    assert_eq!(entries[0].interest_portion, dec!(17708));
    assert_eq!(entries[0].principal_portion, dec!(3988));
    assert_eq!(entries[0].remaining_balance, dec!(2496012));
    assert_eq!(entries[11].remaining_balance, dec!(2450239));
    // Rounding the EMI up leaves a slightly smaller last installment
    assert_eq!(entries[239].installment, dec!(21433));
}

#[test]
fn test_schedule_is_deterministic() {
    let terms = LoanTerms::new(dec!(5000000), dec!(8.75), 360);
    assert_eq!(
        schedule::generate_schedule(&terms).unwrap(),
        schedule::generate_schedule(&terms).unwrap()
    );
}

#[test]
fn test_preview_matches_full_schedule_prefix() {
    let terms = LoanTerms::new(dec!(1000000), dec!(12), 120);
    let full = schedule::generate_schedule(&terms).unwrap();
    let preview = schedule::schedule_preview(&terms, schedule::DEFAULT_PREVIEW_MONTHS).unwrap();
    assert_eq!(preview.as_slice(), &full[..12]);
}

#[test]
fn test_schedule_rejects_invalid_terms() {
    assert!(schedule::generate_schedule(&LoanTerms::new(dec!(0), dec!(10), 12)).is_err());
    assert!(schedule::generate_schedule(&LoanTerms::new(dec!(1000), dec!(10), 0)).is_err());
    assert!(schedule::generate_schedule(&LoanTerms::new(dec!(1000), dec!(-0.5), 12)).is_err());
}

#[test]
fn test_schedule_envelope_warns_past_tenure() {
    let input = schedule::ScheduleInput {
        terms: LoanTerms::new(dec!(100000), dec!(12), 12),
        months: Some(24),
    };
    let out = schedule::analyze_schedule(&input).unwrap();
    assert_eq!(out.result.months_shown, 12);
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Prepayment
// ===========================================================================

#[test]
fn test_full_prepayment_retires_at_apply_month() {
    for terms in loans() {
        let month = (terms.tenure_months / 2).max(1);
        let plan = prepayment::PrepaymentPlan {
            extra_amount: terms.principal * dec!(2),
            apply_at_month: month,
        };
        let outcome = prepayment::simulate_prepayment(&terms, &plan).unwrap();
        assert!(outcome.fully_retired, "{terms:?}");
        assert_eq!(outcome.revised_tenure_months, month, "{terms:?}");
        assert!(outcome.interest_saved >= Decimal::ZERO);
    }
}

#[test]
fn test_noop_prepayment() {
    for terms in loans() {
        let plan = prepayment::PrepaymentPlan {
            extra_amount: Decimal::ZERO,
            apply_at_month: 1,
        };
        let outcome = prepayment::simulate_prepayment(&terms, &plan).unwrap();
        assert_eq!(outcome.revised_tenure_months, terms.tenure_months);
        assert_eq!(outcome.interest_saved, Decimal::ZERO);
    }
}

#[test]
fn test_partial_prepayment_shortens_tenure() {
    let terms = LoanTerms::new(dec!(1000000), dec!(12), 120);
    let plan = prepayment::PrepaymentPlan {
        extra_amount: dec!(200000),
        apply_at_month: 12,
    };
    let outcome = prepayment::simulate_prepayment(&terms, &plan).unwrap();
    assert_eq!(outcome.revised_tenure_months, 55);
    assert_eq!(outcome.interest_saved, dec!(732555));
    assert_eq!(outcome.balance_at_apply_month, dec!(944869));
    assert!(outcome.revised_tenure_months >= plan.apply_at_month);
}

#[test]
fn test_larger_prepayment_shortens_more() {
    let terms = LoanTerms::new(dec!(2500000), dec!(8.5), 240);
    let revised = |extra| {
        prepayment::simulate_prepayment(
            &terms,
            &prepayment::PrepaymentPlan {
                extra_amount: extra,
                apply_at_month: 12,
            },
        )
        .unwrap()
        .revised_tenure_months
    };
    assert_eq!(revised(dec!(100000)), 93);
    assert_eq!(revised(dec!(500000)), 82);
    assert!(revised(dec!(1000000)) < revised(dec!(500000)));
}

#[test]
fn test_home_loan_reference_prepayment() {
    let terms = LoanTerms::new(dec!(2500000), dec!(8.5), 240);
    let plan = prepayment::PrepaymentPlan {
        extra_amount: dec!(500000),
        apply_at_month: 12,
    };
    let outcome = prepayment::simulate_prepayment(&terms, &plan).unwrap();
    assert_eq!(outcome.revised_tenure_months, 82);
    assert_eq!(outcome.interest_saved, dec!(2927968));
    // I*T - (I*A + extra + I*n) with n = revised - A
    let installment = dec!(21696);
    let n = Decimal::from(outcome.revised_tenure_months - plan.apply_at_month);
    assert_eq!(
        outcome.interest_saved,
        installment * dec!(240) - (installment * dec!(12) + plan.extra_amount + installment * n)
    );
}

#[test]
fn test_extreme_terms_fail_without_panicking() {
    let terms = LoanTerms::new(dec!(1000000000000000000000000000), dec!(1000), 480);
    assert!(matches!(
        emi::compute_emi(&terms),
        Err(emi_engine::EngineError::Overflow { .. })
    ));
    let runaway = LoanTerms::new(dec!(0.000001), dec!(1000000), 360);
    assert!(schedule::generate_schedule(&runaway).is_err());
}

// ===========================================================================
// Progress
// ===========================================================================

#[test]
fn test_progress_matches_schedule_row() {
    let terms = LoanTerms::new(dec!(2500000), dec!(8.5), 240);
    let progress = schedule::repayment_progress(&terms, 12).unwrap();
    assert_eq!(progress.outstanding_balance, dec!(2450239));
    assert_eq!(progress.amount_paid, dec!(21696) * dec!(12));
    assert_eq!(
        progress.principal_paid + progress.interest_paid,
        progress.amount_paid
    );
    assert_eq!(progress.total_payments, 240);
}
