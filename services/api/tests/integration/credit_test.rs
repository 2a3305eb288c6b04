use uuid::Uuid;

use hub_api::error::ApiServiceError;
use hub_api::usecase::credit::{AdjustCreditsInput, AdjustCreditsUseCase, MAX_ADJUST_AMOUNT};

use crate::helpers::{MockCreditRepo, admin};

fn adjust(amount: i64) -> AdjustCreditsInput {
    AdjustCreditsInput {
        amount,
        reason: "support refund".into(),
    }
}

#[tokio::test]
async fn should_apply_adjustment_within_bounds() {
    let user = Uuid::new_v4();
    let credits = MockCreditRepo::with_balance(user, 40);
    let uc = AdjustCreditsUseCase {
        credits: credits.clone(),
    };

    assert_eq!(uc.execute(admin(), user, adjust(MAX_ADJUST_AMOUNT)).await.unwrap(), 1_000_040);
    assert_eq!(uc.execute(admin(), user, adjust(-MAX_ADJUST_AMOUNT)).await.unwrap(), 40);
    assert_eq!(credits.balance_of(user), Some(40));
}

#[tokio::test]
async fn should_reject_out_of_range_amounts_before_touching_the_ledger() {
    let user = Uuid::new_v4();
    let credits = MockCreditRepo::with_balance(user, 40);
    let uc = AdjustCreditsUseCase {
        credits: credits.clone(),
    };

    for amount in [i64::MIN, i64::MAX, MAX_ADJUST_AMOUNT + 1, -MAX_ADJUST_AMOUNT - 1, 0] {
        assert!(
            matches!(
                uc.execute(admin(), user, adjust(amount)).await,
                Err(ApiServiceError::InvalidParams(_))
            ),
            "amount {amount} should be refused"
        );
    }
    assert_eq!(credits.adjust_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(credits.balance_of(user), Some(40));
}

#[tokio::test]
async fn should_not_drive_balance_below_zero() {
    let user = Uuid::new_v4();
    let uc = AdjustCreditsUseCase {
        credits: MockCreditRepo::with_balance(user, 40),
    };
    assert!(matches!(
        uc.execute(admin(), user, adjust(-41)).await,
        Err(ApiServiceError::InsufficientCredits)
    ));
    assert!(matches!(
        uc.execute(admin(), Uuid::new_v4(), adjust(5)).await,
        Err(ApiServiceError::UserNotFound)
    ));
}
