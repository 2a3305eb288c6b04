//! Credit ledger kinds and the purchasable packages.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reason recorded on every ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTxKind {
    Purchase,
    Unlock,
    Sale,
    AdminAdjust,
    SignupBonus,
}

impl CreditTxKind {
    pub const ALL: [CreditTxKind; 5] = [
        Self::Purchase,
        Self::Unlock,
        Self::Sale,
        Self::AdminAdjust,
        Self::SignupBonus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Unlock => "unlock",
            Self::Sale => "sale",
            Self::AdminAdjust => "admin_adjust",
            Self::SignupBonus => "signup_bonus",
        }
    }
}

impl FromStr for CreditTxKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|k| k.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: &'static str,
    pub credits: i64,
    pub price_cents: i64,
}

pub const CREDIT_PACKAGES: [CreditPackage; 3] = [
    CreditPackage {
        id: "starter",
        credits: 100,
        price_cents: 990,
    },
    CreditPackage {
        id: "standard",
        credits: 550,
        price_cents: 4990,
    },
    CreditPackage {
        id: "pro",
        credits: 1200,
        price_cents: 9990,
    },
];

pub fn find_package(id: &str) -> Option<CreditPackage> {
    CREDIT_PACKAGES.into_iter().find(|p| p.id == id)
}
