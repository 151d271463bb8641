//! Savings balance reconciliation
//!
//! Every transaction mutation may move money into or out of a savings
//! category's running balance:
//!
//! - a checking transaction against a savings-type budget item **funds**
//!   the item's category
//! - a savings transaction **spends** from its category
//!
//! This module is the pure planning half: it turns the facts of a
//! transaction (before and after a mutation) into a list of signed
//! [`BalanceEffect`]s. Effects are applied one by one through
//! `SavingsBalanceRepo`, each as a single atomic upsert that keeps
//! `available_balance = funded_amount - spent_amount`.
//!
//! Ordering matters on update: the reversal of the old state is emitted
//! before the effect of the new state, so an account-type change reverses
//! one side of the balance and applies the other.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The two transaction account types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            other => Err(format!(
                "Invalid account type '{}', expected 'checking' or 'savings'",
                other
            )),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reconciliation-relevant facts of one transaction state.
///
/// `savings_category` is the savings category the transaction touches:
/// for a checking transaction, the budget item's category when (and only
/// when) the item is savings-typed; for a savings transaction, the
/// category it spends from. `None` means the transaction has no effect on
/// any balance.
#[derive(Debug, Clone, Copy)]
pub struct TransactionFacts {
    pub account_type: AccountType,
    pub amount: Decimal,
    pub savings_category: Option<Uuid>,
}

/// A signed delta against one savings category balance.
/// Negative amounts are reversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEffect {
    /// Add to funded_amount
    Funding { category_id: Uuid, amount: Decimal },
    /// Add to spent_amount
    Spending { category_id: Uuid, amount: Decimal },
}

impl BalanceEffect {
    pub fn category_id(&self) -> Uuid {
        match self {
            Self::Funding { category_id, .. } | Self::Spending { category_id, .. } => *category_id,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Funding { amount, .. } | Self::Spending { amount, .. } => *amount,
        }
    }
}

/// Plan the effect of creating a transaction: zero or one effect.
pub fn plan_create(facts: &TransactionFacts) -> Vec<BalanceEffect> {
    effect_of(facts).into_iter().collect()
}

/// Plan the effects of updating a transaction: the reversal of the old
/// state first, then the effect of the new state. An account-type change
/// reverses one kind of effect and applies the other.
pub fn plan_update(old: &TransactionFacts, new: &TransactionFacts) -> Vec<BalanceEffect> {
    let mut effects = Vec::with_capacity(2);
    effects.extend(reversal_of(old));
    effects.extend(effect_of(new));
    effects
}

/// Plan the effect of soft-deleting a transaction: the reversal only.
pub fn plan_delete(facts: &TransactionFacts) -> Vec<BalanceEffect> {
    reversal_of(facts).into_iter().collect()
}

fn effect_of(facts: &TransactionFacts) -> Option<BalanceEffect> {
    let category_id = facts.savings_category?;
    match facts.account_type {
        AccountType::Checking => Some(BalanceEffect::Funding {
            category_id,
            amount: facts.amount,
        }),
        AccountType::Savings => Some(BalanceEffect::Spending {
            category_id,
            amount: facts.amount,
        }),
    }
}

fn reversal_of(facts: &TransactionFacts) -> Option<BalanceEffect> {
    effect_of(facts).map(|effect| match effect {
        BalanceEffect::Funding {
            category_id,
            amount,
        } => BalanceEffect::Funding {
            category_id,
            amount: -amount,
        },
        BalanceEffect::Spending {
            category_id,
            amount,
        } => BalanceEffect::Spending {
            category_id,
            amount: -amount,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    /// In-memory stand-in for the savings balance table
    #[derive(Debug, Default)]
    struct BalanceBook {
        funded: HashMap<Uuid, Decimal>,
        spent: HashMap<Uuid, Decimal>,
    }

    impl BalanceBook {
        fn apply(&mut self, effects: &[BalanceEffect]) {
            for effect in effects {
                match effect {
                    BalanceEffect::Funding {
                        category_id,
                        amount,
                    } => *self.funded.entry(*category_id).or_default() += amount,
                    BalanceEffect::Spending {
                        category_id,
                        amount,
                    } => *self.spent.entry(*category_id).or_default() += amount,
                }
            }
        }

        fn available(&self, category_id: Uuid) -> Decimal {
            self.funded.get(&category_id).copied().unwrap_or_default()
                - self.spent.get(&category_id).copied().unwrap_or_default()
        }

        fn assert_invariant(&self) {
            for (category_id, funded) in &self.funded {
                let spent = self.spent.get(category_id).copied().unwrap_or_default();
                assert_eq!(self.available(*category_id), funded - spent);
            }
        }
    }

    fn checking_funding(category: Uuid, amount: Decimal) -> TransactionFacts {
        TransactionFacts {
            account_type: AccountType::Checking,
            amount,
            savings_category: Some(category),
        }
    }

    fn checking_plain(amount: Decimal) -> TransactionFacts {
        TransactionFacts {
            account_type: AccountType::Checking,
            amount,
            savings_category: None,
        }
    }

    fn savings_spending(category: Uuid, amount: Decimal) -> TransactionFacts {
        TransactionFacts {
            account_type: AccountType::Savings,
            amount,
            savings_category: Some(category),
        }
    }

    #[test]
    fn test_create_checking_funds_savings_category() {
        let category = Uuid::new_v4();
        let effects = plan_create(&checking_funding(category, dec!(200)));
        assert_eq!(
            effects,
            vec![BalanceEffect::Funding {
                category_id: category,
                amount: dec!(200)
            }]
        );
    }

    #[test]
    fn test_create_checking_against_cash_item_has_no_effect() {
        let effects = plan_create(&checking_plain(dec!(45.50)));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_create_savings_spends() {
        let category = Uuid::new_v4();
        let effects = plan_create(&savings_spending(category, dec!(80)));
        assert_eq!(
            effects,
            vec![BalanceEffect::Spending {
                category_id: category,
                amount: dec!(80)
            }]
        );
    }

    #[test]
    fn test_delete_reverses_effect() {
        let category = Uuid::new_v4();
        let mut book = BalanceBook::default();

        let facts = checking_funding(category, dec!(300));
        book.apply(&plan_create(&facts));
        assert_eq!(book.available(category), dec!(300));

        book.apply(&plan_delete(&facts));
        assert_eq!(book.available(category), dec!(0));
        book.assert_invariant();
    }

    #[test]
    fn test_update_amount_change() {
        let category = Uuid::new_v4();
        let mut book = BalanceBook::default();

        let old = checking_funding(category, dec!(100));
        book.apply(&plan_create(&old));

        let new = checking_funding(category, dec!(150));
        book.apply(&plan_update(&old, &new));

        assert_eq!(book.available(category), dec!(150));
        book.assert_invariant();
    }

    #[test]
    fn test_update_reversal_comes_first() {
        let category = Uuid::new_v4();
        let old = checking_funding(category, dec!(100));
        let new = checking_funding(category, dec!(150));

        let effects = plan_update(&old, &new);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].amount(), dec!(-100));
        assert_eq!(effects[1].amount(), dec!(150));
    }

    #[test]
    fn test_update_account_type_change_swaps_sides() {
        // A funding transaction edited into a spending one must reverse the
        // funded side and apply the spent side.
        let category = Uuid::new_v4();
        let mut book = BalanceBook::default();

        let old = checking_funding(category, dec!(500));
        book.apply(&plan_create(&old));

        let new = savings_spending(category, dec!(500));
        let effects = plan_update(&old, &new);
        assert!(matches!(effects[0], BalanceEffect::Funding { amount, .. } if amount == dec!(-500)));
        assert!(matches!(effects[1], BalanceEffect::Spending { amount, .. } if amount == dec!(500)));

        book.apply(&effects);
        assert_eq!(book.funded[&category], dec!(0));
        assert_eq!(book.spent[&category], dec!(500));
        assert_eq!(book.available(category), dec!(-500));
        book.assert_invariant();
    }

    #[test]
    fn test_update_category_change_moves_balance() {
        let vacation = Uuid::new_v4();
        let emergency = Uuid::new_v4();
        let mut book = BalanceBook::default();

        let old = checking_funding(vacation, dec!(250));
        book.apply(&plan_create(&old));

        let new = checking_funding(emergency, dec!(250));
        book.apply(&plan_update(&old, &new));

        assert_eq!(book.available(vacation), dec!(0));
        assert_eq!(book.available(emergency), dec!(250));
        book.assert_invariant();
    }

    #[test]
    fn test_update_from_plain_checking_gains_effect() {
        let category = Uuid::new_v4();
        let mut book = BalanceBook::default();

        let old = checking_plain(dec!(60));
        book.apply(&plan_create(&old));

        let new = checking_funding(category, dec!(60));
        book.apply(&plan_update(&old, &new));

        assert_eq!(book.available(category), dec!(60));
        book.assert_invariant();
    }

    #[test]
    fn test_invariant_over_mixed_sequence() {
        let category = Uuid::new_v4();
        let mut book = BalanceBook::default();

        let fund_a = checking_funding(category, dec!(1000));
        let fund_b = checking_funding(category, dec!(500));
        let spend = savings_spending(category, dec!(300));

        book.apply(&plan_create(&fund_a));
        book.apply(&plan_create(&fund_b));
        book.apply(&plan_create(&spend));
        assert_eq!(book.available(category), dec!(1200));

        // edit the spend up, delete one funding
        let spend_edited = savings_spending(category, dec!(450));
        book.apply(&plan_update(&spend, &spend_edited));
        book.apply(&plan_delete(&fund_b));

        assert_eq!(book.funded[&category], dec!(1000));
        assert_eq!(book.spent[&category], dec!(450));
        assert_eq!(book.available(category), dec!(550));
        book.assert_invariant();
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("checking".parse::<AccountType>().unwrap(), AccountType::Checking);
        assert_eq!("savings".parse::<AccountType>().unwrap(), AccountType::Savings);
        assert!("credit".parse::<AccountType>().is_err());
    }
}
