//! Host-side record types
//!
//! Owned, independently-lived copies of the three entity kinds a native
//! engine emits. Every field is optional because every native field carries
//! its own validity flag: `None` means the engine did not provide the field,
//! `Some(String::new())` means it provided an empty one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used for every OFX date
pub type Timestamp = DateTime<Utc>;

/// Kind of account, in the order libofx enumerates them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    MoneyMarket,
    CreditLine,
    Cma,
    CreditCard,
    Investment,
}

impl AccountType {
    const ALL: [AccountType; 7] = [
        AccountType::Checking,
        AccountType::Savings,
        AccountType::MoneyMarket,
        AccountType::CreditLine,
        AccountType::Cma,
        AccountType::CreditCard,
        AccountType::Investment,
    ];

    /// Look up a native discriminant
    pub fn from_native(value: i32) -> Option<Self> {
        usize::try_from(value).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Native discriminant of this type
    pub fn to_native(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
            AccountType::MoneyMarket => "MONEYMRKT",
            AccountType::CreditLine => "CREDITLINE",
            AccountType::Cma => "CMA",
            AccountType::CreditCard => "CREDITCARD",
            AccountType::Investment => "INVESTMENT",
        };
        write!(f, "{}", name)
    }
}

/// OFX transaction classification (TRNTYPE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
    Int,
    Div,
    Fee,
    SrvChg,
    Dep,
    Atm,
    Pos,
    Xfer,
    Check,
    Payment,
    Cash,
    DirectDep,
    DirectDebit,
    RepeatPmt,
    Other,
}

impl TransactionType {
    const ALL: [TransactionType; 17] = [
        TransactionType::Credit,
        TransactionType::Debit,
        TransactionType::Int,
        TransactionType::Div,
        TransactionType::Fee,
        TransactionType::SrvChg,
        TransactionType::Dep,
        TransactionType::Atm,
        TransactionType::Pos,
        TransactionType::Xfer,
        TransactionType::Check,
        TransactionType::Payment,
        TransactionType::Cash,
        TransactionType::DirectDep,
        TransactionType::DirectDebit,
        TransactionType::RepeatPmt,
        TransactionType::Other,
    ];

    pub fn from_native(value: i32) -> Option<Self> {
        usize::try_from(value).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn to_native(self) -> i32 {
        self as i32
    }
}

/// Investment transaction classification, in libofx's order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentTransactionType {
    BuyDebt,
    BuyMf,
    BuyOpt,
    BuyOther,
    BuyStock,
    ClosureOpt,
    Income,
    InvExpense,
    JrnlFund,
    JrnlSec,
    MarginInterest,
    Reinvest,
    RetOfCap,
    SellDebt,
    SellMf,
    SellOpt,
    SellOther,
    SellStock,
    Split,
    Transfer,
}

impl InvestmentTransactionType {
    const ALL: [InvestmentTransactionType; 20] = [
        InvestmentTransactionType::BuyDebt,
        InvestmentTransactionType::BuyMf,
        InvestmentTransactionType::BuyOpt,
        InvestmentTransactionType::BuyOther,
        InvestmentTransactionType::BuyStock,
        InvestmentTransactionType::ClosureOpt,
        InvestmentTransactionType::Income,
        InvestmentTransactionType::InvExpense,
        InvestmentTransactionType::JrnlFund,
        InvestmentTransactionType::JrnlSec,
        InvestmentTransactionType::MarginInterest,
        InvestmentTransactionType::Reinvest,
        InvestmentTransactionType::RetOfCap,
        InvestmentTransactionType::SellDebt,
        InvestmentTransactionType::SellMf,
        InvestmentTransactionType::SellOpt,
        InvestmentTransactionType::SellOther,
        InvestmentTransactionType::SellStock,
        InvestmentTransactionType::Split,
        InvestmentTransactionType::Transfer,
    ];

    pub fn from_native(value: i32) -> Option<Self> {
        usize::try_from(value).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn to_native(self) -> i32 {
        self as i32
    }
}

/// What a correcting transaction does to the one named by `fi_id_corrected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionAction {
    Delete,
    Replace,
}

impl CorrectionAction {
    pub fn from_native(value: i32) -> Option<Self> {
        match value {
            0 => Some(CorrectionAction::Delete),
            1 => Some(CorrectionAction::Replace),
            _ => None,
        }
    }

    pub fn to_native(self) -> i32 {
        self as i32
    }
}

/// One statement (reporting period) of an account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub account_id: Option<String>,
    /// ISO 4217 code all following transaction amounts are expressed in
    pub currency: Option<String>,
    pub ledger_balance: Option<f64>,
    pub ledger_balance_date: Option<Timestamp>,
    pub available_balance: Option<f64>,
    pub available_balance_date: Option<Timestamp>,
    pub date_start: Option<Timestamp>,
    pub date_end: Option<Timestamp>,
    pub marketing_info: Option<String>,
}

/// A financial account as identified by the institution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub account_type: Option<AccountType>,
    pub currency: Option<String>,
    pub account_number: Option<String>,
    pub bank_id: Option<String>,
    pub broker_id: Option<String>,
    pub branch_id: Option<String>,
}

/// Security referenced by an investment transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub unique_id: Option<String>,
    /// Usually "CUSIP"
    pub unique_id_type: Option<String>,
    pub secname: Option<String>,
    pub ticker: Option<String>,
    pub unit_price: Option<f64>,
    pub date_unit_price: Option<Timestamp>,
    pub currency: Option<String>,
    pub memo: Option<String>,
}

/// A single ledger entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub account_id: Option<String>,
    /// Institution-assigned id, used by hosts for de-duplication
    pub fi_id: Option<String>,
    /// `fi_id` of the earlier transaction this one corrects
    pub fi_id_corrected: Option<String>,
    pub fi_id_correction_action: Option<CorrectionAction>,
    pub transaction_type: Option<TransactionType>,
    pub investment_type: Option<InvestmentTransactionType>,
    pub standard_industrial_code: Option<i64>,
    pub date_posted: Option<Timestamp>,
    pub date_initiated: Option<Timestamp>,
    pub date_funds_available: Option<Timestamp>,
    pub date_payout: Option<Timestamp>,
    pub amount: Option<f64>,
    pub units: Option<f64>,
    pub unit_price: Option<f64>,
    pub fees: Option<f64>,
    pub commission: Option<f64>,
    /// Split ratio: units held before and after
    pub old_units: Option<f64>,
    pub new_units: Option<f64>,
    pub accrued_interest: Option<f64>,
    pub load: Option<f64>,
    pub markup: Option<f64>,
    pub markdown: Option<f64>,
    pub withholding: Option<f64>,
    pub taxes: Option<f64>,
    pub penalty: Option<f64>,
    pub name: Option<String>,
    pub memo: Option<String>,
    pub check_number: Option<String>,
    pub reference_number: Option<String>,
    pub payee_id: Option<String>,
    pub server_transaction_id: Option<String>,
    pub security: Option<Security>,
}

/// Any record a native engine can deliver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Statement(Statement),
    Account(Account),
    Transaction(Transaction),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Statement(_) => EntityKind::Statement,
            Entity::Account(_) => EntityKind::Account,
            Entity::Transaction(_) => EntityKind::Transaction,
        }
    }
}

/// The three record shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Statement,
    Account,
    Transaction,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Statement => write!(f, "statement"),
            EntityKind::Account => write!(f, "account"),
            EntityKind::Transaction => write!(f, "transaction"),
        }
    }
}
