//! Turning parsed OFX entities into host transactions
//!
//! [`ImportCallbacks`] is the host side of a parse: it receives each entity
//! from the bridge, validates it against the securities table and builds an
//! [`OfxImport`]. The first problem it finds is kept and the parse is aborted;
//! everything imported up to that point is discarded by [`ImportCallbacks::finish`].

use ofx_bridge::{
    Account, AccountType, BridgeError, HostCallbacks, ParseOutcome, ParseReport, Statement,
    Status, Timestamp, Transaction,
};
use serde::Serialize;
use thiserror::Error;

use crate::securities::{decimal, format_amount, Security, SecurityTable, SecurityType};

/// Reasons an import is rejected
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("OFX account ID invalid")]
    AccountIdInvalid,

    #[error("OFX account type invalid")]
    AccountTypeInvalid,

    #[error("OFX account currency invalid")]
    AccountCurrencyInvalid,

    #[error("Security not found: {0}")]
    SecurityNotFound(String),

    #[error("OFX transaction amount invalid")]
    TransactionAmountInvalid,

    #[error("OFX transaction received before its account")]
    AccountMissing,

    #[error("OFX security ticker invalid")]
    SecurityTickerInvalid,

    #[error("Failed to find OFX transaction security: {0}")]
    TransactionSecurityNotFound(String),

    #[error("OFX transaction security CUSIP failed to validate")]
    CusipMismatch,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{0}")]
    Input(String),

    #[error("OFX bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("OFX parser failed with status {0}")]
    ParseFailed(i32),

    #[error("No OFX transactions found")]
    NoTransactions,
}

/// Host account classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostAccountType {
    Bank,
    Liability,
    Investment,
}

impl From<AccountType> for HostAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Checking
            | AccountType::Savings
            | AccountType::MoneyMarket
            | AccountType::Cma => HostAccountType::Bank,
            AccountType::CreditLine | AccountType::CreditCard => HostAccountType::Liability,
            AccountType::Investment => HostAccountType::Investment,
        }
    }
}

/// The account an import is booked against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedAccount {
    pub account_id: i64,
    pub external_account_id: String,
    pub name: String,
    pub account_type: Option<HostAccountType>,
    pub security_id: Option<i64>,
}

/// One leg of a transaction
///
/// A split either moves money in the imported account (`account_id` set) or
/// moves units of a security (`security_id` set).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Split {
    pub account_id: Option<i64>,
    pub security_id: Option<i64>,
    pub number: String,
    pub memo: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportedTransaction {
    pub description: String,
    pub date: Option<Timestamp>,
    /// Institution-assigned id, used to spot duplicates on re-import
    pub remote_id: String,
    pub splits: Vec<Split>,
}

/// Result of importing one OFX document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfxImport {
    pub account: ImportedAccount,
    pub transactions: Vec<ImportedTransaction>,
    pub total_transactions: usize,
    pub beginning_balance: Option<String>,
    pub ending_balance: Option<String>,
}

/// Host callbacks building an [`OfxImport`]
pub struct ImportCallbacks<'s> {
    securities: &'s SecurityTable,
    account: ImportedAccount,
    transactions: Vec<ImportedTransaction>,
    ending_balance: Option<String>,
    error: Option<ImportError>,
}

impl<'s> ImportCallbacks<'s> {
    pub fn new(account_id: i64, securities: &'s SecurityTable) -> Self {
        Self {
            securities,
            account: ImportedAccount {
                account_id,
                external_account_id: String::new(),
                name: String::new(),
                account_type: None,
                security_id: None,
            },
            transactions: Vec::new(),
            ending_balance: None,
            error: None,
        }
    }

    /// First error recorded so far
    pub fn error(&self) -> Option<&ImportError> {
        self.error.as_ref()
    }

    /// Settle the import once the parse returned
    pub fn finish(self, report: ParseReport) -> Result<OfxImport, ImportError> {
        if self.transactions.is_empty() {
            return Err(ImportError::NoTransactions);
        }
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(failure) = report.failure {
            return Err(failure.into());
        }
        if let ParseOutcome::ParseError(status) = report.outcome {
            return Err(ImportError::ParseFailed(status));
        }

        Ok(OfxImport {
            account: self.account,
            total_transactions: self.transactions.len(),
            transactions: self.transactions,
            beginning_balance: None,
            ending_balance: self.ending_balance,
        })
    }

    fn reject(&mut self, error: ImportError) -> Status {
        match &self.error {
            None => {
                log::debug!("Import rejected: {}", error);
                self.error = Some(error);
            }
            Some(first) => log::trace!("Ignoring '{}' after '{}'", error, first),
        }
        Status::Abort
    }

    fn account_security(&self) -> Result<&'s Security, ImportError> {
        let securities: &'s SecurityTable = self.securities;
        self.account
            .security_id
            .and_then(|id| securities.by_id(id))
            .ok_or(ImportError::AccountMissing)
    }

    fn import_account(&mut self, account: Account) -> Result<(), ImportError> {
        let account_id = account.account_id.ok_or(ImportError::AccountIdInvalid)?;
        self.account.name = account.account_name.unwrap_or_default();
        self.account.external_account_id = account_id;

        let account_type = account.account_type.ok_or(ImportError::AccountTypeInvalid)?;
        self.account.account_type = Some(account_type.into());

        let currency = account.currency.ok_or(ImportError::AccountCurrencyInvalid)?;
        let security = self.securities.by_name(&currency)?;
        self.account.security_id = Some(security.security_id);
        log::debug!(
            "Account {} ({}) in {}",
            self.account.external_account_id,
            account_type,
            security.name
        );
        Ok(())
    }

    fn import_transaction(&self, tx: Transaction) -> Result<ImportedTransaction, ImportError> {
        let mut imported = ImportedTransaction {
            description: tx.name.unwrap_or_default(),
            date: tx.date_posted.or(tx.date_initiated),
            remote_id: tx.fi_id.unwrap_or_default(),
            splits: Vec::new(),
        };

        let amount = tx.amount.ok_or(ImportError::TransactionAmountInvalid)?;
        let account_security = self.account_security()?;
        let amount = decimal(amount)?;
        imported.splits.push(Split {
            account_id: Some(self.account.account_id),
            security_id: None,
            number: tx.check_number.unwrap_or_default(),
            memo: tx.memo.unwrap_or_default(),
            amount: format_amount(&amount, account_security.precision),
        });

        let fees = tx.fees.map(decimal).transpose()?;
        let commission = tx.commission.map(decimal).transpose()?;

        let (units, security) = match tx.units {
            Some(units) => {
                let security = match &tx.security {
                    Some(data) => {
                        let ticker = data
                            .ticker
                            .as_deref()
                            .ok_or(ImportError::SecurityTickerInvalid)?;
                        let security = self.securities.by_name(ticker).map_err(|_| {
                            ImportError::TransactionSecurityNotFound(ticker.to_string())
                        })?;
                        let cusip = match (&data.unique_id, data.unique_id_type.as_deref()) {
                            (Some(id), Some("CUSIP")) => Some(id),
                            _ => None,
                        };
                        if let Some(cusip) = cusip {
                            if security.security_type == SecurityType::Stock
                                && &security.alternate_id != cusip
                            {
                                return Err(ImportError::CusipMismatch);
                            }
                        }
                        security
                    }
                    None => account_security,
                };
                (decimal(units)?, security)
            }
            None => {
                let mut units = amount.clone();
                if let Some(fees) = &fees {
                    units = units - fees;
                }
                if let Some(commission) = &commission {
                    units = units - commission;
                }
                units = -units;
                if let Some(price) = tx.unit_price.filter(|p| *p != 0.0) {
                    units = units / decimal(price)?;
                }
                (units, account_security)
            }
        };
        imported.splits.push(Split {
            account_id: None,
            security_id: Some(security.security_id),
            amount: format_amount(&units, security.precision),
            ..Default::default()
        });

        for (value, memo) in [(fees, "fees"), (commission, "commission")] {
            if let Some(value) = value {
                imported.splits.push(Split {
                    account_id: None,
                    security_id: Some(account_security.security_id),
                    memo: memo.to_string(),
                    amount: format_amount(&-value, account_security.precision),
                    ..Default::default()
                });
            }
        }

        Ok(imported)
    }

    /// Format the ledger balance in the account's or the statement's currency
    ///
    /// A statement never rejects the import: without a known precision the
    /// balance keeps its plain decimal rendering.
    fn ledger_balance(&self, statement: &Statement) -> Option<String> {
        let raw = statement.ledger_balance?;
        let balance = match decimal(raw) {
            Ok(balance) => balance,
            Err(e) => {
                log::warn!("Ignoring statement ledger balance: {}", e);
                return None;
            }
        };
        let precision = match self.account_security() {
            Ok(security) => Some(security.precision),
            Err(_) => statement
                .currency
                .as_deref()
                .and_then(|currency| self.securities.by_name(currency).ok())
                .map(|security| security.precision),
        };
        match precision {
            Some(precision) => Some(format_amount(&balance, precision)),
            None => {
                log::debug!(
                    "No precision known for statement currency {:?}, keeping balance as is",
                    statement.currency
                );
                Some(balance.to_string())
            }
        }
    }
}

impl HostCallbacks for ImportCallbacks<'_> {
    fn statement(&mut self, statement: Statement) -> Status {
        if let Some(balance) = self.ledger_balance(&statement) {
            self.ending_balance = Some(balance);
        }
        Status::Continue
    }

    fn account(&mut self, account: Account) -> Status {
        match self.import_account(account) {
            Ok(()) => Status::Continue,
            Err(e) => self.reject(e),
        }
    }

    fn transaction(&mut self, transaction: Transaction) -> Status {
        match self.import_transaction(transaction) {
            Ok(imported) => {
                self.transactions.push(imported);
                Status::Continue
            }
            Err(e) => self.reject(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofx_bridge::{parse, Entity, ReplayEngine, Security as OfxSecurity};

    fn securities() -> SecurityTable {
        let mut list = vec![];
        for (id, name, precision, ty, alt) in [
            (1, "USD", 2, SecurityType::Currency, "840"),
            (2, "VTI", 4, SecurityType::Stock, "922908769"),
            (3, "JPY", 0, SecurityType::Currency, "392"),
        ] {
            list.push(Security {
                security_id: id,
                name: name.to_string(),
                description: String::new(),
                symbol: name.to_string(),
                precision,
                security_type: ty,
                alternate_id: alt.to_string(),
            });
        }
        SecurityTable::new(list)
    }

    fn account(account_type: AccountType) -> Account {
        Account {
            account_id: Some("9876".to_string()),
            account_name: Some("Everyday".to_string()),
            account_type: Some(account_type),
            currency: Some("USD".to_string()),
            ..Default::default()
        }
    }

    fn run(entities: Vec<Entity>) -> Result<OfxImport, ImportError> {
        let table = securities();
        let mut engine = ReplayEngine::from_entities(&entities).unwrap();
        let mut host = ImportCallbacks::new(7, &table);
        let report = parse(&mut engine, &mut host).unwrap();
        host.finish(report)
    }

    fn bank_transaction(amount: f64) -> Transaction {
        Transaction {
            fi_id: Some("20231101-1".to_string()),
            name: Some("Coffee".to_string()),
            memo: Some("card 1234".to_string()),
            check_number: Some("101".to_string()),
            amount: Some(amount),
            ..Default::default()
        }
    }

    #[test]
    fn test_account_type_mapping() {
        assert_eq!(HostAccountType::from(AccountType::Checking), HostAccountType::Bank);
        assert_eq!(HostAccountType::from(AccountType::Cma), HostAccountType::Bank);
        assert_eq!(
            HostAccountType::from(AccountType::CreditCard),
            HostAccountType::Liability
        );
        assert_eq!(
            HostAccountType::from(AccountType::CreditLine),
            HostAccountType::Liability
        );
        assert_eq!(
            HostAccountType::from(AccountType::Investment),
            HostAccountType::Investment
        );
    }

    #[test]
    fn test_bank_statement_import() {
        let statement = Statement {
            currency: Some("USD".to_string()),
            ledger_balance: Some(1234.5),
            ..Default::default()
        };
        let import = run(vec![
            Entity::Account(account(AccountType::Checking)),
            Entity::Statement(statement),
            Entity::Transaction(bank_transaction(-4.5)),
        ])
        .unwrap();

        assert_eq!(import.account.account_id, 7);
        assert_eq!(import.account.external_account_id, "9876");
        assert_eq!(import.account.account_type, Some(HostAccountType::Bank));
        assert_eq!(import.account.security_id, Some(1));
        assert_eq!(import.total_transactions, 1);
        assert_eq!(import.ending_balance.as_deref(), Some("1234.50"));
        assert_eq!(import.beginning_balance, None);

        let tx = &import.transactions[0];
        assert_eq!(tx.description, "Coffee");
        assert_eq!(tx.remote_id, "20231101-1");
        assert_eq!(tx.splits.len(), 2);
        assert_eq!(tx.splits[0].account_id, Some(7));
        assert_eq!(tx.splits[0].amount, "-4.50");
        assert_eq!(tx.splits[0].memo, "card 1234");
        assert_eq!(tx.splits[0].number, "101");
        // Without units the counter leg balances the amount
        assert_eq!(tx.splits[1].security_id, Some(1));
        assert_eq!(tx.splits[1].amount, "4.50");
    }

    #[test]
    fn test_units_from_amount_fees_and_price() {
        let tx = Transaction {
            amount: Some(-1000.0),
            fees: Some(5.0),
            commission: Some(4.95),
            unit_price: Some(99.5),
            ..Default::default()
        };
        let import = run(vec![
            Entity::Account(account(AccountType::Investment)),
            Entity::Transaction(tx),
        ])
        .unwrap();

        let splits = &import.transactions[0].splits;
        assert_eq!(splits.len(), 4);
        assert_eq!(splits[0].amount, "-1000.00");
        // -(-1000 - 5 - 4.95) / 99.5
        assert_eq!(splits[1].amount, "10.15");
        assert_eq!(splits[2].memo, "fees");
        assert_eq!(splits[2].amount, "-5.00");
        assert_eq!(splits[2].security_id, Some(1));
        assert_eq!(splits[3].memo, "commission");
        assert_eq!(splits[3].amount, "-4.95");
    }

    #[test]
    fn test_units_with_security_resolved_by_ticker() {
        let tx = Transaction {
            amount: Some(-2000.0),
            units: Some(12.34567),
            security: Some(OfxSecurity {
                ticker: Some("VTI".to_string()),
                unique_id: Some("922908769".to_string()),
                unique_id_type: Some("CUSIP".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let import = run(vec![
            Entity::Account(account(AccountType::Investment)),
            Entity::Transaction(tx),
        ])
        .unwrap();

        let units = &import.transactions[0].splits[1];
        assert_eq!(units.security_id, Some(2));
        assert_eq!(units.account_id, None);
        assert_eq!(units.amount, "12.3457");
    }

    #[test]
    fn test_security_validation_errors() {
        let with_security = |security: OfxSecurity| Transaction {
            amount: Some(-1.0),
            units: Some(1.0),
            security: Some(security),
            ..Default::default()
        };
        let cases = [
            (OfxSecurity::default(), "OFX security ticker invalid"),
            (
                OfxSecurity {
                    ticker: Some("NOPE".to_string()),
                    ..Default::default()
                },
                "Failed to find OFX transaction security: NOPE",
            ),
            (
                OfxSecurity {
                    ticker: Some("VTI".to_string()),
                    unique_id: Some("000000000".to_string()),
                    unique_id_type: Some("CUSIP".to_string()),
                    ..Default::default()
                },
                "OFX transaction security CUSIP failed to validate",
            ),
        ];
        for (security, message) in cases {
            // A valid transaction first so the error is not masked
            let err = run(vec![
                Entity::Account(account(AccountType::Investment)),
                Entity::Transaction(bank_transaction(1.0)),
                Entity::Transaction(with_security(security)),
            ])
            .unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_account_errors_abort_parse() {
        let mut no_id = account(AccountType::Savings);
        no_id.account_id = None;
        let mut no_type = account(AccountType::Savings);
        no_type.account_type = None;
        let mut no_currency = account(AccountType::Savings);
        no_currency.currency = None;
        let mut unknown_currency = account(AccountType::Savings);
        unknown_currency.currency = Some("XTS".to_string());

        for (bad, expected) in [
            (no_id, "OFX account ID invalid"),
            (no_type, "OFX account type invalid"),
            (no_currency, "OFX account currency invalid"),
            (unknown_currency, "Security not found: XTS"),
        ] {
            let table = securities();
            let entities = vec![
                Entity::Account(bad),
                Entity::Transaction(bank_transaction(1.0)),
            ];
            let mut engine = ReplayEngine::from_entities(&entities).unwrap();
            let mut host = ImportCallbacks::new(7, &table);
            let report = parse(&mut engine, &mut host).unwrap();

            assert!(report.is_aborted());
            assert_eq!(report.transactions, 0);
            assert_eq!(host.error().map(|e| e.to_string()).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_first_error_wins() {
        let table = securities();
        let mut host = ImportCallbacks::new(7, &table);
        host.account(account(AccountType::Checking));
        host.transaction(bank_transaction(1.0));

        let missing_amount = Transaction::default();
        assert_eq!(host.transaction(missing_amount), Status::Abort);
        let mut bad_account = account(AccountType::Checking);
        bad_account.account_type = None;
        assert_eq!(host.account(bad_account), Status::Abort);

        assert!(matches!(
            host.error(),
            Some(ImportError::TransactionAmountInvalid)
        ));
    }

    #[test]
    fn test_no_transactions_found() {
        let err = run(vec![Entity::Account(account(AccountType::Checking))]).unwrap_err();
        assert!(matches!(err, ImportError::NoTransactions));
    }

    #[test]
    fn test_transaction_before_account() {
        let err = run(vec![
            Entity::Transaction(bank_transaction(1.0)),
            Entity::Account(account(AccountType::Checking)),
        ])
        .unwrap_err();
        // The import aborted before anything was kept
        assert!(matches!(err, ImportError::NoTransactions));
    }

    #[test]
    fn test_date_falls_back_to_initiated() {
        use chrono::{TimeZone, Utc};
        let initiated = Utc.timestamp_opt(1_698_000_000, 0).unwrap();
        let tx = Transaction {
            date_initiated: Some(initiated),
            ..bank_transaction(1.0)
        };
        let import = run(vec![
            Entity::Account(account(AccountType::Checking)),
            Entity::Transaction(tx),
        ])
        .unwrap();
        assert_eq!(import.transactions[0].date, Some(initiated));
    }

    #[test]
    fn test_statement_in_unknown_currency_before_account() {
        let statement = Statement {
            currency: Some("XTS".to_string()),
            ledger_balance: Some(12.5),
            ..Default::default()
        };
        let import = run(vec![
            Entity::Statement(statement),
            Entity::Account(account(AccountType::Checking)),
            Entity::Transaction(bank_transaction(-4.5)),
        ])
        .unwrap();
        assert_eq!(import.ending_balance.as_deref(), Some("12.5"));
        assert_eq!(import.total_transactions, 1);
    }

    #[test]
    fn test_non_finite_ledger_balance_is_skipped() {
        let statement = Statement {
            currency: Some("USD".to_string()),
            ledger_balance: Some(f64::NAN),
            ..Default::default()
        };
        let import = run(vec![
            Entity::Account(account(AccountType::Checking)),
            Entity::Statement(statement),
            Entity::Transaction(bank_transaction(-4.5)),
        ])
        .unwrap();
        assert_eq!(import.ending_balance, None);
    }

    #[test]
    fn test_zero_precision_currency() {
        let mut yen = account(AccountType::Checking);
        yen.currency = Some("JPY".to_string());
        let import = run(vec![
            Entity::Account(yen),
            Entity::Transaction(bank_transaction(-1500.5)),
        ])
        .unwrap();
        assert_eq!(import.transactions[0].splits[0].amount, "-1501");
    }
}
