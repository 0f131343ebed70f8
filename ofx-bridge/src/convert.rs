//! Conversion between native records and host records
//!
//! Native → host deep-copies every text buffer into an owned `String`, so
//! the result never points into engine memory. Host → native is the reverse
//! projection used to feed engines; it fails instead of truncating.

use crate::native::{OfxbAccount, OfxbSecurity, OfxbStatement, OfxbTransaction};
use crate::records::{
    Account, AccountType, CorrectionAction, EntityKind, InvestmentTransactionType, Security,
    Statement, Timestamp, Transaction, TransactionType,
};
use crate::types::{BridgeError, Result};
use chrono::DateTime;
use std::os::raw::{c_char, c_double, c_int};

/// Field reader bound to the entity kind being converted, for error context
struct Reader {
    kind: EntityKind,
}

impl Reader {
    fn text(&self, field: &'static str, buf: &[c_char], valid: c_int) -> Result<Option<String>> {
        if valid == 0 {
            return Ok(None);
        }

        let bytes: Vec<u8> = buf.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
        if bytes.len() == buf.len() {
            return Err(BridgeError::conversion(self.kind, field, "missing NUL terminator"));
        }

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| BridgeError::conversion(self.kind, field, e.to_string()))
    }

    fn date(&self, field: &'static str, secs: i64, valid: c_int) -> Result<Option<Timestamp>> {
        if valid == 0 {
            return Ok(None);
        }
        DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| {
                BridgeError::conversion(self.kind, field, format!("timestamp {} out of range", secs))
            })
    }

    fn account_type(&self, value: c_int, valid: c_int) -> Result<Option<AccountType>> {
        if valid == 0 {
            return Ok(None);
        }
        AccountType::from_native(value).map(Some).ok_or_else(|| {
            BridgeError::conversion(self.kind, "account_type", format!("unknown value {}", value))
        })
    }

    fn transaction_type(&self, value: c_int, valid: c_int) -> Result<Option<TransactionType>> {
        if valid == 0 {
            return Ok(None);
        }
        TransactionType::from_native(value).map(Some).ok_or_else(|| {
            BridgeError::conversion(self.kind, "transaction_type", format!("unknown value {}", value))
        })
    }

    fn investment_type(&self, value: c_int, valid: c_int) -> Result<Option<InvestmentTransactionType>> {
        if valid == 0 {
            return Ok(None);
        }
        InvestmentTransactionType::from_native(value).map(Some).ok_or_else(|| {
            BridgeError::conversion(self.kind, "investment_type", format!("unknown value {}", value))
        })
    }

    fn correction_action(&self, value: c_int, valid: c_int) -> Result<Option<CorrectionAction>> {
        if valid == 0 {
            return Ok(None);
        }
        CorrectionAction::from_native(value).map(Some).ok_or_else(|| {
            BridgeError::conversion(
                self.kind,
                "fi_id_correction_action",
                format!("unknown value {}", value),
            )
        })
    }
}

fn number(value: c_double, valid: c_int) -> Option<f64> {
    (valid != 0).then_some(value)
}

fn integer(value: i64, valid: c_int) -> Option<i64> {
    (valid != 0).then_some(value)
}

fn write_text(
    field: &'static str,
    value: Option<&str>,
    buf: &mut [c_char],
    valid: &mut c_int,
) -> Result<()> {
    buf.fill(0);
    let Some(value) = value else {
        *valid = 0;
        return Ok(());
    };

    let bytes = value.as_bytes();
    if bytes.contains(&0) {
        return Err(BridgeError::InteriorNul(field));
    }
    // Room for the terminator
    if bytes.len() >= buf.len() {
        return Err(BridgeError::FieldTooLong {
            field,
            len: bytes.len(),
            max: buf.len() - 1,
        });
    }

    for (dst, &src) in buf.iter_mut().zip(bytes) {
        *dst = src as c_char;
    }
    *valid = 1;
    Ok(())
}

fn write_date(value: Option<Timestamp>, out: &mut i64, valid: &mut c_int) {
    match value {
        Some(ts) => {
            *out = ts.timestamp();
            *valid = 1;
        }
        None => {
            *out = 0;
            *valid = 0;
        }
    }
}

fn write_number(value: Option<f64>, out: &mut c_double, valid: &mut c_int) {
    *out = value.unwrap_or_default();
    *valid = c_int::from(value.is_some());
}

fn write_integer(value: Option<i64>, out: &mut i64, valid: &mut c_int) {
    *out = value.unwrap_or_default();
    *valid = c_int::from(value.is_some());
}

fn write_enum(value: Option<c_int>, out: &mut c_int, valid: &mut c_int) {
    *out = value.unwrap_or_default();
    *valid = c_int::from(value.is_some());
}

impl TryFrom<&OfxbStatement> for Statement {
    type Error = BridgeError;

    fn try_from(raw: &OfxbStatement) -> Result<Self> {
        let r = Reader {
            kind: EntityKind::Statement,
        };
        Ok(Statement {
            account_id: r.text("account_id", &raw.account_id, raw.account_id_valid)?,
            currency: r.text("currency", &raw.currency, raw.currency_valid)?,
            ledger_balance: number(raw.ledger_balance, raw.ledger_balance_valid),
            ledger_balance_date: r.date(
                "ledger_balance_date",
                raw.ledger_balance_date,
                raw.ledger_balance_date_valid,
            )?,
            available_balance: number(raw.available_balance, raw.available_balance_valid),
            available_balance_date: r.date(
                "available_balance_date",
                raw.available_balance_date,
                raw.available_balance_date_valid,
            )?,
            date_start: r.date("date_start", raw.date_start, raw.date_start_valid)?,
            date_end: r.date("date_end", raw.date_end, raw.date_end_valid)?,
            marketing_info: r.text("marketing_info", &raw.marketing_info, raw.marketing_info_valid)?,
        })
    }
}

impl TryFrom<&Statement> for OfxbStatement {
    type Error = BridgeError;

    fn try_from(s: &Statement) -> Result<Self> {
        let mut raw = OfxbStatement::default();
        write_text("account_id", s.account_id.as_deref(), &mut raw.account_id, &mut raw.account_id_valid)?;
        write_text("currency", s.currency.as_deref(), &mut raw.currency, &mut raw.currency_valid)?;
        write_number(s.ledger_balance, &mut raw.ledger_balance, &mut raw.ledger_balance_valid);
        write_date(
            s.ledger_balance_date,
            &mut raw.ledger_balance_date,
            &mut raw.ledger_balance_date_valid,
        );
        write_number(s.available_balance, &mut raw.available_balance, &mut raw.available_balance_valid);
        write_date(
            s.available_balance_date,
            &mut raw.available_balance_date,
            &mut raw.available_balance_date_valid,
        );
        write_date(s.date_start, &mut raw.date_start, &mut raw.date_start_valid);
        write_date(s.date_end, &mut raw.date_end, &mut raw.date_end_valid);
        write_text(
            "marketing_info",
            s.marketing_info.as_deref(),
            &mut raw.marketing_info,
            &mut raw.marketing_info_valid,
        )?;
        Ok(raw)
    }
}

impl TryFrom<&OfxbAccount> for Account {
    type Error = BridgeError;

    fn try_from(raw: &OfxbAccount) -> Result<Self> {
        let r = Reader {
            kind: EntityKind::Account,
        };
        Ok(Account {
            account_id: r.text("account_id", &raw.account_id, raw.account_id_valid)?,
            account_name: r.text("account_name", &raw.account_name, raw.account_name_valid)?,
            account_type: r.account_type(raw.account_type, raw.account_type_valid)?,
            currency: r.text("currency", &raw.currency, raw.currency_valid)?,
            account_number: r.text("account_number", &raw.account_number, raw.account_number_valid)?,
            bank_id: r.text("bank_id", &raw.bank_id, raw.bank_id_valid)?,
            broker_id: r.text("broker_id", &raw.broker_id, raw.broker_id_valid)?,
            branch_id: r.text("branch_id", &raw.branch_id, raw.branch_id_valid)?,
        })
    }
}

impl TryFrom<&Account> for OfxbAccount {
    type Error = BridgeError;

    fn try_from(a: &Account) -> Result<Self> {
        let mut raw = OfxbAccount::default();
        write_text("account_id", a.account_id.as_deref(), &mut raw.account_id, &mut raw.account_id_valid)?;
        write_text(
            "account_name",
            a.account_name.as_deref(),
            &mut raw.account_name,
            &mut raw.account_name_valid,
        )?;
        if let Some(account_type) = a.account_type {
            raw.account_type = account_type.to_native();
            raw.account_type_valid = 1;
        }
        write_text("currency", a.currency.as_deref(), &mut raw.currency, &mut raw.currency_valid)?;
        write_text(
            "account_number",
            a.account_number.as_deref(),
            &mut raw.account_number,
            &mut raw.account_number_valid,
        )?;
        write_text("bank_id", a.bank_id.as_deref(), &mut raw.bank_id, &mut raw.bank_id_valid)?;
        write_text("broker_id", a.broker_id.as_deref(), &mut raw.broker_id, &mut raw.broker_id_valid)?;
        write_text("branch_id", a.branch_id.as_deref(), &mut raw.branch_id, &mut raw.branch_id_valid)?;
        Ok(raw)
    }
}

fn read_security(r: &Reader, raw: &OfxbSecurity) -> Result<Security> {
    Ok(Security {
        unique_id: r.text("security.unique_id", &raw.unique_id, raw.unique_id_valid)?,
        unique_id_type: r.text(
            "security.unique_id_type",
            &raw.unique_id_type,
            raw.unique_id_type_valid,
        )?,
        secname: r.text("security.secname", &raw.secname, raw.secname_valid)?,
        ticker: r.text("security.ticker", &raw.ticker, raw.ticker_valid)?,
        unit_price: number(raw.unit_price, raw.unit_price_valid),
        date_unit_price: r.date(
            "security.date_unit_price",
            raw.date_unit_price,
            raw.date_unit_price_valid,
        )?,
        currency: r.text("security.currency", &raw.currency, raw.currency_valid)?,
        memo: r.text("security.memo", &raw.memo, raw.memo_valid)?,
    })
}

fn write_security(s: &Security, raw: &mut OfxbSecurity) -> Result<()> {
    write_text("security.unique_id", s.unique_id.as_deref(), &mut raw.unique_id, &mut raw.unique_id_valid)?;
    write_text(
        "security.unique_id_type",
        s.unique_id_type.as_deref(),
        &mut raw.unique_id_type,
        &mut raw.unique_id_type_valid,
    )?;
    write_text("security.secname", s.secname.as_deref(), &mut raw.secname, &mut raw.secname_valid)?;
    write_text("security.ticker", s.ticker.as_deref(), &mut raw.ticker, &mut raw.ticker_valid)?;
    write_number(s.unit_price, &mut raw.unit_price, &mut raw.unit_price_valid);
    write_date(s.date_unit_price, &mut raw.date_unit_price, &mut raw.date_unit_price_valid);
    write_text("security.currency", s.currency.as_deref(), &mut raw.currency, &mut raw.currency_valid)?;
    write_text("security.memo", s.memo.as_deref(), &mut raw.memo, &mut raw.memo_valid)?;
    Ok(())
}

impl TryFrom<&OfxbTransaction> for Transaction {
    type Error = BridgeError;

    fn try_from(raw: &OfxbTransaction) -> Result<Self> {
        let r = Reader {
            kind: EntityKind::Transaction,
        };
        let security = if raw.security_valid != 0 {
            Some(read_security(&r, &raw.security)?)
        } else {
            None
        };

        Ok(Transaction {
            account_id: r.text("account_id", &raw.account_id, raw.account_id_valid)?,
            fi_id: r.text("fi_id", &raw.fi_id, raw.fi_id_valid)?,
            fi_id_corrected: r.text(
                "fi_id_corrected",
                &raw.fi_id_corrected,
                raw.fi_id_corrected_valid,
            )?,
            fi_id_correction_action: r.correction_action(
                raw.fi_id_correction_action,
                raw.fi_id_correction_action_valid,
            )?,
            transaction_type: r.transaction_type(raw.transaction_type, raw.transaction_type_valid)?,
            investment_type: r.investment_type(raw.investment_type, raw.investment_type_valid)?,
            standard_industrial_code: integer(
                raw.standard_industrial_code,
                raw.standard_industrial_code_valid,
            ),
            date_posted: r.date("date_posted", raw.date_posted, raw.date_posted_valid)?,
            date_initiated: r.date("date_initiated", raw.date_initiated, raw.date_initiated_valid)?,
            date_funds_available: r.date(
                "date_funds_available",
                raw.date_funds_available,
                raw.date_funds_available_valid,
            )?,
            date_payout: r.date("date_payout", raw.date_payout, raw.date_payout_valid)?,
            amount: number(raw.amount, raw.amount_valid),
            units: number(raw.units, raw.units_valid),
            unit_price: number(raw.unit_price, raw.unit_price_valid),
            fees: number(raw.fees, raw.fees_valid),
            commission: number(raw.commission, raw.commission_valid),
            old_units: number(raw.old_units, raw.old_units_valid),
            new_units: number(raw.new_units, raw.new_units_valid),
            accrued_interest: number(raw.accrued_interest, raw.accrued_interest_valid),
            load: number(raw.load, raw.load_valid),
            markup: number(raw.markup, raw.markup_valid),
            markdown: number(raw.markdown, raw.markdown_valid),
            withholding: number(raw.withholding, raw.withholding_valid),
            taxes: number(raw.taxes, raw.taxes_valid),
            penalty: number(raw.penalty, raw.penalty_valid),
            name: r.text("name", &raw.name, raw.name_valid)?,
            memo: r.text("memo", &raw.memo, raw.memo_valid)?,
            check_number: r.text("check_number", &raw.check_number, raw.check_number_valid)?,
            reference_number: r.text(
                "reference_number",
                &raw.reference_number,
                raw.reference_number_valid,
            )?,
            payee_id: r.text("payee_id", &raw.payee_id, raw.payee_id_valid)?,
            server_transaction_id: r.text(
                "server_transaction_id",
                &raw.server_transaction_id,
                raw.server_transaction_id_valid,
            )?,
            security,
        })
    }
}

impl TryFrom<&Transaction> for OfxbTransaction {
    type Error = BridgeError;

    fn try_from(t: &Transaction) -> Result<Self> {
        let mut raw = OfxbTransaction::default();
        write_text("account_id", t.account_id.as_deref(), &mut raw.account_id, &mut raw.account_id_valid)?;
        write_text("fi_id", t.fi_id.as_deref(), &mut raw.fi_id, &mut raw.fi_id_valid)?;
        write_text(
            "fi_id_corrected",
            t.fi_id_corrected.as_deref(),
            &mut raw.fi_id_corrected,
            &mut raw.fi_id_corrected_valid,
        )?;
        write_enum(
            t.fi_id_correction_action.map(CorrectionAction::to_native),
            &mut raw.fi_id_correction_action,
            &mut raw.fi_id_correction_action_valid,
        );
        write_enum(
            t.transaction_type.map(TransactionType::to_native),
            &mut raw.transaction_type,
            &mut raw.transaction_type_valid,
        );
        write_enum(
            t.investment_type.map(InvestmentTransactionType::to_native),
            &mut raw.investment_type,
            &mut raw.investment_type_valid,
        );
        write_integer(
            t.standard_industrial_code,
            &mut raw.standard_industrial_code,
            &mut raw.standard_industrial_code_valid,
        );
        write_date(t.date_posted, &mut raw.date_posted, &mut raw.date_posted_valid);
        write_date(t.date_initiated, &mut raw.date_initiated, &mut raw.date_initiated_valid);
        write_date(
            t.date_funds_available,
            &mut raw.date_funds_available,
            &mut raw.date_funds_available_valid,
        );
        write_date(t.date_payout, &mut raw.date_payout, &mut raw.date_payout_valid);
        write_number(t.amount, &mut raw.amount, &mut raw.amount_valid);
        write_number(t.units, &mut raw.units, &mut raw.units_valid);
        write_number(t.unit_price, &mut raw.unit_price, &mut raw.unit_price_valid);
        write_number(t.fees, &mut raw.fees, &mut raw.fees_valid);
        write_number(t.commission, &mut raw.commission, &mut raw.commission_valid);
        write_number(t.old_units, &mut raw.old_units, &mut raw.old_units_valid);
        write_number(t.new_units, &mut raw.new_units, &mut raw.new_units_valid);
        write_number(t.accrued_interest, &mut raw.accrued_interest, &mut raw.accrued_interest_valid);
        write_number(t.load, &mut raw.load, &mut raw.load_valid);
        write_number(t.markup, &mut raw.markup, &mut raw.markup_valid);
        write_number(t.markdown, &mut raw.markdown, &mut raw.markdown_valid);
        write_number(t.withholding, &mut raw.withholding, &mut raw.withholding_valid);
        write_number(t.taxes, &mut raw.taxes, &mut raw.taxes_valid);
        write_number(t.penalty, &mut raw.penalty, &mut raw.penalty_valid);
        write_text("name", t.name.as_deref(), &mut raw.name, &mut raw.name_valid)?;
        write_text("memo", t.memo.as_deref(), &mut raw.memo, &mut raw.memo_valid)?;
        write_text(
            "check_number",
            t.check_number.as_deref(),
            &mut raw.check_number,
            &mut raw.check_number_valid,
        )?;
        write_text(
            "reference_number",
            t.reference_number.as_deref(),
            &mut raw.reference_number,
            &mut raw.reference_number_valid,
        )?;
        write_text("payee_id", t.payee_id.as_deref(), &mut raw.payee_id, &mut raw.payee_id_valid)?;
        write_text(
            "server_transaction_id",
            t.server_transaction_id.as_deref(),
            &mut raw.server_transaction_id,
            &mut raw.server_transaction_id_valid,
        )?;
        if let Some(security) = &t.security {
            write_security(security, &mut raw.security)?;
            raw.security_valid = 1;
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_statement_projection_is_lossless() {
        let statement = Statement {
            account_id: Some("021000021 000123456789".to_string()),
            currency: Some("USD".to_string()),
            ledger_balance: Some(1523.17),
            ledger_balance_date: Some(ts(1_700_000_000)),
            available_balance: Some(-12.5),
            available_balance_date: None,
            date_start: Some(ts(1_697_328_000)),
            date_end: Some(ts(1_699_920_000)),
            marketing_info: Some(String::new()),
        };
        let raw = OfxbStatement::try_from(&statement).unwrap();
        assert_eq!(Statement::try_from(&raw).unwrap(), statement);
    }

    #[test]
    fn test_account_projection_is_lossless() {
        let account = Account {
            account_id: Some("9876".to_string()),
            account_name: Some("Bank account 9876".to_string()),
            account_type: Some(AccountType::CreditCard),
            currency: Some("EUR".to_string()),
            account_number: Some("9876".to_string()),
            bank_id: None,
            broker_id: Some("broker.example.com".to_string()),
            branch_id: None,
        };
        let raw = OfxbAccount::try_from(&account).unwrap();
        assert_eq!(Account::try_from(&raw).unwrap(), account);
    }

    #[test]
    fn test_transaction_projection_is_lossless() {
        let tx = Transaction {
            account_id: Some("9876".to_string()),
            fi_id: Some("20231001-0001".to_string()),
            fi_id_corrected: None,
            fi_id_correction_action: None,
            transaction_type: Some(TransactionType::Pos),
            investment_type: None,
            standard_industrial_code: None,
            date_posted: Some(ts(1_696_118_400)),
            date_initiated: None,
            date_funds_available: Some(ts(1_696_204_800)),
            date_payout: None,
            amount: Some(-42.99),
            units: Some(10.0),
            unit_price: Some(4.299),
            fees: Some(0.5),
            commission: None,
            old_units: None,
            new_units: None,
            accrued_interest: None,
            load: None,
            markup: None,
            markdown: None,
            withholding: None,
            taxes: None,
            penalty: None,
            name: Some("Café Zürich".to_string()),
            memo: Some(String::new()),
            check_number: None,
            reference_number: Some("REF-1".to_string()),
            payee_id: None,
            server_transaction_id: Some("SRV-1".to_string()),
            security: Some(Security {
                unique_id: Some("037833100".to_string()),
                unique_id_type: Some("CUSIP".to_string()),
                secname: None,
                ticker: Some("AAPL".to_string()),
                unit_price: None,
                date_unit_price: None,
                currency: None,
                memo: None,
            }),
        };
        let raw = OfxbTransaction::try_from(&tx).unwrap();
        assert_eq!(Transaction::try_from(&raw).unwrap(), tx);
    }

    #[test]
    fn test_investment_fields_projection_is_lossless() {
        let tx = Transaction {
            fi_id: Some("INV-7".to_string()),
            fi_id_corrected: Some("INV-6".to_string()),
            fi_id_correction_action: Some(CorrectionAction::Replace),
            investment_type: Some(InvestmentTransactionType::SellStock),
            standard_industrial_code: Some(3571),
            date_payout: Some(ts(1_701_000_000)),
            amount: Some(1234.56),
            units: Some(-10.0),
            old_units: Some(1.0),
            new_units: Some(2.0),
            accrued_interest: Some(0.12),
            load: Some(1.5),
            markup: Some(0.25),
            markdown: Some(0.0),
            withholding: Some(3.3),
            taxes: Some(12.0),
            penalty: Some(-0.75),
            security: Some(Security {
                unique_id: Some("037833100".to_string()),
                unique_id_type: Some("CUSIP".to_string()),
                secname: Some("Apple Inc.".to_string()),
                ticker: Some("AAPL".to_string()),
                unit_price: Some(123.456),
                date_unit_price: Some(ts(1_700_900_000)),
                currency: Some("USD".to_string()),
                memo: Some(String::new()),
            }),
            ..Default::default()
        };
        let raw = OfxbTransaction::try_from(&tx).unwrap();
        assert_eq!(raw.investment_type, 17);
        assert_eq!(raw.fi_id_correction_action, 1);
        assert_eq!(raw.security.currency_valid, 1);
        assert_eq!(Transaction::try_from(&raw).unwrap(), tx);
    }

    #[test]
    fn test_unknown_investment_type_is_rejected() {
        let mut raw = OfxbTransaction::default();
        raw.investment_type = 20;
        raw.investment_type_valid = 1;
        assert!(matches!(
            Transaction::try_from(&raw),
            Err(BridgeError::Conversion {
                field: "investment_type",
                ..
            })
        ));

        raw.investment_type_valid = 0;
        raw.fi_id_correction_action = 5;
        raw.fi_id_correction_action_valid = 1;
        assert!(matches!(
            Transaction::try_from(&raw),
            Err(BridgeError::Conversion {
                field: "fi_id_correction_action",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_text_is_distinct_from_absent() {
        let mut raw = OfxbTransaction::default();
        raw.memo_valid = 1;
        let present = Transaction::try_from(&raw).unwrap();
        assert_eq!(present.memo, Some(String::new()));

        raw.memo_valid = 0;
        let absent = Transaction::try_from(&raw).unwrap();
        assert_eq!(absent.memo, None);
        assert_ne!(present, absent);
    }

    #[test]
    fn test_invalid_utf8_is_a_conversion_error() {
        let mut raw = OfxbTransaction::default();
        raw.name[0] = 0xC3u8 as c_char;
        raw.name[1] = 0x28;
        raw.name_valid = 1;
        let err = Transaction::try_from(&raw).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Conversion {
                kind: EntityKind::Transaction,
                field: "name",
                ..
            }
        ));
    }

    #[test]
    fn test_unterminated_text_is_rejected() {
        let mut raw = OfxbAccount::default();
        raw.currency = [b'U' as c_char, b'S' as c_char, b'D' as c_char, b'X' as c_char];
        raw.currency_valid = 1;
        assert!(Account::try_from(&raw).is_err());
    }

    #[test]
    fn test_unknown_account_type_is_rejected() {
        let mut raw = OfxbAccount::default();
        raw.account_type = 42;
        raw.account_type_valid = 1;
        let err = Account::try_from(&raw).unwrap_err();
        assert!(err.to_string().contains("unknown value 42"));

        // Garbage in an invalid slot is ignored
        raw.account_type_valid = 0;
        assert_eq!(Account::try_from(&raw).unwrap().account_type, None);
    }

    #[test]
    fn test_reverse_projection_refuses_to_truncate() {
        let account = Account {
            currency: Some("USDX".to_string()),
            ..Default::default()
        };
        match OfxbAccount::try_from(&account) {
            Err(BridgeError::FieldTooLong { field, len, max }) => {
                assert_eq!(field, "currency");
                assert_eq!(len, 4);
                assert_eq!(max, 3);
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        let account = Account {
            account_name: Some("a\0b".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            OfxbAccount::try_from(&account),
            Err(BridgeError::InteriorNul("account_name"))
        ));
    }
}
