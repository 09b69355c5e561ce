//! CSV 批量导入信用卡与礼品卡
//!
//! 解析与写库分开: `parse_*` 只把 CSV 转成创建请求并校验, 行号从 2 开始 (第 1 行为表头);
//! `import_*` 在单个事务内写入, 已存在的卡跳过.

use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{credit_card_service, gift_card_service};
use crate::utils::{normalize_category, parse_money_to_cents, parse_percent_to_bp};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CreditCardRow {
    issuer: String,
    name: String,
    #[serde(default)]
    last_four: Option<String>,
    #[serde(default)]
    annual_fee: Option<String>,
    #[serde(default)]
    base_rate: Option<String>,
    #[serde(default)]
    bonus_categories: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GiftCardRow {
    merchant: String,
    #[serde(default)]
    card_number: Option<String>,
    balance: String,
    #[serde(default)]
    expires_on: Option<String>,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn row_error(row: usize) -> impl Fn(AppError) -> AppError {
    move |e| {
        let message = match e {
            AppError::ValidationError(msg) => msg,
            other => other.to_string(),
        };
        AppError::ImportError { row, message }
    }
}

/// "dining=3%;groceries=4%" -> [(dining, 300), (groceries, 400)]
fn parse_bonus_categories(input: &str) -> AppResult<Vec<BonusCategoryInput>> {
    input
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (category, rate) = part.split_once('=').ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Bonus category must look like category=rate: {part}"
                ))
            })?;
            Ok(BonusCategoryInput {
                category: normalize_category(category),
                reward_bp: parse_percent_to_bp(rate)?,
            })
        })
        .collect()
}

pub fn parse_credit_cards_csv<R: Read>(input: R) -> AppResult<Vec<CreateCreditCardRequest>> {
    let mut requests = Vec::new();
    for (index, record) in reader(input).deserialize::<CreditCardRow>().enumerate() {
        let row = index + 2;
        let to_import_error = row_error(row);
        let record = record.map_err(|e| AppError::ImportError {
            row,
            message: e.to_string(),
        })?;

        let request = CreateCreditCardRequest {
            issuer: record.issuer,
            name: record.name,
            last_four: non_empty(record.last_four),
            network: None,
            annual_fee_cents: non_empty(record.annual_fee)
                .map(|fee| parse_money_to_cents(&fee))
                .transpose()
                .map_err(&to_import_error)?
                .unwrap_or(0),
            base_reward_bp: non_empty(record.base_rate)
                .map(|rate| parse_percent_to_bp(&rate))
                .transpose()
                .map_err(&to_import_error)?
                .unwrap_or(100),
            opened_on: None,
            bonus_categories: non_empty(record.bonus_categories)
                .map(|b| parse_bonus_categories(&b))
                .transpose()
                .map_err(&to_import_error)?
                .unwrap_or_default(),
        };
        credit_card_service::validate_create_request(&request).map_err(&to_import_error)?;
        requests.push(request);
    }
    Ok(requests)
}

pub fn parse_gift_cards_csv<R: Read>(input: R) -> AppResult<Vec<CreateGiftCardRequest>> {
    let mut requests = Vec::new();
    for (index, record) in reader(input).deserialize::<GiftCardRow>().enumerate() {
        let row = index + 2;
        let to_import_error = row_error(row);
        let record = record.map_err(|e| AppError::ImportError {
            row,
            message: e.to_string(),
        })?;

        let expires_on = non_empty(record.expires_on)
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|_| {
                    AppError::ValidationError(format!("expires_on must be YYYY-MM-DD: {d}"))
                })
            })
            .transpose()
            .map_err(&to_import_error)?;

        let request = CreateGiftCardRequest {
            merchant: record.merchant,
            card_number: non_empty(record.card_number),
            balance_cents: parse_money_to_cents(&record.balance).map_err(&to_import_error)?,
            expires_on,
        };
        gift_card_service::validate_create_request(&request).map_err(&to_import_error)?;
        requests.push(request);
    }
    Ok(requests)
}

#[derive(Clone)]
pub struct ImportService {
    pool: DatabaseConnection,
}

impl ImportService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 同 issuer + name + last_four 的卡已存在时跳过
    pub async fn import_credit_cards(
        &self,
        user_id: i64,
        rows: Vec<CreateCreditCardRequest>,
    ) -> AppResult<ImportSummary> {
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
        };

        let txn = self.pool.begin().await?;
        for request in rows {
            let exists = credit_card_service::card_exists(
                &txn,
                user_id,
                &request.issuer,
                &request.name,
                request.last_four.as_deref(),
            )
            .await?;
            if exists {
                summary.skipped += 1;
                continue;
            }
            credit_card_service::insert_card(&txn, user_id, request).await?;
            summary.imported += 1;
        }
        txn.commit().await?;

        log::info!(
            "Imported {} credit cards for user {user_id} ({} skipped)",
            summary.imported,
            summary.skipped
        );
        Ok(summary)
    }

    /// 同 merchant + card_number 的礼品卡已存在时跳过; 没有卡号的行总是导入
    pub async fn import_gift_cards(
        &self,
        user_id: i64,
        rows: Vec<CreateGiftCardRequest>,
    ) -> AppResult<ImportSummary> {
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
        };

        let txn = self.pool.begin().await?;
        for request in rows {
            if let Some(number) = request.card_number.as_deref()
                && gift_card_service::gift_card_exists(&txn, user_id, &request.merchant, number)
                    .await?
            {
                summary.skipped += 1;
                continue;
            }
            gift_card_service::insert_gift_card(&txn, user_id, request).await?;
            summary.imported += 1;
        }
        txn.commit().await?;

        log::info!(
            "Imported {} gift cards for user {user_id} ({} skipped)",
            summary.imported,
            summary.skipped
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credit_cards_csv() {
        let csv = "\
issuer,name,last_four,annual_fee,base_rate,bonus_categories
Chase,Sapphire Preferred,4242,$95,1%,dining=3%;travel=2%
Citi,Double Cash,,,2%,
";
        let rows = parse_credit_cards_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].issuer, "Chase");
        assert_eq!(rows[0].last_four.as_deref(), Some("4242"));
        assert_eq!(rows[0].annual_fee_cents, 9500);
        assert_eq!(rows[0].base_reward_bp, 100);
        assert_eq!(rows[0].bonus_categories.len(), 2);
        assert_eq!(rows[0].bonus_categories[0].category, "dining");
        assert_eq!(rows[0].bonus_categories[0].reward_bp, 300);

        assert_eq!(rows[1].last_four, None);
        assert_eq!(rows[1].annual_fee_cents, 0);
        assert_eq!(rows[1].base_reward_bp, 200);
        assert!(rows[1].bonus_categories.is_empty());
    }

    #[test]
    fn test_parse_credit_cards_csv_reports_row() {
        let csv = "\
issuer,name,last_four,annual_fee,base_rate,bonus_categories
Chase,Freedom,1234,0,1%,
Amex,Gold,12345,$250,1%,dining=4%
";
        match parse_credit_cards_csv(csv.as_bytes()) {
            Err(AppError::ImportError { row, message }) => {
                assert_eq!(row, 3);
                assert!(message.contains("last_four"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_bonus_categories_rejects_malformed() {
        assert!(parse_bonus_categories("dining:3%").is_err());
        assert!(parse_bonus_categories("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_gift_cards_csv() {
        let csv = "\
merchant,card_number,balance,expires_on
Target,6006-1234,$50.00,2027-01-31
Amazon,,25,
";
        let rows = parse_gift_cards_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].balance_cents, 5000);
        assert_eq!(
            rows[0].expires_on,
            Some(NaiveDate::from_ymd_opt(2027, 1, 31).unwrap())
        );
        assert_eq!(rows[1].card_number, None);
        assert_eq!(rows[1].balance_cents, 2500);
    }

    #[test]
    fn test_parse_gift_cards_csv_bad_date() {
        let csv = "merchant,card_number,balance,expires_on\nTarget,1,$5,01/31/2027\n";
        assert!(matches!(
            parse_gift_cards_csv(csv.as_bytes()),
            Err(AppError::ImportError { row: 2, .. })
        ));
    }

    #[test]
    fn test_parse_gift_cards_from_file() {
        use std::io::{Seek, SeekFrom, Write};

        let mut file = tempfile::tempfile().unwrap();
        writeln!(file, "merchant,card_number,balance,expires_on").unwrap();
        writeln!(file, "Starbucks,  6100 ,$12.34,").unwrap();
        writeln!(file, "Home Depot,,100,2030-12-31").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let rows = parse_gift_cards_csv(file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].card_number.as_deref(), Some("6100"));
        assert_eq!(rows[0].balance_cents, 1234);
        assert_eq!(rows[1].balance_cents, 10000);
    }
}
