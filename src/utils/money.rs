use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?$").unwrap()
});

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d{1,2}))?\s*%?$").unwrap());

static LAST_FOUR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

/// 解析金额字符串为美分, 支持 "$1,234.56" / "1234.5" / "12"
pub fn parse_money_to_cents(input: &str) -> AppResult<i64> {
    let trimmed = input.trim();
    let caps = MONEY_RE
        .captures(trimmed)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid money amount: {input}")))?;

    let whole: i64 = caps[1]
        .replace(',', "")
        .parse()
        .map_err(|_| AppError::ValidationError(format!("Money amount too large: {input}")))?;
    let cents = fraction_to_hundredths(caps.get(2).map(|m| m.as_str()));

    whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(|| AppError::ValidationError(format!("Money amount too large: {input}")))
}

/// 解析百分比为 basis points: "1.5%" -> 150, "3" -> 300
pub fn parse_percent_to_bp(input: &str) -> AppResult<i32> {
    let trimmed = input.trim();
    let caps = PERCENT_RE
        .captures(trimmed)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid percentage: {input}")))?;

    let whole: i32 = caps[1]
        .parse()
        .map_err(|_| AppError::ValidationError(format!("Percentage too large: {input}")))?;
    let frac = fraction_to_hundredths(caps.get(2).map(|m| m.as_str())) as i32;

    whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(|| AppError::ValidationError(format!("Percentage too large: {input}")))
}

/// 卡号后四位必须是 4 位数字
pub fn validate_last_four(last_four: &str) -> AppResult<()> {
    if !LAST_FOUR_RE.is_match(last_four) {
        return Err(AppError::ValidationError(
            "last_four must be exactly 4 digits".to_string(),
        ));
    }
    Ok(())
}

/// 美分格式化为 "$1,234.56", 负数前置 "-"
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", abs % 100)
}

fn fraction_to_hundredths(frac: Option<&str>) -> i64 {
    match frac {
        None => 0,
        Some(f) if f.len() == 1 => f.parse::<i64>().unwrap_or(0) * 10,
        Some(f) => f.parse::<i64>().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_to_cents() {
        assert_eq!(parse_money_to_cents("$1,234.56").unwrap(), 123456);
        assert_eq!(parse_money_to_cents("12").unwrap(), 1200);
        assert_eq!(parse_money_to_cents(" 0.5 ").unwrap(), 50);
        assert_eq!(parse_money_to_cents("$ 95.00").unwrap(), 9500);
        assert_eq!(parse_money_to_cents("1000000").unwrap(), 100000000);
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert!(parse_money_to_cents("").is_err());
        assert!(parse_money_to_cents("-5.00").is_err());
        assert!(parse_money_to_cents("12.345").is_err());
        assert!(parse_money_to_cents("1,23").is_err());
        assert!(parse_money_to_cents("abc").is_err());
    }

    #[test]
    fn test_parse_percent_to_bp() {
        assert_eq!(parse_percent_to_bp("1.5%").unwrap(), 150);
        assert_eq!(parse_percent_to_bp("3").unwrap(), 300);
        assert_eq!(parse_percent_to_bp("0.25 %").unwrap(), 25);
        assert!(parse_percent_to_bp("x%").is_err());
    }

    #[test]
    fn test_validate_last_four() {
        assert!(validate_last_four("1234").is_ok());
        assert!(validate_last_four("123").is_err());
        assert!(validate_last_four("12a4").is_err());
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(123456), "$1,234.56");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(-2500), "-$25.00");
        assert_eq!(format_cents(100000000), "$1,000,000.00");
    }
}
