//! Field resolution from raw page text.
//!
//! Each of the five invoice fields has its own ordered list of candidate
//! strategies, each a `(pattern, transform)` pair. Strategies are
//! tried in listed order and the first pattern that matches wins; later
//! candidates are never consulted. Resolution never fails: a field with no
//! winning strategy yields the empty string (or [`Decimal::ZERO`] for the
//! amount), and completeness is judged downstream by the validator.
//!
//! Normalization (date zero-padding, thousands-separator stripping,
//! whitespace collapsing, delimiter reconstruction) happens inside the
//! winning strategy's transform; there is no separate raw intermediate form.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

/// Transform applied to the captures of a winning pattern.
type Transform = fn(&Captures) -> String;

lazy_static! {
    /// Invoice number: a label followed by a digit run.
    static ref NUMBER_STRATEGIES: Vec<(Regex, Transform)> = vec![
        (Regex::new(r"发票号码[：:]\s*(\d+)").unwrap(), first_group as Transform),
        (Regex::new(r"发票号码\s*[：:]\s*(\d+)").unwrap(), first_group as Transform),
        (Regex::new(r"No[.：:]\s*(\d+)").unwrap(), first_group as Transform),
        (Regex::new(r"号码[：:]\s*(\d+)").unwrap(), first_group as Transform),
    ];

    /// Issue date: labeled full-width form first, then an unlabeled
    /// full-width date anywhere, then labeled hyphen/slash forms.
    static ref DATE_STRATEGIES: Vec<(Regex, Transform)> = vec![
        (Regex::new(r"开票日期[：:]\s*(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap(), iso_date as Transform),
        (Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap(), iso_date as Transform),
        (Regex::new(r"开票日期[：:]\s*(\d{4})-(\d{1,2})-(\d{1,2})").unwrap(), iso_date as Transform),
        (Regex::new(r"开票日期[：:]\s*(\d{4})/(\d{1,2})/(\d{1,2})").unwrap(), iso_date as Transform),
    ];

    /// Line item: the asterisk-delimited `*category*name` convention first,
    /// then a labeled 项目名称 capture running to the 规格 column or end of
    /// line.
    static ref ITEM_STRATEGIES: Vec<(Regex, Transform)> = vec![
        (Regex::new(r"\*([^*]+)\*(\S+)").unwrap(), rebuild_delimited as Transform),
        (Regex::new(r"(?m)项目名称\s+(.+?)(?:\s+规格|$)").unwrap(), trimmed_group as Transform),
    ];

    /// Amount: the lowercase-amount label (full-width then half-width
    /// parentheses), then the price-tax-total label, then a generic total.
    static ref AMOUNT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"（小写）[¥￥]?\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"\(小写\)[¥￥]?\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"价税合计.*?[¥￥]\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"合\s*计\s*[¥￥]?\s*([\d,]+\.?\d*)").unwrap(),
    ];

    /// Remark stage one: the text strictly between the lowercase-amount line
    /// and the first 备注/开票人 label. The target document family routinely
    /// places the remark body *before* its own label.
    static ref REMARK_BEFORE_LABEL: Regex =
        Regex::new(r"(?s)[（(]小写[）)][¥￥]?[\d,.]+\n(.+?)(?:备\s*注|开票人)").unwrap();

    /// Remark stage two: the text after an explicit 备注 label, up to the
    /// 开票人 label or end of text.
    static ref REMARK_AFTER_LABEL: Vec<Regex> = vec![
        Regex::new(r"(?s)备\s*注\s*[：:]?\s*(.+?)(?:开票人|$)").unwrap(),
        Regex::new(r"(?s)备注\s*(.+?)(?:开票人|$)").unwrap(),
    ];

    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

fn first_group(caps: &Captures) -> String {
    caps[1].to_string()
}

/// Zero-pad month and day and join with hyphens: `2025年3月7日` → `2025-03-07`.
fn iso_date(caps: &Captures) -> String {
    format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3])
}

/// Reconstruct the `*category*name` convention literally, delimiters included.
fn rebuild_delimited(caps: &Captures) -> String {
    format!("*{}*{}", &caps[1], &caps[2])
}

fn trimmed_group(caps: &Captures) -> String {
    caps[1].trim().to_string()
}

/// Run an ordered strategy list with early exit on the first match.
fn resolve_first(text: &str, strategies: &[(Regex, Transform)]) -> String {
    for (pattern, transform) in strategies {
        if let Some(caps) = pattern.captures(text) {
            return transform(&caps);
        }
    }
    String::new()
}

/// Collapse internal whitespace and newlines to single spaces.
fn collapse_whitespace(raw: &str) -> String {
    RE_WHITESPACE.replace_all(raw.trim(), " ").trim().to_string()
}

/// Resolve the invoice number (发票号码), or empty if no label matches.
pub fn extract_invoice_number(text: &str) -> String {
    resolve_first(text, &NUMBER_STRATEGIES)
}

/// Resolve the issue date as `YYYY-MM-DD`, or empty if no format matches.
pub fn extract_date(text: &str) -> String {
    resolve_first(text, &DATE_STRATEGIES)
}

/// Resolve the line-item name, or empty if no pattern matches.
pub fn extract_item_name(text: &str) -> String {
    resolve_first(text, &ITEM_STRATEGIES)
}

/// Resolve the tax-inclusive total.
///
/// Thousands separators are stripped before the exact decimal parse; a
/// capture that fails to parse falls through to the next strategy. No match
/// resolves to [`Decimal::ZERO`], the sentinel the validator treats as
/// missing.
pub fn extract_amount(text: &str) -> Decimal {
    for pattern in AMOUNT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let raw = caps[1].replace(',', "");
            match Decimal::from_str(&raw) {
                Ok(amount) => return amount,
                Err(_) => continue,
            }
        }
    }
    Decimal::ZERO
}

/// Resolve the free-text remark, whitespace-collapsed, or empty.
///
/// Stage one captures remark text that appears before its own 备注 label
/// (between the amount line and the label); stage two captures text following
/// an explicit label. An empty stage-one capture falls through to stage two.
pub fn extract_remark(text: &str) -> String {
    if let Some(caps) = REMARK_BEFORE_LABEL.captures(text) {
        let remark = collapse_whitespace(&caps[1]);
        if !remark.is_empty() {
            return remark;
        }
    }

    for pattern in REMARK_AFTER_LABEL.iter() {
        if let Some(caps) = pattern.captures(text) {
            let remark = collapse_whitespace(&caps[1]);
            if !remark.is_empty() {
                return remark;
            }
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // Invoice number

    #[test]
    fn test_number_full_width_colon() {
        assert_eq!(extract_invoice_number("发票号码：12345678"), "12345678");
    }

    #[test]
    fn test_number_half_width_colon_with_space() {
        assert_eq!(extract_invoice_number("发票号码 : 25317000000012345678"), "25317000000012345678");
    }

    #[test]
    fn test_number_no_label() {
        assert_eq!(extract_invoice_number("No. 88331204"), "88331204");
    }

    #[test]
    fn test_number_short_label() {
        assert_eq!(extract_invoice_number("号码：445566"), "445566");
    }

    #[test]
    fn test_number_unresolved_is_empty() {
        assert_eq!(extract_invoice_number("这里没有任何编号标签"), "");
    }

    // Date

    #[test]
    fn test_date_labeled_full_width() {
        assert_eq!(extract_date("开票日期：2025年10月13日"), "2025-10-13");
    }

    #[test]
    fn test_date_zero_pads_month_and_day() {
        assert_eq!(extract_date("开票日期：2025年3月7日"), "2025-03-07");
    }

    #[test]
    fn test_date_unlabeled_full_width() {
        assert_eq!(extract_date("随便一段文字 2024年12月1日 结尾"), "2024-12-01");
    }

    #[test]
    fn test_date_labeled_hyphen() {
        assert_eq!(extract_date("开票日期：2025-9-5"), "2025-09-05");
    }

    #[test]
    fn test_date_labeled_slash() {
        assert_eq!(extract_date("开票日期：2025/10/13"), "2025-10-13");
    }

    #[test]
    fn test_date_label_wins_over_unlabeled() {
        // The labeled strategy is tried first even when an unlabeled date
        // occurs earlier in the text.
        let text = "合同签订于2023年1月2日\n开票日期：2025年10月13日";
        assert_eq!(extract_date(text), "2025-10-13");
    }

    #[test]
    fn test_date_unresolved_is_empty() {
        assert_eq!(extract_date("没有日期"), "");
    }

    // Item name

    #[test]
    fn test_item_delimiters_preserved() {
        assert_eq!(
            extract_item_name("*快递服务*收派服务费"),
            "*快递服务*收派服务费"
        );
    }

    #[test]
    fn test_item_delimited_wins_over_label() {
        let text = "项目名称 其他费用\n*餐饮服务*餐费";
        assert_eq!(extract_item_name(text), "*餐饮服务*餐费");
    }

    #[test]
    fn test_item_labeled_stops_at_spec_column() {
        assert_eq!(extract_item_name("项目名称 住宿费 规格 间/天"), "住宿费");
    }

    #[test]
    fn test_item_labeled_runs_to_end_of_line() {
        assert_eq!(extract_item_name("项目名称 技术服务费\n税率 6%"), "技术服务费");
    }

    #[test]
    fn test_item_unresolved_is_empty() {
        assert_eq!(extract_item_name("金额 100.00"), "");
    }

    // Amount

    #[test]
    fn test_amount_lowercase_label() {
        assert_eq!(extract_amount("（小写）¥17.00"), dec("17.00"));
    }

    #[test]
    fn test_amount_strips_thousands_separator() {
        assert_eq!(extract_amount("（小写）¥1,234.56"), dec("1234.56"));
    }

    #[test]
    fn test_amount_half_width_parens() {
        assert_eq!(extract_amount("(小写)￥88.50"), dec("88.50"));
    }

    #[test]
    fn test_amount_price_tax_total() {
        assert_eq!(
            extract_amount("价税合计（大写）壹佰元整 ¥100.00"),
            dec("100.00")
        );
    }

    #[test]
    fn test_amount_generic_total_fallback() {
        assert_eq!(extract_amount("合 计 ¥16.04"), dec("16.04"));
    }

    #[test]
    fn test_amount_lowercase_beats_generic_total() {
        let text = "合 计 ¥15.09 税额 ¥0.95\n（小写）¥16.04";
        assert_eq!(extract_amount(text), dec("16.04"));
    }

    #[test]
    fn test_amount_unresolved_is_zero() {
        assert_eq!(extract_amount("本页无金额栏"), Decimal::ZERO);
    }

    #[test]
    fn test_amount_exactness() {
        // 0.1 + 0.2 style values must stay exact, not float-approximate.
        assert_eq!(extract_amount("（小写）¥0.30").to_string(), "0.30");
    }

    // Remark

    #[test]
    fn test_remark_after_label() {
        assert_eq!(extract_remark("备注：无"), "无");
    }

    #[test]
    fn test_remark_stops_at_issuer_label() {
        assert_eq!(extract_remark("备注：住宿费专用 开票人：张三"), "住宿费专用");
    }

    #[test]
    fn test_remark_before_its_label() {
        let text = "（小写）¥100.00\n差旅报销 2025年第三季度\n备注：\n开票人：李四";
        assert_eq!(extract_remark(text), "差旅报销 2025年第三季度");
    }

    #[test]
    fn test_remark_collapses_whitespace() {
        assert_eq!(extract_remark("备注：第一行\n  第二行\t第三行"), "第一行 第二行 第三行");
    }

    #[test]
    fn test_remark_empty_stage_one_falls_through() {
        // Nothing between the amount line and the label, but text after it.
        let text = "（小写）¥50.00\n备注：加急件";
        assert_eq!(extract_remark(text), "加急件");
    }

    #[test]
    fn test_remark_unresolved_is_empty() {
        assert_eq!(extract_remark("没有备注栏"), "");
    }

    // End-to-end text blocks

    #[test]
    fn test_full_text_block() {
        let text = "发票号码：12345678\n开票日期：2025年10月13日\n*快递服务*收派服务费\n（小写）¥17.00\n备注：无";
        assert_eq!(extract_invoice_number(text), "12345678");
        assert_eq!(extract_date(text), "2025-10-13");
        assert_eq!(extract_item_name(text), "*快递服务*收派服务费");
        assert_eq!(extract_amount(text), dec("17.00"));
        assert_eq!(extract_remark(text), "无");
    }

    #[test]
    fn test_text_block_without_number_label() {
        let text = "开票日期：2025年10月13日\n（小写）¥17.00";
        assert_eq!(extract_invoice_number(text), "");
        assert_eq!(extract_date(text), "2025-10-13");
    }
}
