use super::layout::{at, CellStyle, SheetLayout};
use crate::entities::{project, project_item};
use crate::services::aggregation::{compute_totals, estimate_lines};
use crate::services::pricing::parse_quantity;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

pub const SHEET_NAME: &str = "見積書";

/// Column header row; item rows start right below it.
pub const HEADER_ROW: u32 = 14;

/// The printed form always reserves this many item rows.
pub const MIN_ITEM_ROWS: u32 = 20;

const ISSUER: [(Option<&str>, &str); 5] = [
    (Some("株式会社"), "Gハウス"),
    (Some("〒"), "535-0022"),
    (Some("住所"), "大阪府大阪市旭区"),
    (None, "新森2-23-12"),
    (Some("TEL："), "06-6954-0648"),
];

/// First row of the 小計 / 消費税 / 合計 block for `selected` printed lines.
pub fn totals_row(selected: usize) -> u32 {
    let printed = u32::try_from(selected).unwrap_or(u32::MAX);
    HEADER_ROW + 1 + printed.max(MIN_ITEM_ROWS)
}

fn quantity_value(quantity: &str) -> f64 {
    parse_quantity(quantity).to_f64().unwrap_or(0.0)
}

pub fn build(
    project: &project::Model,
    items: &[project_item::Model],
    today: NaiveDate,
) -> SheetLayout {
    let totals = compute_totals(items);
    let lines = estimate_lines(items);
    let mut sheet = SheetLayout::new(SHEET_NAME);

    sheet.merge(at('B', 1), at('I', 1), "見　積　書", CellStyle::Title);

    sheet
        .text(at('C', 3), project.customer_name.clone().unwrap_or_default())
        .text(at('E', 3), "御中")
        .text(at('H', 3), "No.")
        .text(at('I', 3), project.estimate_number.clone().unwrap_or_default())
        .text(at('H', 4), "見積日")
        .text(
            at('I', 4),
            project
                .estimate_date
                .unwrap_or(today)
                .format("%Y-%m-%d")
                .to_string(),
        );

    sheet
        .text(at('C', 5), "下記のとおり、御見積申し上げます。")
        .text(at('C', 6), "件名")
        .text(
            at('D', 6),
            format!("{} 申請関連の見積もり", project.property_name),
        );

    for (offset, (label, value)) in (6u32..).zip(ISSUER) {
        if let Some(label) = label {
            sheet.text(at('H', offset), label);
        }
        sheet.text(at('I', offset), value);
    }

    sheet
        .text(at('C', 12), "合計")
        .number(at('D', 12), totals.total as f64, CellStyle::Amount)
        .text(at('E', 12), "（税込）");

    for (col, label) in [
        ('B', "No."),
        ('C', "摘要"),
        ('F', "数量"),
        ('G', "単位"),
        ('H', "単価"),
        ('I', "金額"),
    ] {
        sheet.styled_text(at(col, HEADER_ROW), label, CellStyle::Header);
    }

    for (row, line) in (HEADER_ROW + 1..).zip(&lines) {
        sheet
            .number(at('B', row), line.index as f64, CellStyle::Plain)
            .text(at('C', row), line.description.clone())
            .number(at('F', row), quantity_value(&line.quantity), CellStyle::Plain)
            .text(at('G', row), line.unit.clone())
            .number(at('H', row), line.unit_price as f64, CellStyle::Amount)
            .number(at('I', row), line.amount as f64, CellStyle::Amount);
    }

    let row = totals_row(lines.len());
    sheet
        .text(at('H', row), "小計")
        .number(at('I', row), totals.subtotal as f64, CellStyle::Amount)
        .text(at('H', row + 1), "消費税")
        .number(at('I', row + 1), totals.tax as f64, CellStyle::Amount)
        .styled_text(at('H', row + 2), "合計", CellStyle::Bold)
        .number(at('I', row + 2), totals.total as f64, CellStyle::AmountBold);

    for (col, width) in [
        ('B', 5.0),
        ('C', 40.0),
        ('D', 15.0),
        ('E', 8.0),
        ('F', 8.0),
        ('G', 5.0),
        ('H', 12.0),
        ('I', 12.0),
    ] {
        sheet.column_width(col, width);
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::documents::fixtures::project;
    use crate::services::reconciliation::fixtures::project_line;

    fn item(selling: i64, qty: &str, selected: bool, sort: i32) -> project_item::Model {
        let mut line = project_line(None, sort);
        line.description = format!("項目{}", sort);
        line.selling_price = selling;
        line.cost_price = selling * 7 / 10;
        line.quantity = qty.into();
        line.is_selected = selected;
        line
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn totals_block_sits_below_the_reserved_rows() {
        let items = vec![
            item(10_000, "1", true, 0),
            item(20_000, "2", true, 1),
            item(5_000, "1", true, 2),
            item(80_000, "1", false, 3),
        ];
        let sheet = build(&project("テスト邸"), &items, today());

        let row = totals_row(3);
        assert_eq!(row, HEADER_ROW + 21);
        assert_eq!(sheet.text_at(at('H', row)), Some("小計"));
        assert_eq!(sheet.number_at(at('I', row)), Some(55_000.0));
        assert_eq!(sheet.number_at(at('I', row + 1)), Some(5_500.0));
        assert_eq!(sheet.number_at(at('I', row + 2)), Some(60_500.0));
        assert_eq!(sheet.number_at(at('D', 12)), Some(60_500.0));
    }

    #[test]
    fn only_selected_lines_are_printed_and_numbered() {
        let items = vec![
            item(10_000, "1", false, 0),
            item(20_000, "2", true, 1),
        ];
        let sheet = build(&project("テスト邸"), &items, today());

        assert_eq!(sheet.number_at(at('B', 15)), Some(1.0));
        assert_eq!(sheet.text_at(at('C', 15)), Some("項目1"));
        assert_eq!(sheet.number_at(at('F', 15)), Some(2.0));
        assert_eq!(sheet.number_at(at('I', 15)), Some(40_000.0));
        assert!(sheet.cell(at('B', 16)).is_none());
    }

    #[test]
    fn fractional_and_unparsable_quantities_are_numbers() {
        let items = vec![item(10_000, "1.5", true, 0), item(10_000, "一式", true, 1)];
        let sheet = build(&project("テスト邸"), &items, today());
        assert_eq!(sheet.number_at(at('F', 15)), Some(1.5));
        assert_eq!(sheet.number_at(at('F', 16)), Some(0.0));
        assert_eq!(sheet.number_at(at('I', 15)), Some(15_000.0));
    }

    #[test]
    fn long_estimates_push_the_totals_down() {
        let items: Vec<_> = (0..25).map(|i| item(1_000, "1", true, i)).collect();
        let sheet = build(&project("大型案件"), &items, today());
        assert_eq!(totals_row(25), HEADER_ROW + 26);
        assert_eq!(sheet.number_at(at('I', HEADER_ROW + 26)), Some(25_000.0));
    }

    #[test]
    fn header_fields_and_date_fallback() {
        let mut p = project("山田邸");
        let sheet = build(&p, &[], today());
        assert_eq!(sheet.text_at(at('C', 3)), Some("株式会社テスト"));
        assert_eq!(sheet.text_at(at('I', 3)), Some("E-0001"));
        assert_eq!(sheet.text_at(at('I', 4)), Some("2024-04-01"));
        assert_eq!(sheet.text_at(at('D', 6)), Some("山田邸 申請関連の見積もり"));
        assert_eq!(sheet.text_at(at('I', 7)), Some("535-0022"));
        assert!(sheet.cell(at('H', 9)).is_none());
        assert_eq!(sheet.merges[0].text, "見　積　書");

        p.estimate_date = NaiveDate::from_ymd_opt(2023, 12, 25);
        p.customer_name = None;
        let sheet = build(&p, &[], today());
        assert_eq!(sheet.text_at(at('I', 4)), Some("2023-12-25"));
        assert!(sheet.cell(at('C', 3)).is_none());
        assert_eq!(sheet.number_at(at('D', 12)), Some(0.0));
    }
}
