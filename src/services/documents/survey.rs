use super::layout::{at, CellStyle, SheetLayout};
use crate::entities::{project, project_survey};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const SHEET_NAME: &str = "調査書";

/// Row of the first connecting road; roads 2 and 3 follow directly.
pub const FIRST_ROAD_ROW: u32 = 18;

fn decimal_text(value: Option<Decimal>) -> String {
    value.map(|d| d.normalize().to_string()).unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn build(
    project: &project::Model,
    region_name: Option<&str>,
    survey: Option<&project_survey::Model>,
    today: NaiveDate,
) -> SheetLayout {
    let mut sheet = SheetLayout::new(SHEET_NAME);

    sheet.merge(at('B', 1), at('K', 1), "調　査　書", CellStyle::Title);

    sheet
        .text(at('G', 3), "作成日：")
        .text(at('H', 3), today.format("%Y-%m-%d").to_string())
        .text(at('J', 3), "担当者：");

    sheet
        .styled_text(at('B', 5), "物件名称", CellStyle::Bold)
        .text(at('C', 5), project.property_name.clone())
        .styled_text(at('B', 6), "建築地（地番）", CellStyle::Bold)
        .text(at('C', 6), region_name.unwrap_or_default())
        .text(at('D', 6), text(&project.municipality))
        .text(at('G', 6), text(&project.lot_number));

    sheet
        .styled_text(at('B', 8), "敷地面積", CellStyle::Bold)
        .text(at('C', 8), decimal_text(project.site_area))
        .text(at('E', 8), "㎡")
        .styled_text(at('G', 8), "建物規模", CellStyle::Bold)
        .text(at('H', 8), text(&project.building_scale))
        .styled_text(at('B', 9), "都市計画区域", CellStyle::Bold)
        .text(at('C', 9), text(&project.city_planning_zone))
        .styled_text(at('G', 9), "防火指定", CellStyle::Bold)
        .text(at('H', 9), text(&project.fire_prevention))
        .styled_text(at('B', 10), "用途地域", CellStyle::Bold)
        .text(at('C', 10), text(&project.zoning));

    sheet
        .styled_text(at('B', 12), "建蔽率", CellStyle::Bold)
        .text(at('C', 12), decimal_text(project.building_coverage))
        .text(at('D', 12), "％")
        .styled_text(at('G', 12), "容積率", CellStyle::Bold)
        .text(at('H', 12), decimal_text(project.floor_area_ratio))
        .text(at('J', 12), "％");

    if let Some(survey) = survey {
        write_survey(&mut sheet, survey);
    }

    for (col, width) in [
        ('A', 3.0),
        ('B', 15.0),
        ('C', 20.0),
        ('D', 15.0),
        ('E', 5.0),
        ('F', 5.0),
        ('G', 15.0),
        ('H', 12.0),
        ('I', 10.0),
        ('J', 10.0),
        ('K', 10.0),
    ] {
        sheet.column_width(col, width);
    }

    sheet
}

fn write_survey(sheet: &mut SheetLayout, survey: &project_survey::Model) {
    sheet.styled_text(at('B', 13), "各種区域等", CellStyle::Bold);
    for (row, label, value) in [
        (13, "地区計画", &survey.district_plan),
        (14, "建築協定", &survey.building_agreement),
        (15, "景観", &survey.landscape),
        (16, "埋蔵文化財", &survey.buried_cultural),
    ] {
        sheet.text(at('C', row), label).text(at('D', row), text(value));
    }

    sheet
        .styled_text(at('B', 17), "接続道路", CellStyle::Bold)
        .text(at('C', 17), "道路種別");

    for (idx, road) in survey.roads().iter().enumerate() {
        if idx > 0 && road.is_empty() {
            continue;
        }
        let row = FIRST_ROAD_ROW + idx as u32;
        sheet
            .text(at('C', row), format!("{}側", road.side.unwrap_or("---")))
            .text(at('D', row), road.name.unwrap_or_default());
        if road.width.is_some() {
            sheet.text(at('I', row), format!("幅員 {}m", decimal_text(road.width)));
        }
    }

    for (row, label, value) in [
        (23, "公共下水道", &survey.public_sewerage),
        (24, "水道", &survey.water_supply),
        (25, "ガス", &survey.gas),
    ] {
        sheet
            .styled_text(at('B', row), label, CellStyle::Bold)
            .text(at('C', row), text(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::documents::fixtures::{project, survey};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn basic_info_without_survey() {
        let mut p = project("山田邸");
        p.lot_number = Some("1-2-3".into());
        p.site_area = Some(dec!(150.50));
        p.building_coverage = Some(dec!(60));
        p.zoning = Some("第一種住居地域".into());

        let sheet = build(&p, Some("大阪府"), None, today());
        assert_eq!(sheet.text_at(at('H', 3)), Some("2024-04-01"));
        assert_eq!(sheet.text_at(at('C', 5)), Some("山田邸"));
        assert_eq!(sheet.text_at(at('C', 6)), Some("大阪府"));
        assert_eq!(sheet.text_at(at('D', 6)), Some("大阪市"));
        assert_eq!(sheet.text_at(at('G', 6)), Some("1-2-3"));
        assert_eq!(sheet.text_at(at('C', 8)), Some("150.5"));
        assert_eq!(sheet.text_at(at('C', 10)), Some("第一種住居地域"));
        assert_eq!(sheet.text_at(at('C', 12)), Some("60"));
        assert!(sheet.cell(at('B', 13)).is_none());
        assert!(sheet.cell(at('B', 23)).is_none());
    }

    #[test]
    fn survey_rows_and_first_road() {
        let mut s = survey();
        s.district_plan = Some("なし".into());
        s.road1_side = Some("南".into());
        s.road1_name = Some("市道1号線".into());
        s.road1_width = Some(dec!(4.00));
        s.public_sewerage = Some("有".into());

        let sheet = build(&project("山田邸"), None, Some(&s), today());
        assert!(sheet.cell(at('C', 6)).is_none());
        assert_eq!(sheet.text_at(at('D', 13)), Some("なし"));
        assert_eq!(sheet.text_at(at('C', 14)), Some("建築協定"));
        assert_eq!(sheet.text_at(at('C', 18)), Some("南側"));
        assert_eq!(sheet.text_at(at('D', 18)), Some("市道1号線"));
        assert_eq!(sheet.text_at(at('I', 18)), Some("幅員 4m"));
        assert!(sheet.cell(at('C', 19)).is_none());
        assert_eq!(sheet.text_at(at('C', 23)), Some("有"));
        assert_eq!(sheet.text_at(at('B', 25)), Some("ガス"));
    }

    #[test]
    fn blank_first_road_prints_side_placeholder_but_no_width() {
        let mut s = survey();
        s.district_plan = Some("なし".into());
        let sheet = build(&project("山田邸"), None, Some(&s), today());
        assert_eq!(sheet.text_at(at('C', 18)), Some("---側"));
        assert!(sheet.cell(at('I', 18)).is_none());
    }

    #[test]
    fn later_roads_print_only_when_filled() {
        let mut s = survey();
        s.road3_side = Some("東".into());
        s.road3_width = Some(dec!(6.5));

        let sheet = build(&project("山田邸"), None, Some(&s), today());
        assert!(sheet.cell(at('C', 19)).is_none());
        assert_eq!(sheet.text_at(at('C', 20)), Some("東側"));
        assert_eq!(sheet.text_at(at('I', 20)), Some("幅員 6.5m"));
    }
}
