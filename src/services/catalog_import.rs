//! Loads regions, municipalities and master items from the master workbook.
//!
//! The workbook carries one priced-task sheet per prefecture (`27大阪府`) and
//! one postal sheet per prefecture (`27OSAKA`) whose column H lists
//! municipality names.

use crate::{
    entities::{master_item, municipality, region},
    errors::ServiceError,
    services::pricing::calculate_selling_price,
};
use calamine::{Data, Range, Reader};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TryInsertResult,
};
use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Seek};
use tracing::{error, info, warn};

pub const MUNICIPALITY_BATCH: usize = 100;
pub const ITEM_BATCH: usize = 50;

/// Placeholder row in the postal sheets, not a real municipality.
const UNLISTED_PLACEHOLDER: &str = "以下に掲載がない場合";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefecture {
    pub code: i32,
    pub name: &'static str,
    pub short_name: &'static str,
    pub item_sheet: &'static str,
    pub postal_sheet: &'static str,
}

pub const PREFECTURES: [Prefecture; 6] = [
    Prefecture {
        code: 25,
        name: "滋賀県",
        short_name: "滋賀",
        item_sheet: "25滋賀県",
        postal_sheet: "25SHIGA",
    },
    Prefecture {
        code: 26,
        name: "京都府",
        short_name: "京都",
        item_sheet: "26京都府",
        postal_sheet: "26KYOUTO",
    },
    Prefecture {
        code: 27,
        name: "大阪府",
        short_name: "大阪",
        item_sheet: "27大阪府",
        postal_sheet: "27OSAKA",
    },
    Prefecture {
        code: 28,
        name: "兵庫県",
        short_name: "兵庫",
        item_sheet: "28兵庫県",
        postal_sheet: "28HYOGO",
    },
    Prefecture {
        code: 29,
        name: "奈良県",
        short_name: "奈良",
        item_sheet: "29奈良県",
        postal_sheet: "29NARA",
    },
    Prefecture {
        code: 30,
        name: "和歌山県",
        short_name: "和歌山",
        item_sheet: "30和歌山県",
        postal_sheet: "30WAKAYA",
    },
];

/// Zero-based column indexes of the priced-task sheets.
mod columns {
    pub const MUNICIPALITY: u32 = 0;
    pub const DESCRIPTION: u32 = 1;
    pub const QUANTITY: u32 = 2;
    pub const UNIT: u32 = 3;
    pub const COST: u32 = 4;
    pub const SELLING: u32 = 6;
    pub const LEAD_TIME: u32 = 7;
    /// Municipality names in the postal sheets
    pub const POSTAL_MUNICIPALITY: u32 = 7;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMasterItem {
    pub municipality_name: String,
    pub description: String,
    pub quantity: String,
    pub unit: String,
    pub cost_price: i64,
    pub selling_price: i64,
    pub lead_time_days: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct PrefectureData {
    pub prefecture: Prefecture,
    /// `None` when the postal sheet is missing
    pub municipalities: Option<Vec<String>>,
    /// `None` when the priced-task sheet is missing
    pub items: Option<Vec<ParsedMasterItem>>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogWorkbook {
    pub prefectures: Vec<PrefectureData>,
    pub missing_sheets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub regions: usize,
    pub municipalities: u64,
    pub items: u64,
}

fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Float(f)) => number_text(*f),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Numeric cell value; text that does not parse counts as 0.
fn cell_number(range: &Range<Data>, row: u32, col: u32) -> f64 {
    let value = match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `1.0` -> `"1"`, `1.5` -> `"1.5"`
fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Absolute row numbers covered by `range`.
fn row_span(range: &Range<Data>) -> std::ops::Range<u32> {
    match (range.start(), range.end()) {
        (Some((first, _)), Some((last, _))) => first..last + 1,
        _ => 0..0,
    }
}

/// Distinct municipality names from a postal sheet, sorted.
pub fn parse_municipalities(range: &Range<Data>) -> Vec<String> {
    let names: BTreeSet<String> = row_span(range)
        .map(|row| cell_text(range, row, columns::POSTAL_MUNICIPALITY))
        .filter(|name| !name.is_empty() && name != UNLISTED_PLACEHOLDER)
        .collect();
    names.into_iter().collect()
}

/// Priced tasks from a prefecture sheet. The first row is a header; rows
/// without a description or with a zero cost are skipped.
pub fn parse_master_items(range: &Range<Data>) -> Vec<ParsedMasterItem> {
    row_span(range)
        .filter(|row| *row > 0)
        .filter_map(|row| {
            let description = cell_text(range, row, columns::DESCRIPTION);
            let cost = cell_number(range, row, columns::COST);
            if description.is_empty() || cost == 0.0 {
                return None;
            }

            let quantity = cell_number(range, row, columns::QUANTITY);
            let unit = cell_text(range, row, columns::UNIT);
            let cost_price = cost.round() as i64;
            let selling = cell_number(range, row, columns::SELLING).round() as i64;
            let days = cell_number(range, row, columns::LEAD_TIME);

            Some(ParsedMasterItem {
                municipality_name: cell_text(range, row, columns::MUNICIPALITY),
                description,
                quantity: number_text(if quantity == 0.0 { 1.0 } else { quantity }),
                unit: if unit.is_empty() { "式".to_string() } else { unit },
                cost_price,
                selling_price: if selling == 0 {
                    calculate_selling_price(cost_price)
                } else {
                    selling
                },
                lead_time_days: (days != 0.0).then(|| days.round() as i32),
            })
        })
        .collect()
}

/// Reads every known sheet; absent sheets are recorded, not fatal.
pub fn read_catalog<RS, R>(workbook: &mut R) -> Result<CatalogWorkbook, ServiceError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let names = workbook.sheet_names();
    let mut catalog = CatalogWorkbook::default();

    let mut load = |workbook: &mut R, sheet: &str| -> Result<Option<Range<Data>>, ServiceError> {
        if !names.iter().any(|n| n == sheet) {
            warn!(sheet, "Sheet not found in workbook");
            catalog.missing_sheets.push(sheet.to_string());
            return Ok(None);
        }
        workbook.worksheet_range(sheet).map(Some).map_err(|e| {
            ServiceError::InvalidInput(format!("Failed to read sheet {}: {}", sheet, e))
        })
    };

    let mut prefectures = Vec::with_capacity(PREFECTURES.len());
    for prefecture in PREFECTURES {
        let municipalities = load(workbook, prefecture.postal_sheet)?
            .map(|range| parse_municipalities(&range));
        let items = load(workbook, prefecture.item_sheet)?.map(|range| parse_master_items(&range));
        prefectures.push(PrefectureData {
            prefecture,
            municipalities,
            items,
        });
    }
    catalog.prefectures = prefectures;

    Ok(catalog)
}

fn db_error(context: &'static str) -> impl FnOnce(sea_orm::DbErr) -> ServiceError {
    move |e| {
        error!(error = %e, context, "Catalog seed failed");
        ServiceError::DatabaseError(e)
    }
}

fn inserted_rows(result: TryInsertResult<u64>) -> u64 {
    match result {
        TryInsertResult::Inserted(rows) => rows,
        TryInsertResult::Empty | TryInsertResult::Conflicted => 0,
    }
}

/// Writes the parsed catalog. Regions and municipalities are idempotent;
/// with `replace_items` the region's existing master items are removed first.
pub async fn seed_catalog<C: ConnectionTrait>(
    db: &C,
    catalog: &CatalogWorkbook,
    replace_items: bool,
) -> Result<SeedSummary, ServiceError> {
    let mut summary = SeedSummary::default();

    let regions: Vec<region::ActiveModel> = catalog
        .prefectures
        .iter()
        .map(|data| region::ActiveModel {
            code: Set(data.prefecture.code),
            name: Set(data.prefecture.name.to_string()),
            short_name: Set(data.prefecture.short_name.to_string()),
            is_active: Set(true),
            ..Default::default()
        })
        .collect();
    region::Entity::insert_many(regions)
        .on_conflict(OnConflict::column(region::Column::Code).do_nothing().to_owned())
        .do_nothing()
        .exec_without_returning(db)
        .await
        .map_err(db_error("insert regions"))?;

    let region_ids: HashMap<i32, i32> = region::Entity::find()
        .all(db)
        .await
        .map_err(db_error("reload regions"))?
        .into_iter()
        .map(|r| (r.code, r.id))
        .collect();
    summary.regions = region_ids.len();

    for data in &catalog.prefectures {
        let Some(&region_id) = region_ids.get(&data.prefecture.code) else {
            continue;
        };

        if let Some(names) = &data.municipalities {
            for batch in names.chunks(MUNICIPALITY_BATCH) {
                let rows = batch.iter().map(|name| municipality::ActiveModel {
                    region_id: Set(region_id),
                    name: Set(name.clone()),
                    is_active: Set(true),
                    ..Default::default()
                });
                let result = municipality::Entity::insert_many(rows)
                    .on_conflict(
                        OnConflict::columns([
                            municipality::Column::RegionId,
                            municipality::Column::Name,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .do_nothing()
                    .exec_without_returning(db)
                    .await
                    .map_err(db_error("insert municipalities"))?;
                summary.municipalities += inserted_rows(result);
            }
            info!(
                region = data.prefecture.name,
                count = names.len(),
                "Municipalities loaded"
            );
        }

        if let Some(items) = &data.items {
            if replace_items {
                master_item::Entity::delete_many()
                    .filter(master_item::Column::RegionId.eq(region_id))
                    .exec(db)
                    .await
                    .map_err(db_error("clear master items"))?;
            }

            let now = Utc::now();
            for (batch_idx, batch) in items.chunks(ITEM_BATCH).enumerate() {
                let offset = batch_idx * ITEM_BATCH;
                let rows = batch.iter().enumerate().map(|(idx, item)| master_item::ActiveModel {
                    region_id: Set(region_id),
                    municipality_name: Set(item.municipality_name.clone()),
                    description: Set(item.description.clone()),
                    quantity: Set(item.quantity.clone()),
                    unit: Set(item.unit.clone()),
                    cost_price: Set(item.cost_price),
                    selling_price: Set(item.selling_price),
                    lead_time_days: Set(item.lead_time_days),
                    sort_order: Set(i32::try_from(offset + idx).unwrap_or(i32::MAX)),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                });
                let result = master_item::Entity::insert_many(rows)
                    .do_nothing()
                    .exec_without_returning(db)
                    .await
                    .map_err(db_error("insert master items"))?;
                summary.items += inserted_rows(result);
            }
            info!(region = data.prefecture.name, count = items.len(), "Master items loaded");
        }
    }

    counter!("site_survey.catalog.items_seeded", summary.items);
    Ok(summary)
}
