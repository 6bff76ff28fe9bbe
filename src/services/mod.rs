// Pure domain logic
pub mod aggregation;
pub mod pricing;
pub mod reconciliation;

// Spreadsheet generation
pub mod documents;

// Database-backed services
pub mod catalog;
pub mod dashboard;
pub mod exports;
pub mod project_items;
pub mod projects;
pub mod surveys;

// Master workbook loader used by the seed-catalog binary
pub mod catalog_import;
