use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240401_000001_create_reference_tables::Migration),
            Box::new(m20240401_000002_create_projects_table::Migration),
            Box::new(m20240401_000003_create_project_surveys_table::Migration),
            Box::new(m20240401_000004_create_project_items_table::Migration),
        ]
    }
}

mod m20240401_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Regions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Regions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Regions::Code)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Regions::Name).string_len(50).not_null())
                        .col(ColumnDef::new(Regions::ShortName).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Regions::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Municipalities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Municipalities::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Municipalities::RegionId).integer().not_null())
                        .col(ColumnDef::new(Municipalities::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Municipalities::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_municipalities_region_id")
                                .from(Municipalities::Table, Municipalities::RegionId)
                                .to(Regions::Table, Regions::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_municipalities_region_name")
                        .table(Municipalities::Table)
                        .col(Municipalities::RegionId)
                        .col(Municipalities::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MasterItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MasterItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(MasterItems::RegionId).integer().not_null())
                        .col(
                            ColumnDef::new(MasterItems::MunicipalityName)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(ColumnDef::new(MasterItems::Description).text().not_null())
                        .col(
                            ColumnDef::new(MasterItems::Quantity)
                                .string_len(32)
                                .not_null()
                                .default("1"),
                        )
                        .col(
                            ColumnDef::new(MasterItems::Unit)
                                .string_len(20)
                                .not_null()
                                .default("式"),
                        )
                        .col(ColumnDef::new(MasterItems::CostPrice).big_integer().not_null())
                        .col(
                            ColumnDef::new(MasterItems::SellingPrice)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MasterItems::LeadTimeDays).integer().null())
                        .col(
                            ColumnDef::new(MasterItems::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MasterItems::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(MasterItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MasterItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_master_items_region_id")
                                .from(MasterItems::Table, MasterItems::RegionId)
                                .to(Regions::Table, Regions::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_master_items_region_sort")
                        .table(MasterItems::Table)
                        .col(MasterItems::RegionId)
                        .col(MasterItems::SortOrder)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MasterItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Municipalities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Regions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Regions {
        Table,
        Id,
        Code,
        Name,
        ShortName,
        IsActive,
    }

    #[derive(DeriveIden)]
    enum Municipalities {
        Table,
        Id,
        RegionId,
        Name,
        IsActive,
    }

    #[derive(DeriveIden)]
    pub(super) enum MasterItems {
        Table,
        Id,
        RegionId,
        MunicipalityName,
        Description,
        Quantity,
        Unit,
        CostPrice,
        SellingPrice,
        LeadTimeDays,
        SortOrder,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240401_000002_create_projects_table {

    use super::m20240401_000001_create_reference_tables::Regions;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000002_create_projects_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                        .col(
                            ColumnDef::new(Projects::ProjectNumber)
                                .string_len(50)
                                .null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Projects::PropertyName)
                                .string_len(500)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Projects::RegionId).integer().null())
                        .col(ColumnDef::new(Projects::Municipality).string_len(100).null())
                        .col(ColumnDef::new(Projects::LotNumber).string_len(500).null())
                        .col(ColumnDef::new(Projects::AddressDisplay).string_len(500).null())
                        .col(ColumnDef::new(Projects::SiteArea).decimal_len(10, 2).null())
                        .col(ColumnDef::new(Projects::BuildingScale).string_len(200).null())
                        .col(
                            ColumnDef::new(Projects::CityPlanningZone)
                                .string_len(200)
                                .null(),
                        )
                        .col(ColumnDef::new(Projects::FirePrevention).string_len(100).null())
                        .col(ColumnDef::new(Projects::Zoning).string_len(200).null())
                        .col(ColumnDef::new(Projects::HeightDistrict).string_len(200).null())
                        .col(ColumnDef::new(Projects::BuildingCoverage).decimal_len(5, 2).null())
                        .col(ColumnDef::new(Projects::FloorAreaRatio).decimal_len(5, 2).null())
                        .col(ColumnDef::new(Projects::CustomerName).string_len(200).null())
                        .col(
                            ColumnDef::new(Projects::Status)
                                .string_len(20)
                                .not_null()
                                .default("draft"),
                        )
                        .col(ColumnDef::new(Projects::EstimateNumber).string_len(50).null())
                        .col(ColumnDef::new(Projects::EstimateDate).date().null())
                        .col(ColumnDef::new(Projects::Notes).text().null())
                        .col(
                            ColumnDef::new(Projects::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Projects::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_region_id")
                                .from(Projects::Table, Projects::RegionId)
                                .to(Regions::Table, Regions::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_projects_status")
                        .table(Projects::Table)
                        .col(Projects::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_projects_created_at")
                        .table(Projects::Table)
                        .col(Projects::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Projects {
        Table,
        Id,
        ProjectNumber,
        PropertyName,
        RegionId,
        Municipality,
        LotNumber,
        AddressDisplay,
        SiteArea,
        BuildingScale,
        CityPlanningZone,
        FirePrevention,
        Zoning,
        HeightDistrict,
        BuildingCoverage,
        FloorAreaRatio,
        CustomerName,
        Status,
        EstimateNumber,
        EstimateDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240401_000003_create_project_surveys_table {

    use super::m20240401_000002_create_projects_table::Projects;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000003_create_project_surveys_table"
        }
    }

    fn text(col: ProjectSurveys) -> ColumnDef {
        ColumnDef::new(col).text().null().to_owned()
    }

    fn short(col: ProjectSurveys, len: u32) -> ColumnDef {
        ColumnDef::new(col).string_len(len).null().to_owned()
    }

    fn width(col: ProjectSurveys) -> ColumnDef {
        ColumnDef::new(col).decimal_len(5, 2).null().to_owned()
    }

    fn flag(col: ProjectSurveys) -> ColumnDef {
        ColumnDef::new(col).boolean().null().to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            use ProjectSurveys as S;

            manager
                .create_table(
                    Table::create()
                        .table(S::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(S::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(S::ProjectId).uuid().not_null().unique_key())
                        .col(text(S::DistrictPlan))
                        .col(text(S::DistrictPlanNotes))
                        .col(text(S::BuildingAgreement))
                        .col(text(S::BuildingAgreementNotes))
                        .col(text(S::Landscape))
                        .col(text(S::LandscapeNotes))
                        .col(text(S::BuriedCultural))
                        .col(text(S::BuriedCulturalNotes))
                        .col(short(S::Road1Type, 100))
                        .col(short(S::Road1Side, 50))
                        .col(text(S::Road1Name))
                        .col(short(S::Road1Character, 100))
                        .col(width(S::Road1Width))
                        .col(short(S::Road1Demarcation, 50))
                        .col(short(S::Road2Type, 100))
                        .col(short(S::Road2Side, 50))
                        .col(text(S::Road2Name))
                        .col(short(S::Road2Character, 100))
                        .col(width(S::Road2Width))
                        .col(short(S::Road2Demarcation, 50))
                        .col(short(S::Road3Type, 100))
                        .col(short(S::Road3Side, 50))
                        .col(text(S::Road3Name))
                        .col(short(S::Road3Character, 100))
                        .col(width(S::Road3Width))
                        .col(short(S::Road3Demarcation, 50))
                        .col(text(S::PublicSewerage))
                        .col(flag(S::SewerageLedger))
                        .col(text(S::SewerageNotes))
                        .col(text(S::WaterSupply))
                        .col(flag(S::WaterLedger))
                        .col(text(S::WaterNotes))
                        .col(text(S::Gas))
                        .col(text(S::GasNotes))
                        .col(text(S::ScenicDistrict))
                        .col(text(S::ScenicNotes))
                        .col(short(S::WallSetbackRoad, 100))
                        .col(short(S::WallSetbackAdjacent, 100))
                        .col(text(S::RetainingWallRegulation))
                        .col(text(S::RetainingWallNotes))
                        .col(text(S::SedimentControl))
                        .col(text(S::SedimentNotes))
                        .col(text(S::RiverConservation))
                        .col(width(S::RiverWidth))
                        .col(text(S::RiverNotes))
                        .col(text(S::Landslide))
                        .col(text(S::SteepSlope))
                        .col(text(S::DisasterWarning))
                        .col(text(S::FireDepartment))
                        .col(text(S::IntermediateInspection))
                        .col(text(S::HighriseRelated))
                        .col(text(S::DevelopmentGuidelines))
                        .col(text(S::CityPlanningFacility))
                        .col(text(S::ExtraNotes))
                        .col(
                            ColumnDef::new(S::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(S::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_surveys_project_id")
                                .from(S::Table, S::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProjectSurveys::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProjectSurveys {
        Table,
        Id,
        ProjectId,
        DistrictPlan,
        DistrictPlanNotes,
        BuildingAgreement,
        BuildingAgreementNotes,
        Landscape,
        LandscapeNotes,
        BuriedCultural,
        BuriedCulturalNotes,
        Road1Type,
        Road1Side,
        Road1Name,
        Road1Character,
        Road1Width,
        Road1Demarcation,
        Road2Type,
        Road2Side,
        Road2Name,
        Road2Character,
        Road2Width,
        Road2Demarcation,
        Road3Type,
        Road3Side,
        Road3Name,
        Road3Character,
        Road3Width,
        Road3Demarcation,
        PublicSewerage,
        SewerageLedger,
        SewerageNotes,
        WaterSupply,
        WaterLedger,
        WaterNotes,
        Gas,
        GasNotes,
        ScenicDistrict,
        ScenicNotes,
        WallSetbackRoad,
        WallSetbackAdjacent,
        RetainingWallRegulation,
        RetainingWallNotes,
        SedimentControl,
        SedimentNotes,
        RiverConservation,
        RiverWidth,
        RiverNotes,
        Landslide,
        SteepSlope,
        DisasterWarning,
        FireDepartment,
        IntermediateInspection,
        HighriseRelated,
        DevelopmentGuidelines,
        CityPlanningFacility,
        ExtraNotes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240401_000004_create_project_items_table {

    use super::m20240401_000001_create_reference_tables::MasterItems;
    use super::m20240401_000002_create_projects_table::Projects;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240401_000004_create_project_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProjectItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProjectItems::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProjectItems::ProjectId).uuid().not_null())
                        .col(ColumnDef::new(ProjectItems::SourceItemId).integer().null())
                        .col(ColumnDef::new(ProjectItems::Description).text().not_null())
                        .col(
                            ColumnDef::new(ProjectItems::Quantity)
                                .string_len(32)
                                .not_null()
                                .default("1"),
                        )
                        .col(
                            ColumnDef::new(ProjectItems::Unit)
                                .string_len(20)
                                .not_null()
                                .default("式"),
                        )
                        .col(
                            ColumnDef::new(ProjectItems::CostPrice)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectItems::SellingPrice)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectItems::IsSelected)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ProjectItems::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProjectItems::Notes).text().null())
                        .col(
                            ColumnDef::new(ProjectItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_items_project_id")
                                .from(ProjectItems::Table, ProjectItems::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_items_source_item_id")
                                .from(ProjectItems::Table, ProjectItems::SourceItemId)
                                .to(MasterItems::Table, MasterItems::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_project_items_project_sort")
                        .table(ProjectItems::Table)
                        .col(ProjectItems::ProjectId)
                        .col(ProjectItems::SortOrder)
                        .to_owned(),
                )
                .await?;

            // NULL source ids are distinct, so manual lines never collide
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_project_items_project_source")
                        .table(ProjectItems::Table)
                        .col(ProjectItems::ProjectId)
                        .col(ProjectItems::SourceItemId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProjectItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProjectItems {
        Table,
        Id,
        ProjectId,
        SourceItemId,
        Description,
        Quantity,
        Unit,
        CostPrice,
        SellingPrice,
        IsSelected,
        SortOrder,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}
