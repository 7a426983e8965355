use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Characters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Characters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Characters::Name).string().not_null())
                    .col(
                        ColumnDef::new(Characters::Star)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Characters::Rating)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Characters::Intro).text().not_null().default(""))
                    .col(ColumnDef::new(Characters::Remark).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Characters::Avatar)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Characters::FullLengthPicture)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Characters::TagIds)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Characters::GroupIds)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Characters::StaticCategories)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(ColumnDef::new(Assets::Star).boolean().not_null().default(false))
                    .col(ColumnDef::new(Assets::Rating).integer().not_null().default(0))
                    .col(ColumnDef::new(Assets::Intro).text().not_null().default(""))
                    .col(ColumnDef::new(Assets::Remark).text().not_null().default(""))
                    .col(ColumnDef::new(Assets::Path).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Assets::AssetType)
                            .string()
                            .not_null()
                            .default("file"),
                    )
                    .col(ColumnDef::new(Assets::TagIds).string().not_null().default(""))
                    .col(ColumnDef::new(Assets::GroupIds).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Assets::CharacterIds)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Assets::AssetSetIds)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Characters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Characters {
    Table,
    Id,
    Name,
    Star,
    Rating,
    Intro,
    Remark,
    Avatar,
    FullLengthPicture,
    TagIds,
    GroupIds,
    StaticCategories,
}

#[derive(Iden)]
enum Assets {
    Table,
    Id,
    Name,
    Star,
    Rating,
    Intro,
    Remark,
    Path,
    AssetType,
    TagIds,
    GroupIds,
    CharacterIds,
    AssetSetIds,
}
