//! Initial schema for Starjar.
//!
//! - `users`: parent accounts
//! - `children`: child profiles, with their own login
//! - `rewards`: the reward catalog
//! - `point_transactions`: append-only ledger, one row per EARN/SPEND
//! - `purchases`: purchase requests and their status

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Children {
    Table,
    Id,
    Name,
    BirthDate,
    ProfileImage,
    Username,
    AuthKey,
    CreatedAt,
}

#[derive(Iden)]
enum Rewards {
    Table,
    Id,
    Name,
    Description,
    RequiredPoints,
    Category,
    ImageUrl,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum PointTransactions {
    Table,
    Id,
    ChildId,
    Kind,
    Points,
    Reason,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    ChildId,
    RewardId,
    CostPoints,
    Status,
    RequestedAt,
    DecidedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Children
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Children::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Children::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Children::Name).string().not_null())
                    .col(ColumnDef::new(Children::BirthDate).date())
                    .col(ColumnDef::new(Children::ProfileImage).string())
                    .col(
                        ColumnDef::new(Children::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Children::AuthKey).string().not_null())
                    .col(ColumnDef::new(Children::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Rewards
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rewards::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rewards::Name).string().not_null())
                    .col(ColumnDef::new(Rewards::Description).string())
                    .col(
                        ColumnDef::new(Rewards::RequiredPoints)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rewards::Category)
                            .string()
                            .not_null()
                            .default("OTHER"),
                    )
                    .col(ColumnDef::new(Rewards::ImageUrl).string())
                    .col(
                        ColumnDef::new(Rewards::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Rewards::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Point transactions (ledger)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::ChildId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(PointTransactions::Points)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(PointTransactions::Points).gt(0)),
                    )
                    .col(ColumnDef::new(PointTransactions::Reason).string())
                    .col(ColumnDef::new(PointTransactions::Message).string())
                    .col(
                        ColumnDef::new(PointTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-point_transactions-child_id")
                            .from(PointTransactions::Table, PointTransactions::ChildId)
                            .to(Children::Table, Children::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-point_transactions-child_id")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::ChildId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Purchases
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::ChildId).big_integer().not_null())
                    .col(ColumnDef::new(Purchases::RewardId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::CostPoints)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Purchases::CostPoints).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Purchases::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Purchases::RequestedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Purchases::DecidedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-child_id")
                            .from(Purchases::Table, Purchases::ChildId)
                            .to(Children::Table, Children::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-reward_id")
                            .from(Purchases::Table, Purchases::RewardId)
                            .to(Rewards::Table, Rewards::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-child_id-status")
                    .table(Purchases::Table)
                    .col(Purchases::ChildId)
                    .col(Purchases::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rewards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Children::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
