use std::{error::Error, io::Write};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Actor, Engine, RewardCategory};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod children {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "children")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub birth_date: Option<Date>,
        pub profile_image: Option<String>,
        pub username: String,
        pub auth_key: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod rewards {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "rewards")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
        pub required_points: i64,
        pub category: String,
        pub image_url: Option<String>,
        pub active: bool,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "starjar_admin")]
#[command(about = "Admin utilities for Starjar (parents, children, rewards)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./starjar.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Parent(Parent),
    Child(Child),
    Reward(Reward),
    /// Print a child's derived balance.
    Balance(BalanceArgs),
}

#[derive(Args, Debug)]
struct Parent {
    #[command(subcommand)]
    command: ParentCommand,
}

#[derive(Subcommand, Debug)]
enum ParentCommand {
    Create(ParentCreateArgs),
}

#[derive(Args, Debug)]
struct ParentCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Child {
    #[command(subcommand)]
    command: ChildCommand,
}

#[derive(Subcommand, Debug)]
enum ChildCommand {
    Create(ChildCreateArgs),
}

#[derive(Args, Debug)]
struct ChildCreateArgs {
    #[arg(long)]
    name: String,
    /// Login name; the auth key is prompted.
    #[arg(long)]
    username: String,
    /// `YYYY-MM-DD`
    #[arg(long)]
    birth_date: Option<NaiveDate>,
    #[arg(long)]
    profile_image: Option<String>,
}

#[derive(Args, Debug)]
struct Reward {
    #[command(subcommand)]
    command: RewardCommand,
}

#[derive(Subcommand, Debug)]
enum RewardCommand {
    Create(RewardCreateArgs),
    Deactivate(RewardDeactivateArgs),
}

#[derive(Args, Debug)]
struct RewardCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    points: i64,
    /// TOY, SNACK, EXPERIENCE, MONEY or OTHER.
    #[arg(long, default_value = "OTHER")]
    category: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(Args, Debug)]
struct RewardDeactivateArgs {
    #[arg(long)]
    id: i64,
}

#[derive(Args, Debug)]
struct BalanceArgs {
    #[arg(long)]
    child_id: i64,
}

fn parse_category(raw: &str) -> Result<RewardCategory, String> {
    RewardCategory::try_from(raw.to_uppercase().as_str()).map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_secret_twice(label: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password(&format!("{label}: "))?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!("{label} must not be empty.\r\n"))
            )?;
            continue;
        }

        let p2 = prompt_password(&format!("Confirm {}: ", label.to_lowercase()))?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(format!("{label}s do not match. Try again.\r\n"))
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Parent(Parent {
            command: ParentCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("parent already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = prompt_secret_twice("Password")?;
            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created parent: {}", args.username);
        }
        Command::Child(Child {
            command: ChildCommand::Create(args),
        }) => {
            if children::Entity::find()
                .filter(children::Column::Username.eq(args.username.clone()))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("child username already taken: {}", args.username);
                std::process::exit(1);
            }

            let auth_key = prompt_secret_twice("Auth key")?;
            let child = children::ActiveModel {
                name: Set(args.name.clone()),
                birth_date: Set(args.birth_date),
                profile_image: Set(args.profile_image),
                username: Set(args.username),
                auth_key: Set(auth_key),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            let child = child.insert(&db).await?;

            println!("created child: {} ({})", args.name, child.id);
        }
        Command::Reward(Reward {
            command: RewardCommand::Create(args),
        }) => {
            if args.points <= 0 {
                eprintln!("points must be > 0");
                std::process::exit(2);
            }
            let category = match parse_category(&args.category) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let reward = rewards::ActiveModel {
                name: Set(args.name.clone()),
                description: Set(args.description),
                required_points: Set(args.points),
                category: Set(category.as_str().to_string()),
                image_url: Set(args.image_url),
                active: Set(true),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            let reward = reward.insert(&db).await?;

            println!("created reward: {} ({})", args.name, reward.id);
        }
        Command::Reward(Reward {
            command: RewardCommand::Deactivate(args),
        }) => {
            let Some(reward) = rewards::Entity::find_by_id(args.id).one(&db).await? else {
                eprintln!("reward not found: {}", args.id);
                std::process::exit(1);
            };

            let mut reward: rewards::ActiveModel = reward.into();
            reward.active = Set(false);
            reward.update(&db).await?;

            println!("deactivated reward: {}", args.id);
        }
        Command::Balance(args) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let balance = engine
                .balance(&Actor::parent("admin"), args.child_id)
                .await?;
            println!(
                "child {}: total {}, reserved {}, available {}",
                args.child_id,
                balance.total_points,
                balance.reserved_points,
                balance.available_points
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_case_insensitive() {
        assert_eq!(parse_category("snack").unwrap(), RewardCategory::Snack);
        assert_eq!(parse_category("TOY").unwrap(), RewardCategory::Toy);
        assert!(parse_category("pony").is_err());
    }

    #[test]
    fn cli_parses_child_create() {
        let cli = Cli::try_parse_from([
            "starjar_admin",
            "child",
            "create",
            "--name",
            "Anna",
            "--username",
            "anna",
            "--birth-date",
            "2017-04-02",
        ])
        .unwrap();
        let Command::Child(Child {
            command: ChildCommand::Create(args),
        }) = cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(args.birth_date, NaiveDate::from_ymd_opt(2017, 4, 2));
    }
}
