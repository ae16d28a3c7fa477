use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, FieldErrors, Role, User as Account, UserInput, validate_password};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "ristoro_admin")]
#[command(about = "Admin utilities for Ristoro (bootstrap users, staff restaurants)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ristoro.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Employee(Employee),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account; the password is prompted for.
    Create(UserCreateArgs),
    /// List the accounts holding a role.
    List(UserListArgs),
    Activate(UserIdArgs),
    Deactivate(UserIdArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Owner,
    Employee,
    Customer,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Owner => Role::Owner,
            RoleArg::Employee => Role::Employee,
            RoleArg::Customer => Role::Customer,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value = "owner")]
    role: RoleArg,
    #[arg(long)]
    phone_number: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    /// Only read for employees.
    #[arg(long)]
    designation: Option<String>,
    #[arg(long)]
    superuser: bool,
}

#[derive(Args, Debug)]
struct UserListArgs {
    #[arg(long, value_enum)]
    role: RoleArg,
}

#[derive(Args, Debug)]
struct UserIdArgs {
    #[arg(long)]
    id: i32,
}

#[derive(Args, Debug)]
struct Employee {
    #[command(subcommand)]
    command: EmployeeCommand,
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    /// Move an employee to a restaurant, or off any restaurant when
    /// `--restaurant` is omitted.
    Assign(EmployeeAssignArgs),
}

#[derive(Args, Debug)]
struct EmployeeAssignArgs {
    #[arg(long)]
    user: i32,
    #[arg(long)]
    restaurant: Option<i32>,
    #[arg(long)]
    designation: Option<String>,
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

fn notice(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    out.flush()?;
    Ok(())
}

/// Ask for a password until it passes the account password rules and is
/// confirmed.
fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let password = prompt_password("Password: ")?;
        let mut errors = FieldErrors::new();
        validate_password(&password, &mut errors);
        if let Some(messages) = errors.get("password") {
            for message in messages {
                notice(message)?;
            }
            continue;
        }

        if prompt_password("Confirm password: ")? == password {
            return Ok(password);
        }
        notice("Passwords do not match. Try again.")?;
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

fn print_user(user: &Account) {
    let status = if user.is_active { "active" } else { "inactive" };
    let superuser = if user.is_superuser { ", superuser" } else { "" };
    println!(
        "{:>5}  {:<20} {} {} ({status}{superuser})",
        user.id, user.username, user.first_name, user.last_name
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User { command }) => match command {
            UserCommand::Create(args) => {
                let password = prompt_password_twice()?;
                let role = Role::from(args.role);
                let input = UserInput {
                    username: Some(args.username),
                    password: Some(password),
                    user_type: Some(role.as_str().to_string()),
                    email: args.email,
                    first_name: args.first_name,
                    last_name: args.last_name,
                    phone_number: Some(args.phone_number),
                    address: Some(args.address),
                    designation: args.designation,
                };
                match engine.create_user(input, args.superuser).await {
                    Ok(user) => println!("created {role} {} ({})", user.username, user.id),
                    Err(err) => {
                        eprintln!("{err}");
                        std::process::exit(1);
                    }
                }
            }
            UserCommand::List(args) => {
                for user in engine.users_by_role(args.role.into()).await? {
                    print_user(&user);
                }
            }
            UserCommand::Activate(args) => {
                let user = engine.set_user_active(args.id, true).await?;
                println!("activated {}", user.username);
            }
            UserCommand::Deactivate(args) => {
                let user = engine.set_user_active(args.id, false).await?;
                println!("deactivated {}", user.username);
            }
        },
        Command::Employee(Employee {
            command: EmployeeCommand::Assign(args),
        }) => {
            let (user, employee) = engine
                .set_employee_restaurant(
                    args.user,
                    args.restaurant,
                    args.designation.as_deref(),
                )
                .await?;
            match employee.restaurant_id {
                Some(restaurant) => {
                    println!("{} now works at restaurant {restaurant}", user.username)
                }
                None => println!("{} is not assigned to any restaurant", user.username),
            }
        }
    }

    Ok(())
}
