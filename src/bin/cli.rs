use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use mamnon::mamnon_config::{AssignmentPolicy, StorageBackend, StorageConfig};
use mamnon::mamnon_models::classes::CopyClassesDto;
use mamnon::mamnon_models::grades::Grade;
use mamnon::mamnon_models::ids::{AcademicYearId, UserId};
use mamnon::mamnon_observability::{LoggingConfig, init_tracing};
use mamnon::modules::classes::ClassService;
use mamnon::state::init_store;
use mamnon::store::PrefixedCodeGenerator;

#[derive(Parser)]
#[command(name = "mamnon-cli")]
#[command(about = "Mamnon CLI - Administrative tools for the Mamnon API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Copy every class of one academic year into an empty, active one
    CopyClasses {
        /// Source academic year ID
        #[arg(short = 'f', long)]
        from: AcademicYearId,

        /// Destination academic year ID (must be active and have no classes)
        #[arg(short = 't', long)]
        to: AcademicYearId,

        /// ID of the user performing the copy; scopes the school
        #[arg(short = 'u', long)]
        user: UserId,
    },
    /// Print the age groups offered for a grade
    AgeGroups {
        /// Grade label, e.g. "Mầm"
        #[arg(short = 'g', long)]
        grade: Grade,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let _log_guard = init_tracing(&LoggingConfig::from_env());

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => handle_migrate().await,
        Commands::CopyClasses { from, to, user } => handle_copy_classes(from, to, user).await,
        Commands::AgeGroups { grade } => handle_age_groups(grade),
    }
}

fn load_storage_config() -> StorageConfig {
    match StorageConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Invalid storage configuration: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_migrate() {
    let config = load_storage_config();
    if config.backend != StorageBackend::Postgres {
        eprintln!("\n❌ Migrations only apply to the postgres backend");
        std::process::exit(1);
    }

    let Some(database_url) = config.database_url.as_deref() else {
        eprintln!("\n❌ DATABASE_URL must be set");
        std::process::exit(1);
    };

    let pool = match mamnon::mamnon_db::init_db_pool(database_url, config.max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("\n❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match mamnon::mamnon_db::run_migrations(&pool).await {
        Ok(_) => println!("\n✅ Migrations applied successfully!"),
        Err(e) => {
            eprintln!("\n❌ Error running migrations: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_copy_classes(from: AcademicYearId, to: AcademicYearId, user: UserId) {
    let config = load_storage_config();
    let store = match init_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("\n❌ Failed to open storage: {:#}", e);
            std::process::exit(1);
        }
    };

    let policy = AssignmentPolicy::from_env();
    let codes = Arc::new(PrefixedCodeGenerator::new(policy.class_code_prefix.clone()));
    let service = ClassService::new(store, codes, policy);

    let dto = CopyClassesDto {
        from_academic_year_id: from,
        to_academic_year_id: to,
    };

    match service.copy_classes(user, dto).await {
        Ok(result) => {
            println!("\n✅ Copied {} classes", result.count);
            for class in &result.classes {
                let teacher = class
                    .home_room_teacher
                    .as_ref()
                    .map(|t| format!("{} {}", t.first_name, t.last_name))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "   {} | {} | {} | {}",
                    class.class_code, class.grade, class.name, teacher
                );
            }
        }
        Err(e) => {
            eprintln!("\n❌ Error copying classes: {}", e);
            std::process::exit(1);
        }
    }
}

fn handle_age_groups(grade: Grade) {
    let response = ClassService::age_groups(grade);
    println!("{}:", response.grade);
    for age_group in response.age_groups {
        println!("   {}", age_group);
    }
}
