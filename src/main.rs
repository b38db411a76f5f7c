use clap::Parser;
use e2e_accelerator::config::DatabaseSettings;
use e2e_accelerator::domain::model::ListQuery;
use e2e_accelerator::utils::error::{AcceleratorError, ErrorSeverity};
use e2e_accelerator::utils::logger;
use e2e_accelerator::{create_client, AppConfig, CliConfig, Command, HttpOutcome, StoreApiClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting e2e-accelerator");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), AcceleratorError> {
    let outcome = match &config.command {
        Command::Query { sql, params } => {
            let settings = match &config.env_file {
                Some(path) => DatabaseSettings::from_dotenv_file(path)?,
                None => DatabaseSettings::from_env()?,
            };
            return run_query(&settings, sql, params).await;
        }
        Command::Login => {
            let (client, login) = logged_in_client(config).await?;
            if client.is_authenticated() {
                println!("✅ Logged in ({} {})", login.status.as_u16(), login.status_text);
            } else {
                println!(
                    "⚠️  Login returned no token ({} {})",
                    login.status.as_u16(),
                    login.status_text
                );
            }
            login
        }
        Command::User { id } => {
            let (client, _) = logged_in_client(config).await?;
            client.get_user_by_id(*id).await?
        }
        Command::Products { limit, skip, select } => {
            let (client, _) = logged_in_client(config).await?;
            let mut query = ListQuery::new().select(select);
            query.limit = *limit;
            query.skip = *skip;
            client.get_products(&query).await?
        }
        Command::Categories => {
            let (client, _) = logged_in_client(config).await?;
            client.get_products_categories().await?
        }
        Command::DeleteProduct { id } => {
            let (client, _) = logged_in_client(config).await?;
            client.delete_product_by_id(*id).await?
        }
    };

    print_outcome(&outcome)
}

async fn logged_in_client(
    config: &CliConfig,
) -> Result<(StoreApiClient, HttpOutcome), AcceleratorError> {
    let app = match &config.env_file {
        Some(path) => AppConfig::from_dotenv_file(path)?,
        None => AppConfig::from_env()?,
    };
    tracing::info!(environment = %app.environment, "Using API {}", app.api.base_url);

    let mut client = StoreApiClient::new(&app.api)?;
    let login = client.init().await?;
    Ok((client, login))
}

async fn run_query(
    settings: &DatabaseSettings,
    sql: &str,
    raw_params: &[String],
) -> Result<(), AcceleratorError> {
    let params = raw_params
        .iter()
        .map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()))
        })
        .collect::<Vec<_>>();

    let client = create_client(settings)?;
    client.connect().await?;
    let result = client.query(sql, &params).await;
    client.disconnect().await?;

    let result = result?;
    println!("✅ {} row(s) from {}", result.len(), client.engine());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn print_outcome(outcome: &HttpOutcome) -> Result<(), AcceleratorError> {
    println!("{} {}", outcome.status.as_u16(), outcome.status_text);
    let body = outcome.json_value();
    if body.is_null() {
        println!("{}", outcome.body);
    } else {
        println!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}
