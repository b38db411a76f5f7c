use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "e2e-accelerator")]
#[command(about = "Smoke-run API calls and database queries for end-to-end tests")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, global = true, help = "Read variables from this file instead of ./.env")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in with TESTUSERNAME/PASSWORD and report whether a token came back
    Login,

    /// Fetch a user by id (after logging in)
    User { id: u64 },

    /// List products with optional pagination and field selection
    Products {
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        skip: Option<u32>,

        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },

    /// List product categories
    Categories,

    /// Delete a product by id
    DeleteProduct { id: u64 },

    /// Run SQL against the database selected by DB_ENGINE
    Query {
        sql: String,

        /// Positional bind parameter as JSON (repeatable), e.g. --param 1 --param '"abc"'
        #[arg(long = "param")]
        params: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products_with_selection() {
        let config = CliConfig::parse_from([
            "e2e-accelerator",
            "products",
            "--limit",
            "3",
            "--skip",
            "0",
            "--select",
            "title,price",
        ]);

        match config.command {
            Command::Products { limit, skip, select } => {
                assert_eq!(limit, Some(3));
                assert_eq!(skip, Some(0));
                assert_eq!(select, vec!["title", "price"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_query_with_params_and_global_flags() {
        let config = CliConfig::parse_from([
            "e2e-accelerator",
            "query",
            "SELECT * FROM auth_user WHERE id = $1",
            "--param",
            "1",
            "--verbose",
        ]);

        assert!(config.verbose);
        match config.command {
            Command::Query { sql, params } => {
                assert!(sql.contains("$1"));
                assert_eq!(params, vec!["1"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
