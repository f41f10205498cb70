//! Core application

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use validator::Validate;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CatalogCommands, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, MAX_IMPORT_FILE_BYTES};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::{CatalogRepository, NewProduct, SqliteService};
use crate::utils::crypto::sha256_bytes_hex;
use crate::utils::file::{expand_path, read_limited};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => Self::handle_system_command(system_cmd),
            Some(Commands::Catalog {
                command: CatalogCommands::Import { file },
            }) => {
                let app = Self::init(&cli_config).await?;
                let result = app.import_catalog(&file).await;
                app.database.close().await;
                let count = result?;
                println!("Imported {} products from {}", count, file.display());
                Ok(())
            }
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;
        let database = Arc::new(
            SqliteService::init(&storage)
                .await
                .context("Failed to initialize database")?,
        );
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
        })
    }

    /// Load a JSON array of products into the catalog
    ///
    /// Every product is validated before anything is written; the insert is
    /// all-or-nothing.
    pub async fn import_catalog(&self, file: &Path) -> Result<usize> {
        let path = expand_path(&file.to_string_lossy());
        let bytes = read_limited(&path, MAX_IMPORT_FILE_BYTES).await?;
        let products: Vec<NewProduct> = serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid product file: {}", path.display()))?;

        for (index, product) in products.iter().enumerate() {
            product
                .validate()
                .with_context(|| format!("Product #{} ({}) is invalid", index + 1, product.name))?;
        }

        let stored = self
            .database
            .insert_products(&products)
            .await
            .context("Failed to import products")?;

        tracing::info!(
            count = stored.len(),
            path = %path.display(),
            sha256 = %sha256_bytes_hex(&bytes),
            "Catalog imported"
        );
        Ok(stored.len())
    }

    fn handle_system_command(cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory, product catalog included:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting data while the server is running will cause data corruption."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        app.shutdown.install_signal_handlers();
        app.start_background_tasks().await;

        if app.config.debug {
            tracing::warn!("Debug mode enabled, logging every request");
        }

        let product_count = app
            .database
            .count_products()
            .await
            .context("Failed to count products")?;
        if product_count == 0 {
            tracing::warn!("Catalog is empty, load products with `storefront catalog import <file>`");
        }

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.storage.data_dir().display().to_string(),
            product_count,
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::config::{CatalogConfig, PaypalConfig, ServerConfig};

    async fn test_app() -> CoreApp {
        let database = Arc::new(SqliteService::init_in_memory().await.unwrap());
        CoreApp {
            shutdown: ShutdownService::new(database.clone()),
            config: AppConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5000,
                },
                catalog: CatalogConfig::default(),
                paypal: PaypalConfig::default(),
                debug: false,
            },
            storage: AppStorage::init_for_test(PathBuf::from("/tmp/storefront-test")),
            database,
        }
    }

    fn write_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("products.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_import_catalog() {
        let app = test_app().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            r#"[
                { "name": "Airpods Wireless", "price": 89.99, "brand": "Apple", "category": ["Electronics"] },
                { "_id": "p2", "name": "iPhone 11 Pro", "price": 599.99, "rating": 4 }
            ]"#,
        );

        assert_eq!(app.import_catalog(&path).await.unwrap(), 2);
        assert_eq!(app.database.count_products().await.unwrap(), 2);
        assert!(app.database.get_product("p2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_product() {
        let app = test_app().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            r#"[
                { "name": "Valid", "price": 1 },
                { "name": "Broken", "price": -5 }
            ]"#,
        );

        let err = app.import_catalog(&path).await.unwrap_err();
        assert!(err.to_string().contains("Product #2 (Broken) is invalid"));
        assert_eq!(app.database.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_json() {
        let app = test_app().await;
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, r#"{ "name": "not an array" }"#);

        let err = app.import_catalog(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid product file"));
    }
}
