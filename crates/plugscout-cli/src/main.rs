use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use plugscout_core::{CatalogStore, Config, Error, FavoritesStore, JsonFileBackend, PageAssembler};
use plugscout_store::CatalogDb;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Parser)]
#[command(name = "plugscout")]
#[command(version, about = "Terminal browser for the Obsidian plugin catalog", long_about = None)]
struct Cli {
    /// Catalog database (overrides the config file)
    #[arg(long, global = true, env = "PLUGSCOUT_DB")]
    db: Option<PathBuf>,

    /// Favorites file (overrides the config file)
    #[arg(long, global = true)]
    favorites: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show a plugin page with similar plugins
    Show {
        /// Plugin id
        slug: String,
    },
    /// List recently released plugins
    Updates {
        /// Trailing window in days
        #[arg(long)]
        days: Option<i64>,
    },
    /// List every plugin id in the catalog
    Paths,
    /// Toggle a plugin in the favorites
    Favorite {
        /// Plugin id
        slug: String,
    },
    /// List favorite plugins
    Favorites,
    /// Load a catalog dump (JSON array) into the database
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging - stdout is for pages, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plugscout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let db_path = match cli.db {
        Some(path) => path,
        None => config.catalog.database_path()?,
    };
    let favorites_backend = match cli.favorites {
        Some(path) => JsonFileBackend::new(path),
        None => config.favorites.backend()?,
    };

    let Some(command) = cli.command else {
        println!("No command specified. Try --help");
        return Ok(());
    };

    let now = Utc::now();
    let deny_list = config.discovery.deny_list();

    match command {
        Commands::Show { slug } => {
            tracing::info!("Showing plugin: {}", slug);
            let db = open_catalog(&db_path)?;
            let pages = PageAssembler::new(&db, &deny_list, FavoritesStore::load(&favorites_backend))
                .with_new_plugin_days(config.discovery.new_plugin_days)
                .at(now);

            let page = pages.plugin_page(&slug)?;
            println!("{}", render::plugin_page(&page, now));
        }
        Commands::Updates { days } => {
            let days = days.unwrap_or(config.discovery.updates_window_days);
            let db = open_catalog(&db_path)?;
            let pages = PageAssembler::new(&db, &deny_list, FavoritesStore::load(&favorites_backend))
                .with_new_plugin_days(config.discovery.new_plugin_days)
                .at(now);

            let page = pages.updates_page(days)?;
            println!("{}", render::updates_page(&page, now));
        }
        Commands::Paths => {
            let db = open_catalog(&db_path)?;
            let pages = PageAssembler::new(&db, &deny_list, FavoritesStore::default());
            for id in pages.catalog_paths()? {
                println!("{}", id);
            }
        }
        Commands::Favorite { slug } => {
            let db = open_catalog(&db_path)?;
            if db.find_plugin_by_id(&slug)?.is_none() {
                return Err(Error::NotFound(slug).into());
            }

            let favorites = FavoritesStore::load(&favorites_backend);
            let added = favorites.toggle(&slug);
            favorites.persist(&favorites_backend)?;

            if added {
                println!("🤩 Added {} to favorites", slug);
            } else {
                println!("Removed {} from favorites", slug);
            }
        }
        Commands::Favorites => {
            let favorites = FavoritesStore::load(&favorites_backend);
            if favorites.is_empty() {
                println!("No favorites yet. Add one with `plugscout favorite <id>`");
            }
            for id in favorites.ids() {
                println!("{}", id);
            }
        }
        Commands::Import { file } => {
            let db = open_catalog(&db_path)?;
            let count = db
                .import_file(&file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("Imported {} plugins into {}", count, db_path.display());
        }
    }

    Ok(())
}

fn open_catalog(path: &std::path::Path) -> anyhow::Result<CatalogDb> {
    tracing::debug!("Opening catalog at {}", path.display());
    CatalogDb::open(path).with_context(|| format!("Failed to open catalog at {}", path.display()))
}
