use clap::Parser;
use listing_tracker::config::cli::{trait_map, Cli, Command};
use listing_tracker::config::LogFormat;
use listing_tracker::utils::error::ErrorSeverity;
use listing_tracker::utils::{logger, validation::Validate};
use listing_tracker::{
    AppConfig, HttpMetadataFetcher, Listing, ListingFilter, ListingUpdate, LocalStorage,
    NewListing, TrackerApp, TrackerError,
};

type App = TrackerApp<LocalStorage, HttpMetadataFetcher>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    // 初始化日誌
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }
    tracing::debug!("Effective config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let fetcher = if config.metadata.enabled {
        Some(HttpMetadataFetcher::new(&config.metadata)?)
    } else {
        None
    };
    let storage = LocalStorage::new(config.storage.data_dir.clone());
    let app = TrackerApp::new(storage, fetcher, &config);

    if let Err(e) = run(&app, cli.command).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,      // 找不到資料
            ErrorSeverity::Medium => 2,   // 網路錯誤，可重試
            ErrorSeverity::High => 1,     // 輸入或設定錯誤
            ErrorSeverity::Critical => 3, // 儲存錯誤
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(app: &App, command: Command) -> Result<(), TrackerError> {
    match command {
        Command::List { tags, traits } => {
            let filter = ListingFilter {
                tags,
                traits: traits.into_iter().collect(),
            };
            let listings = app.list(&filter).await?;
            if listings.is_empty() {
                println!("No listings found");
            }
            for listing in &listings {
                print_summary(listing);
            }
        }
        Command::Show { id } => print_details(&app.show(&id).await?),
        Command::Add {
            url,
            title,
            tags,
            traits,
            image,
            no_fetch,
        } => {
            let draft = NewListing {
                title: title.unwrap_or_default(),
                url,
                tags,
                image_url: image,
                traits: trait_map(traits),
            };
            let outcome = app.add(draft, !no_fetch).await?;
            if let Some(notice) = &outcome.notice {
                eprintln!("⚠️ {}", notice);
            }
            println!("✅ Added listing {}", outcome.listing.id);
            print_details(&outcome.listing);
        }
        Command::Edit {
            id,
            title,
            url,
            tags,
            clear_tags,
            traits,
            image,
        } => {
            let tags = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(tags)
            };
            let update = ListingUpdate {
                title,
                url,
                tags,
                image_url: image,
                traits: traits.into_iter().collect(),
            };
            let listing = app.edit(&id, update).await?;
            println!("✅ Updated listing {}", listing.id);
        }
        Command::Delete { id } => {
            if app.delete(&id).await? {
                println!("🗑️ Listing deleted");
            } else {
                println!("Listing not found: {}", id);
            }
        }
        Command::Tags => {
            for tag in app.tags().await? {
                println!("{}", tag);
            }
        }
        Command::Traits => {
            for name in app.traits().await? {
                println!("{}", name);
            }
        }
        Command::AddTrait { name } => {
            if app.add_trait(&name).await? {
                println!("✅ Trait '{}' added", name.trim());
            } else {
                println!("Trait '{}' already exists or is empty", name.trim());
            }
        }
        Command::Export { output, format } => {
            let path = app.export(&output, format).await?;
            println!("📁 Listings exported to: {}", path.display());
        }
        Command::Import { file } => {
            if app.import(&file).await? {
                println!("✅ Import successful");
            } else {
                return Err(TrackerError::ValidationError {
                    message: format!("Import failed: {} has an invalid format", file.display()),
                });
            }
        }
        Command::FetchMetadata { url } => {
            let metadata = app.fetch_metadata(&url).await?;
            println!("title: {}", metadata.title.as_deref().unwrap_or("-"));
            println!("image: {}", metadata.image_url.as_deref().unwrap_or("-"));
        }
    }

    Ok(())
}

fn print_summary(listing: &Listing) {
    let tags = if listing.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", listing.tags.join(", "))
    };
    println!("{}  {}{}", listing.id, listing.title, tags);
}

fn print_details(listing: &Listing) {
    println!("📋 {}", listing.title);
    println!("  ID: {}", listing.id);
    println!("  URL: {}", listing.url);
    if let Some(image_url) = listing.image_url.as_deref().filter(|s| !s.is_empty()) {
        println!("  Image: {}", image_url);
    }
    if !listing.tags.is_empty() {
        println!("  Tags: {}", listing.tags.join(", "));
    }
    for (name, value) in listing.traits.iter().flatten() {
        println!("  {}: {}", name, value);
    }
}
