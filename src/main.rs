//! CLI entry point for inkpost

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpost::{commands, server, Blog};

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(version)]
#[command(about = "A Markdown blog server with search and view/like counters", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Tags for the new post
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Print the search corpus as JSON
    Corpus {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search posts
    Search {
        /// Query; every word must match
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Print the table of contents of a post
    Toc {
        /// Post slug (file name without extension)
        slug: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpost=debug,info"
    } else {
        "inkpost=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Serve { port, ip, open } => {
            let blog = Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(blog, &ip, port, open).await?;
        }

        Commands::New { title, tag } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            blog.new_post(&title, &tag)?;
        }

        Commands::List { r#type } => {
            let blog = Blog::new(&base_dir)?;
            commands::list::run(&blog, &r#type)?;
        }

        Commands::Corpus { output } => {
            let blog = Blog::new(&base_dir)?;
            commands::corpus::run(&blog, output.as_deref())?;
        }

        Commands::Search { query } => {
            let blog = Blog::new(&base_dir)?;
            commands::search::run(&blog, &query.join(" "))?;
        }

        Commands::Toc { slug } => {
            let blog = Blog::new(&base_dir)?;
            commands::toc::run(&blog, &slug)?;
        }

        Commands::Version => {
            println!("inkpost version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
