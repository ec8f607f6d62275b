use clap::{Parser, Subcommand};
use colored::Colorize;
use dashstore::{Config, Dashboard, NewPost, NewUser, Post, PostPatch, Reply, Tags, UserPatch, seed};
use eyre::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "dashstore")]
#[command(about = "dashstore CLI - In-memory users/posts dashboard with filtering, pagination and stats")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/dashstore/dashstore.yml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load users.jsonl and posts.jsonl from this directory instead of demo data
    #[arg(long)]
    seed_dir: Option<PathBuf>,

    /// Write both collections as JSONL to this directory after the command
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Start with empty collections when no seed directory is given
    #[arg(long)]
    no_demo: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage posts
    Posts {
        #[command(subcommand)]
        action: PostCommand,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
}

#[derive(Subcommand)]
enum PostCommand {
    /// List posts, optionally filtered and paginated
    List {
        /// Exact category, case-insensitive
        #[arg(long)]
        category: Option<String>,
        /// Substring of the author name, case-insensitive
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        limit: Option<String>,
    },

    /// Show one post
    Get { id: u64 },

    /// Create a post
    Create {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Repeat for several tags
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update fields of a post
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Replaces all tags; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        likes: Option<u64>,
    },

    /// Delete a post
    Delete { id: u64 },

    /// Like a post
    Like {
        id: u64,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        times: u32,
    },

    /// Post totals and per-category breakdown
    Stats,
}

#[derive(Subcommand)]
enum UserCommand {
    /// List users, optionally filtered by role and paginated
    List {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        limit: Option<String>,
    },

    /// Show one user
    Get { id: u64 },

    /// Create a user
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },

    /// Update fields of a user
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },

    /// Delete a user
    Delete { id: u64 },

    /// User totals per role
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stdout is reserved for the JSON envelope
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.seed_dir {
        config.seed_dir = Some(dir.clone());
    }
    if cli.no_demo {
        config.demo_data = false;
    }

    let mut dashboard = Dashboard::from_config(&config)?;

    let summarize = matches!(
        cli.command,
        Commands::Posts {
            action: PostCommand::List { .. }
        }
    );
    let reply = match cli.command {
        Commands::Posts { action } => run_posts(&mut dashboard, action),
        Commands::Users { action } => run_users(&mut dashboard, action),
    };

    print_reply(&reply)?;
    if summarize {
        print_post_summaries(&reply);
    }

    if let Some(dir) = &cli.export_dir {
        seed::export_store(dir, dashboard.users())?;
        seed::export_store(dir, dashboard.posts())?;
    }

    if !reply.is_success() {
        process::exit(1);
    }

    Ok(())
}

fn run_posts(dashboard: &mut Dashboard, action: PostCommand) -> Reply {
    match action {
        PostCommand::List {
            category,
            author,
            page,
            limit,
        } => {
            let query = query_map([
                ("category", category),
                ("author", author),
                ("page", page),
                ("limit", limit),
            ]);
            dashboard.list_posts(&query)
        }
        PostCommand::Get { id } => dashboard.get_post(id),
        PostCommand::Create {
            title,
            content,
            author,
            category,
            tags,
        } => dashboard.create_post(NewPost {
            title,
            content,
            author,
            category,
            tags: tags_arg(tags),
        }),
        PostCommand::Update {
            id,
            title,
            content,
            author,
            category,
            tags,
            likes,
        } => dashboard.update_post(
            id,
            PostPatch {
                title,
                content,
                author,
                category,
                tags: tags_arg(tags),
                likes,
            },
        ),
        PostCommand::Delete { id } => dashboard.delete_post(id),
        PostCommand::Like { id, times } => {
            let mut reply = dashboard.like_post(id);
            for _ in 1..times {
                if !reply.is_success() {
                    break;
                }
                reply = dashboard.like_post(id);
            }
            reply
        }
        PostCommand::Stats => dashboard.post_stats(),
    }
}

fn run_users(dashboard: &mut Dashboard, action: UserCommand) -> Reply {
    match action {
        UserCommand::List { role, page, limit } => {
            let query = query_map([("role", role), ("page", page), ("limit", limit)]);
            dashboard.list_users(&query)
        }
        UserCommand::Get { id } => dashboard.get_user(id),
        UserCommand::Create { name, email, role } => dashboard.create_user(NewUser { name, email, role }),
        UserCommand::Update { id, name, email, role } => dashboard.update_user(id, UserPatch { name, email, role }),
        UserCommand::Delete { id } => dashboard.delete_user(id),
        UserCommand::Stats => dashboard.user_stats(),
    }
}

/// Collect the supplied query-string style arguments
fn query_map<const N: usize>(pairs: [(&str, Option<String>); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}

fn tags_arg(tags: Vec<String>) -> Option<Tags> {
    if tags.is_empty() { None } else { Some(Tags::Many(tags)) }
}

fn print_reply(reply: &Reply) -> Result<()> {
    let status = reply.status.to_string();
    let status = if reply.is_success() {
        status.green().bold()
    } else if reply.status >= 500 {
        status.red().bold()
    } else {
        status.yellow().bold()
    };
    eprintln!("{} {}", status, reply.body.message);

    println!("{}", serde_json::to_string_pretty(&reply.body)?);
    Ok(())
}

fn print_post_summaries(reply: &Reply) {
    let Some(data) = &reply.body.data else {
        return;
    };
    let Ok(posts) = serde_json::from_value::<Vec<Post>>(data.clone()) else {
        return;
    };

    for post in posts {
        eprintln!(
            "  {} {} {}",
            format!("#{}", post.id).cyan(),
            post.title.bold(),
            format!("({} min read, {} likes)", post.reading_time(), post.likes).dimmed()
        );
        eprintln!("     {}", post.excerpt().dimmed());
    }
}
