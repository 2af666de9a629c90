//! newsletter-cli：从命令行管理订阅者
//!
//! Usage:
//!   newsletter-cli subscribe <email> [--pending]     Subscribe an address
//!   newsletter-cli unsubscribe <email>               Unsubscribe an address
//!   newsletter-cli is-subscribed <email>             Check subscription status
//!   newsletter-cli lists                             Show configured lists

use anyhow::{bail, Context};
use newsletter::{Newsletter, NewsletterConfig, NewsletterListCollection, Options};
use std::path::PathBuf;

struct Args {
    command: String,
    positional: Vec<String>,
    config: Option<PathBuf>,
    list: String,
    pending: bool,
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut list = String::new();
    let mut pending = false;

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--list" => {
                list = iter.next().context("--list requires a list name")?.clone();
            }
            "--pending" => pending = true,
            other if other.starts_with("--") => bail!("Unknown option: {other}"),
            other => positional.push(other.to_string()),
        }
    }

    if positional.is_empty() {
        bail!("missing command");
    }
    let command = positional.remove(0);

    Ok(Args {
        command,
        positional,
        config,
        list,
        pending,
    })
}

fn print_usage() {
    println!(
        r#"newsletter-cli: newsletter subscriber management

USAGE:
    newsletter-cli <COMMAND> [ARGS] [--config <path>] [--list <name>]

COMMANDS:
    subscribe <email> [--pending]   Subscribe an address
    subscribe-or-update <email>     Create or update a member
    add-member <email>              Add a contact without subscribing it
    unsubscribe <email>             Unsubscribe an address
    delete <email>                  Remove an address from the list
    member <email>                  Show a member record
    members                         List the members of a list
    activity <email>                Show a member's activity
    has-member <email>              Check list membership
    is-subscribed <email>           Check subscription status
    update-email <current> <new>    Change a member's address
    lists                           Show configured lists
    version                         Show version information
    help                            Show this help message

ENVIRONMENT:
    NEWSLETTER_CONFIG               Configuration file (YAML)
    MAIL_NEWSLETTER_DRIVER          mailchimp | mailjet | log | null
    MAIL_NEWSLETTER_LIST_ID         Id of the default list
    MAILCHIMP_APIKEY                Mailchimp API key
    MJ_APIKEY_PUBLIC                Mailjet public key
    MJ_APIKEY_PRIVATE               Mailjet private key
    RUST_LOG                        Log filter (e.g. newsletter=debug)"#
    );
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<NewsletterConfig> {
    let path = path.or_else(|| std::env::var("NEWSLETTER_CONFIG").ok().map(PathBuf::from));
    match path {
        Some(path) => NewsletterConfig::from_path(&path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(NewsletterConfig::from_env()),
    }
}

fn email_arg(args: &Args, index: usize) -> anyhow::Result<&str> {
    match args.positional.get(index) {
        Some(email) => Ok(email.as_str()),
        None => bail!("`{}` requires an email address", args.command),
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lists(config: &NewsletterConfig) -> anyhow::Result<()> {
    let lists = NewsletterListCollection::create_from_config(&config.lists)?;
    for list in lists.iter() {
        let marker = if list.name() == lists.default_list_name() {
            "*"
        } else {
            " "
        };
        println!("{} {:<20} {}", marker, list.name(), list.id());
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.clone())?;

    if args.command == "lists" {
        return print_lists(&config);
    }

    let newsletter = Newsletter::from_config(&config)?;
    let options = Options::new();
    let list = args.list.as_str();

    match args.command.as_str() {
        "subscribe" => {
            let email = email_arg(&args, 0)?;
            let response = if args.pending {
                newsletter.subscribe_pending(email, &options, list).await?
            } else {
                newsletter.subscribe(email, &options, list).await?
            };
            print_json(&response)
        }
        "subscribe-or-update" => {
            print_json(&newsletter.subscribe_or_update(email_arg(&args, 0)?, &options, list).await?)
        }
        "add-member" => print_json(&newsletter.add_member(email_arg(&args, 0)?, &options, list).await?),
        "unsubscribe" => print_json(&newsletter.unsubscribe(email_arg(&args, 0)?, list).await?),
        "delete" => print_json(&newsletter.delete(email_arg(&args, 0)?, list).await?),
        "member" => print_json(&newsletter.get_member(email_arg(&args, 0)?, list).await?),
        "members" => print_json(&newsletter.get_members(list, &options).await?),
        "activity" => print_json(&newsletter.get_member_activity(email_arg(&args, 0)?, list).await?),
        "has-member" => {
            println!("{}", newsletter.has_member(email_arg(&args, 0)?, list).await?);
            Ok(())
        }
        "is-subscribed" => {
            println!("{}", newsletter.is_subscribed(email_arg(&args, 0)?, list).await?);
            Ok(())
        }
        "update-email" => {
            let current = email_arg(&args, 0)?;
            let new = email_arg(&args, 1)?;
            print_json(&newsletter.update_email_address(current, new, list).await?)
        }
        other => bail!("Unknown command: {other}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    match raw.first().map(String::as_str) {
        None | Some("help" | "--help" | "-h") => {
            print_usage();
            return;
        }
        Some("version" | "--version" | "-V") => {
            println!("newsletter-cli {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    let result = match parse_args(&raw) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
