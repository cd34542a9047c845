use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bravery_core::{
    format_cost, load_session, BraverySettings, CopyOutcome, NoClipboard, Session,
    DEFAULT_API_BASE,
};

#[derive(Debug, Parser)]
#[command(name = "deadlock-bravery", version, about = "Random Deadlock hero and item loadouts")]
struct Args {
    /// Seed for a reproducible draw.
    #[arg(long)]
    seed: Option<u64>,

    /// Shared link to open, e.g. https://deadlock-bravery.app/?hero=Abrams
    #[arg(long)]
    link: Option<String>,

    /// Show this hero instead of drawing one from the pool.
    #[arg(long, conflicts_with = "pool")]
    hero: Option<String>,

    /// Comma separated hero names or ids to draw from (default: every hero).
    #[arg(long, value_delimiter = ',')]
    pool: Vec<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    #[arg(long, default_value = bravery_core::link::DEFAULT_SHARE_BASE)]
    share_base: String,

    /// JSON file of {"name", "cost"} rows replacing the built-in item table.
    #[arg(long, value_name = "JSON")]
    item_allowlist: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn restrict_pool(session: &mut Session, wanted: &[String]) {
    session.deselect_all();
    for key in wanted {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        // Names are friendlier on the command line; unknown keys go in as-is.
        let id = session
            .roster()
            .find(key)
            .map(|hero| hero.id.clone())
            .unwrap_or_else(|| key.to_string());
        if !session.pool().contains(&id) {
            session.toggle(&id);
        }
    }
}

fn print_text(session: &Session, link: &CopyOutcome) {
    let hero = session
        .active_hero()
        .map(|h| h.name.clone())
        .or_else(|| session.active_hero_id().map(str::to_string))
        .unwrap_or_else(|| "(none)".to_string());
    println!("Hero: {hero}");

    if let Some(result) = session.last_draw() {
        for (i, (entry, locked)) in result.slots().enumerate() {
            let marker = if locked { " [locked]" } else { "" };
            println!(
                "{:>2}. {:<28} {:<8} {:>6}{marker}",
                i + 1,
                entry.label(),
                entry.slot,
                format_cost(entry.cost),
            );
        }
        println!("Total: {}", format_cost(result.total_cost()));
    }

    println!("Link: {}", link.link());
}

fn print_json(session: &Session, link: &CopyOutcome) -> serde_json::Result<()> {
    let items: Vec<_> = session
        .last_draw()
        .map(|result| {
            result
                .slots()
                .map(|(entry, locked)| serde_json::json!({ "item": entry, "locked": locked }))
                .collect()
        })
        .unwrap_or_default();

    let out = serde_json::json!({
        "hero": session.active_hero_id(),
        "hero_name": session.active_hero().map(|h| &h.name),
        "items": items,
        "link": link.link(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,bravery_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = BraverySettings {
        seed: args.seed,
        api_base_url: args.api_base,
        share_base_url: args.share_base,
        item_allowlist_path: args.item_allowlist,
        link: args.link,
    };

    let mut session = match load_session(&settings).await {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if let Some(hero) = args.hero.as_deref() {
        let id = session
            .roster()
            .find(hero)
            .map(|h| h.id.clone())
            .unwrap_or_else(|| hero.to_string());
        session.choose_hero(&id);
    } else if !args.pool.is_empty() {
        restrict_pool(&mut session, &args.pool);
    }

    let drawn = if args.hero.is_some() {
        session.reroll_items().map(|_| ())
    } else {
        session.randomize().map(|_| ())
    };
    if let Err(err) = drawn {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    // No clipboard from a terminal; the link is printed for manual copying.
    let link = session.copy_link(&mut NoClipboard);

    if args.json {
        if let Err(err) = print_json(&session, &link) {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    } else {
        print_text(&session, &link);
    }
}
