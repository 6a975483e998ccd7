use chrono::Utc;
use clap::Parser;
use folio_context::{greeting, PageSession, UserContext, WeatherScene};
use folio_core::{AppError, Config};

#[derive(Parser, Debug)]
#[command(name = "folio", about = "Detect the visitor context for the portfolio page")]
struct Args {
    /// Print the resolved context as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = folio_core::init() {
        eprintln!("{e}");
    }

    if let Err(e) = run(args.json).await {
        tracing::error!("Folio failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(json: bool) -> Result<(), AppError> {
    let (config, _) = Config::load_validated()?;

    let session = PageSession::open(&config)?;
    session.start().await;

    let ctx = session.store().snapshot();
    if json {
        let body = serde_json::to_string_pretty(&ctx).map_err(anyhow::Error::from)?;
        println!("{body}");
    } else {
        print_summary(&ctx);
    }

    session.close();
    Ok(())
}

fn print_summary(ctx: &UserContext) {
    let now = Utc::now();
    let unknown = || "unavailable".to_string();

    println!("{}", greeting::compose(ctx, now));
    println!();
    println!(
        "  City:     {}",
        ctx.city.as_ref().map(|c| c.label()).unwrap_or_else(unknown)
    );
    println!(
        "  Timezone: {}",
        ctx.timezone
            .as_ref()
            .map(|tz| format!("{} ({})", tz.name, tz.local_time(now).format("%H:%M")))
            .unwrap_or_else(unknown)
    );
    println!(
        "  Language: {}",
        ctx.language.as_ref().map(|l| l.tag()).unwrap_or_else(unknown)
    );
    println!(
        "  Weather:  {}",
        ctx.weather
            .as_ref()
            .map(|w| format!(
                "{:.0}{} {}",
                w.temperature,
                w.unit.symbol(),
                w.condition.description()
            ))
            .unwrap_or_else(unknown)
    );
    println!("  Scene:    {}", WeatherScene::from_context(ctx, now).css_class());
}
