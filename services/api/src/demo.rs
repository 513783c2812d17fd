use crate::infra::LogNotificationSink;
use berth_match::catalog::SyntheticCatalog;
use berth_match::error::AppError;
use berth_match::feed::{ContactIdentity, Decision, FeedHub, ScoringEngine, SearchPreferences};
use chrono::{DateTime, Utc};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// RNG seed driving retrieval jitter, so runs are repeatable.
    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,
    /// Number of feed pages to swipe through.
    #[arg(long, default_value_t = 4)]
    pub(crate) rounds: u32,
}

/// Walks a scripted member through the feed: swipe every card on a few
/// pages, accepting wishlist builders, then print what the engine learned.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { seed, rounds } = args;

    let preferences = SearchPreferences::default();
    let hub = FeedHub::with_engine(
        Arc::new(SyntheticCatalog),
        Arc::new(LogNotificationSink),
        ScoringEngine::new(preferences.clone()),
    )
    .seeded(seed);
    let session = hub.session("demo");
    session.set_identity(ContactIdentity {
        name: "Demo Member".to_string(),
        email: "demo@example.com".to_string(),
        phone: String::new(),
    });

    println!("Swipe session demo (seed {seed})");

    for round in 1..=rounds {
        let batch = session.next_batch(round).await;
        println!(
            "\nPage {round}: phase {} | source {} | {} cards",
            batch.phase.label(),
            batch.source.label(),
            batch.boats.len()
        );
        if batch.exhausted {
            println!("  catalog exhausted; ending the session early");
            break;
        }

        for boat in &batch.boats {
            let wishlisted = preferences
                .preferred_brands
                .iter()
                .any(|brand| brand == &boat.builder);
            let decision = if wishlisted && !session.daily().cap_reached {
                Decision::Accept
            } else {
                Decision::Reject
            };

            match session.record_swipe(&boat.id, decision).await {
                Ok(receipt) => {
                    println!(
                        "  {:>6} {} | € {:.0} | {} | listed {}",
                        receipt.decision.label(),
                        boat.headline(),
                        boat.sell_price,
                        boat.city.as_deref().unwrap_or("unknown harbor"),
                        listing_age(boat.listed_at),
                    );
                    if receipt.decision.is_accept() && receipt.cap_reached {
                        println!(
                            "         daily accept cap reached ({}/{})",
                            receipt.accepts_today, receipt.daily_cap
                        );
                    }
                }
                Err(err) => println!("  swipe failed: {err}"),
            }
        }
    }

    let stats = session.engagement();
    let daily = session.daily();
    println!("\nSession summary");
    println!(
        "- {} swipes | {} accepts | {} rejects | phase {}",
        stats.total_swipes,
        stats.accepts,
        stats.rejects,
        stats.phase.label()
    );
    println!("- Daily accepts {}/{}", daily.accepts_today, daily.daily_cap);

    match session.learned() {
        Some(profile) => {
            println!("- Learned profile:");
            println!("    brands: {}", profile.brands.join(", "));
            if !profile.boat_types.is_empty() {
                println!("    boat types: {}", profile.boat_types.join(", "));
            }
            if !profile.families.is_empty() {
                println!("    families: {}", profile.families.join(", "));
            }
            if !profile.countries.is_empty() {
                println!("    countries: {}", profile.countries.join(", "));
            }
            println!("    average price: € {:.0}", profile.average_price);
            if profile.average_length > 0.0 {
                println!("    average length: {:.1} m", profile.average_length);
            }
            println!("    average build year: {:.0}", profile.average_year);
        }
        None => println!("- Learned profile: not enough accepts yet"),
    }

    Ok(())
}

fn listing_age(listed_at: Option<DateTime<Utc>>) -> String {
    match listed_at {
        Some(timestamp) => {
            let days = (Utc::now() - timestamp).num_days().max(0);
            format!("{days} days ago")
        }
        None => "recently".to_string(),
    }
}
