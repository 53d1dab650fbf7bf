use std::path::{Path, PathBuf};

use adplace_config::Config;
use adplace_core::{Ad, RequestContext};
use adplace_engine::{EngineContext, Verdict};
use adplace_storage::{FileSessionStore, SessionStore};
use anyhow::Result;

use crate::fixture::Fixture;

/// Eligibility of one fixture ad, with the visitor's stored views
#[derive(Debug)]
struct AdReport {
    verdict: Verdict,
    views: u32,
}

pub fn handle(config: &Config, fixture_path: &Path, session_dir: Option<PathBuf>) -> Result<()> {
    let fixture = Fixture::load(fixture_path)?;
    let ctx = fixture.request_context()?;

    print_request(&ctx);

    if fixture.ads.is_empty() {
        println!("\nNo ads in fixture.");
        return Ok(());
    }

    let sessions = match session_dir {
        Some(dir) => FileSessionStore::new(dir)?,
        None => FileSessionStore::default_location()?,
    };
    let engine = EngineContext::new(config.clone());
    let reports = explain_all(&engine, &fixture, ctx, &sessions)?;

    match config.max_ads_per_page {
        0 => println!("  Page cap: unlimited"),
        cap => println!("  Page cap: {} ads", cap),
    }

    println!("\nAds ({}):", fixture.ads.len());
    for (ad, report) in fixture.ads.iter().zip(&reports) {
        let marker = if report.verdict == Verdict::Eligible { "✓" } else { "✗" };
        let title = if ad.title.is_empty() { "(untitled)" } else { ad.title.as_str() };

        println!(
            "  {} [{}] {} ({}, priority {}): {}",
            marker,
            ad.id,
            title,
            ad.ad_type,
            ad.priority.get(),
            report.verdict
        );
        println!("      session views: {}", describe_views(ad, report.views));
        if engine.ad_types().get(&ad.ad_type).is_none() {
            println!("      unknown ad type, renders nothing");
        }
        for assignment in &ad.placements {
            let status = match engine.placements().get(&assignment.placement) {
                None => "unknown placement",
                Some(p) if !p.is_available(engine.host()) => "unavailable on this host",
                Some(_) => "ok",
            };
            println!("      {}: {}", assignment.placement, status);
        }
    }

    Ok(())
}

fn print_request(ctx: &RequestContext) {
    println!("Request:");
    println!("  Time: {}", ctx.now);
    println!("  Device: {}", ctx.device);
    println!(
        "  Visitor: {}",
        if ctx.logged_in {
            format!("logged in ({})", ctx.roles.iter().cloned().collect::<Vec<_>>().join(", "))
        } else {
            "logged out".to_string()
        }
    );
    println!(
        "  Country: {}",
        ctx.country.as_ref().map_or("unknown".to_string(), |c| c.to_string())
    );
}

/// Verdicts in fixture order. Nothing is emitted, so nothing is written back.
fn explain_all(
    engine: &EngineContext,
    fixture: &Fixture,
    ctx: RequestContext,
    sessions: &dyn SessionStore,
) -> Result<Vec<AdReport>> {
    let store = fixture.store();
    let mut session = engine.begin(ctx, fixture.visitor_key(), &store, sessions);

    fixture
        .ads
        .iter()
        .map(|ad| -> Result<AdReport> {
            let verdict = session.explain(ad.id)?;
            let views = session.frequency().session_state().views(ad.id);
            Ok(AdReport { verdict, views })
        })
        .collect()
}

fn describe_views(ad: &Ad, views: u32) -> String {
    match ad.effective_session_limit() {
        Some(limit) => format!("{}/{}", views, limit),
        None => format!("{} (no limit)", views),
    }
}
