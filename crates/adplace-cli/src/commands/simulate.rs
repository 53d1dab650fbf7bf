use std::path::{Path, PathBuf};

use adplace_config::Config;
use adplace_core::StreamKind;
use adplace_engine::{EngineContext, RenderSession};
use adplace_placements::RenderPoint;
use adplace_storage::FileSessionStore;
use anyhow::Result;
use serde::Serialize;

use crate::fixture::Fixture;

/// Markup inserted after one stream item
#[derive(Debug, Serialize)]
struct StreamInsert {
    after: u32,
    markup: String,
}

#[derive(Debug, Default, Serialize)]
struct SimulatedPage {
    head: String,
    content: String,
    archive: Vec<StreamInsert>,
    comments: Vec<StreamInsert>,
    forum_replies: Vec<StreamInsert>,
    activity: Vec<StreamInsert>,
    widget: String,
    shortcode: String,
    footer: String,
    ads_shown: usize,
}

pub fn handle(
    config: &Config,
    fixture_path: &Path,
    seed: Option<u64>,
    session_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let fixture = Fixture::load(fixture_path)?;
    let ctx = fixture.request_context()?;

    let engine = EngineContext::new(config.clone());
    let store = fixture.store();
    let sessions = match session_dir {
        Some(dir) => FileSessionStore::new(dir)?,
        None => FileSessionStore::default_location()?,
    };

    let mut session = engine.begin(ctx, fixture.visitor_key(), &store, &sessions);
    if let Some(seed) = seed {
        session = session.with_seed(seed);
    }

    // Same order a host emits a page in
    let layout = &fixture.page;
    let mut page = SimulatedPage {
        head: session.render_point(RenderPoint::Head),
        content: session.filter_content(&layout.content),
        ..SimulatedPage::default()
    };
    page.archive = run_stream(&mut session, StreamKind::Archive, layout.archive_items);
    page.comments = run_stream(&mut session, StreamKind::Comment, layout.comments);
    page.forum_replies = run_stream(&mut session, StreamKind::ForumReply, layout.forum_replies);
    page.activity = run_stream(&mut session, StreamKind::Activity, layout.activity_entries);
    page.widget = session.render_point(RenderPoint::WidgetSlot);
    page.shortcode = session.shortcode(None);
    page.footer = session.render_point(RenderPoint::Footer);
    page.ads_shown = session.frequency().shown_count();

    session.flush_frequency()?;
    tracing::info!(sessions = %sessions.root().display(), "Session state saved");

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_page(&page);
    }
    Ok(())
}

fn run_stream(session: &mut RenderSession<'_>, kind: StreamKind, items: u32) -> Vec<StreamInsert> {
    if items == 0 {
        return Vec::new();
    }
    session.begin_stream(kind);
    (1..=items)
        .filter_map(|after| {
            let markup = session.stream_item(kind);
            (!markup.is_empty()).then_some(StreamInsert { after, markup })
        })
        .collect()
}

fn print_page(page: &SimulatedPage) {
    print_section("Head", &page.head);
    print_section("Content", &page.content);
    print_stream("Archive", &page.archive);
    print_stream("Comments", &page.comments);
    print_stream("Forum replies", &page.forum_replies);
    print_stream("Activity", &page.activity);
    print_section("Widget", &page.widget);
    print_section("Shortcode", &page.shortcode);
    print_section("Footer", &page.footer);
    println!("Ads shown: {}", page.ads_shown);
}

fn print_section(name: &str, markup: &str) {
    if markup.is_empty() {
        return;
    }
    println!("== {} ==", name);
    println!("{}\n", markup);
}

fn print_stream(name: &str, inserts: &[StreamInsert]) {
    if inserts.is_empty() {
        return;
    }
    println!("== {} ==", name);
    for insert in inserts {
        println!("  after item {}: {}", insert.after, insert.markup);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use adplace_storage::MemorySessionStore;

    #[test]
    fn test_run_stream_positions() {
        let fixture = Fixture::parse(
            r#"
[request]
now = "2026-10-19 12:00"

[[ads]]
id = 1
ad_type = "code"
payload = { code = "[ad]" }
placements = [{ placement = "archive_between_posts", after = 2, repeat = true }]
"#,
        )
        .unwrap();
        let engine = EngineContext::new(Config::default());
        let store = fixture.store();
        let sessions = MemorySessionStore::new();
        let mut session = engine.begin(fixture.request_context().unwrap(), "v", &store, &sessions);

        let inserts = run_stream(&mut session, StreamKind::Archive, 5);
        let positions: Vec<u32> = inserts.iter().map(|i| i.after).collect();
        assert_eq!(positions, vec![2, 4]);
        assert!(inserts[0].markup.contains("[ad]"));
        assert!(run_stream(&mut session, StreamKind::Comment, 0).is_empty());
    }
}
