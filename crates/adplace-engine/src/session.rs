//! One page render

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use adplace_core::{Ad, AdId, PageAssets, RenderOptions, RequestContext, SessionFrequencyState, StreamKind};
use adplace_frequency::{FrequencyManager, sort_by_priority, weighted_random};
use adplace_inject::{CountingRule, StreamCounter};
use adplace_placements::builtin::{AFTER_CONTENT, BEFORE_CONTENT, SHORTCODE};
use adplace_placements::{Cardinality, Placement, RenderPoint, SettingKind};
use adplace_storage::{AdStore, SessionStore, StorageError};
use adplace_targeting::Rejection;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::context::EngineContext;
use crate::error::{EngineError, Result};

/// Whether one ad may be shown right now, and if not, why
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    Rejected(Rejection),
    SessionLimit,
    PageLimit,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Eligible => f.write_str("eligible"),
            Verdict::Rejected(rejection) => write!(f, "{}", rejection),
            Verdict::SessionLimit => f.write_str("session view limit reached"),
            Verdict::PageLimit => f.write_str("page ad limit reached"),
        }
    }
}

/// Counting rule together with the placement that owns it
#[derive(Debug, Clone, Copy)]
struct StreamRule {
    rule: CountingRule,
    placement: &'static str,
}

/// One occurrence of a countable stream
#[derive(Debug)]
struct ActiveStream {
    counter: StreamCounter,
    rules: Vec<StreamRule>,
}

/// Per-request engine state. Created by `EngineContext::begin`, discarded after
/// `flush_frequency`.
pub struct RenderSession<'e> {
    engine: &'e EngineContext,
    ads: &'e dyn AdStore,
    sessions: &'e dyn SessionStore,
    visitor_key: String,
    ctx: RequestContext,
    frequency: FrequencyManager,
    streams: HashMap<StreamKind, ActiveStream>,
    assets: PageAssets,
    loaded: HashMap<AdId, Ad>,
    targeting: HashMap<AdId, std::result::Result<(), Rejection>>,
    rng: StdRng,
}

impl<'e> RenderSession<'e> {
    pub(crate) fn new(
        engine: &'e EngineContext,
        ctx: RequestContext,
        visitor_key: String,
        ads: &'e dyn AdStore,
        sessions: &'e dyn SessionStore,
    ) -> Self {
        let state = sessions.read(&visitor_key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Session state unavailable, starting empty");
            SessionFrequencyState::new()
        });
        tracing::debug!(visitor = %visitor_key, returning = !state.is_empty(), "Render session opened");

        Self {
            engine,
            ads,
            sessions,
            visitor_key,
            ctx,
            frequency: FrequencyManager::new(engine.config().max_ads_per_page, state),
            streams: HashMap::new(),
            assets: PageAssets::new(),
            loaded: HashMap::new(),
            targeting: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Make weighted picks reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn frequency(&self) -> &FrequencyManager {
        &self.frequency
    }

    /// Eligible ads for a placement, best first
    pub fn eligible_ads_for(&mut self, placement: &str) -> Vec<AdId> {
        let engine = self.engine;
        match engine.placements().get(placement) {
            None => {
                tracing::warn!(placement, "Unknown placement");
                return Vec::new();
            }
            Some(p) if !p.is_available(engine.host()) => {
                tracing::debug!(placement, "Placement unavailable on this host");
                return Vec::new();
            }
            Some(_) => {}
        }

        let ids = match self.ads.query_enabled_by_placement(placement) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(placement, error = %e, "Ad store query failed, no ads this request");
                return Vec::new();
            }
        };

        let mut eligible = Vec::with_capacity(ids.len());
        for id in ids {
            if let Err(e) = self.load(id) {
                tracing::warn!(ad = %id, error = %e, "Skipping ad that failed to load");
                continue;
            }
            if self.verdict(id) == Some(Verdict::Eligible) {
                eligible.push(id);
            }
        }

        let ads: Vec<&Ad> = eligible.iter().filter_map(|id| self.loaded.get(id)).collect();
        sort_by_priority(ads).into_iter().map(|ad| ad.id).collect()
    }

    /// One priority-weighted random pick among the eligible ads
    pub fn pick_one(&mut self, placement: &str) -> Option<AdId> {
        let eligible = self.eligible_ads_for(placement);
        let ads: Vec<&Ad> = eligible.iter().filter_map(|id| self.loaded.get(id)).collect();
        let picked = weighted_random(&ads, &mut self.rng).map(|ad| ad.id);
        tracing::debug!(placement, candidates = ads.len(), picked = ?picked, "Weighted pick");
        picked
    }

    /// Render markup for an ad loaded earlier in this render.
    ///
    /// Does not wrap, track or check eligibility; `place` does all of that.
    pub fn render(&mut self, id: AdId, options: &RenderOptions) -> Result<String> {
        let ad = self.loaded.get(&id).ok_or(EngineError::UnknownAd(id))?;
        Ok(self.engine.ad_types().render(ad, options, &mut self.assets))
    }

    /// Explain whether an ad would be shown right now
    pub fn explain(&mut self, id: AdId) -> Result<Verdict> {
        self.load(id).map_err(|e| match e {
            StorageError::AdNotFound(_) => EngineError::UnknownAd(id),
            other => other.into(),
        })?;
        self.verdict(id).ok_or(EngineError::UnknownAd(id))
    }

    /// Full decision for one placement: select, render, wrap and track
    pub fn place(&mut self, tag: &str) -> String {
        let engine = self.engine;
        let Some(placement) = engine.placements().get(tag) else {
            tracing::warn!(placement = tag, "Unknown placement");
            return String::new();
        };
        if let Some(kind) = placement.stream() {
            tracing::debug!(placement = tag, stream = %kind, "Counting placement fires per stream item");
            return String::new();
        }

        let chosen = match placement.cardinality() {
            Cardinality::All => self.eligible_ads_for(tag),
            Cardinality::One => self.pick_one(tag).into_iter().collect(),
        };

        let mut output = String::new();
        for id in chosen {
            output.push_str(&self.emit(placement, id));
        }
        output
    }

    /// Everything bound to a render point. The footer also carries queued assets.
    pub fn render_point(&mut self, point: RenderPoint) -> String {
        let engine = self.engine;
        let mut sections = Vec::new();

        match point {
            RenderPoint::ContentFilter => {
                tracing::warn!("Content is spliced with filter_content");
            }
            RenderPoint::ArchiveLoop
            | RenderPoint::CommentLoop
            | RenderPoint::ForumReplyLoop
            | RenderPoint::ActivityLoop => {
                tracing::warn!(?point, "Loop render points fire per item with stream_item");
            }
            _ => {
                for tag in engine.bindings().registered_at(point) {
                    let markup = self.place(tag);
                    if !markup.is_empty() {
                        sections.push(markup);
                    }
                }
            }
        }

        if point == RenderPoint::Footer {
            let assets = self.assets.drain();
            if !assets.is_empty() {
                sections.push(assets);
            }
        }
        sections.join("\n")
    }

    /// Queued supporting scripts, for hosts that emit them outside the footer
    pub fn take_assets(&mut self) -> String {
        self.assets.drain()
    }

    /// Filter post content: before/after content ads plus paragraph splicing
    pub fn filter_content(&mut self, content: &str) -> String {
        let engine = self.engine;
        let bound = engine.bindings();

        let before = if bound.is_bound(BEFORE_CONTENT) {
            self.place(BEFORE_CONTENT)
        } else {
            String::new()
        };

        let rules = self.stream_rules(StreamKind::Paragraph);
        let body = if rules.is_empty() {
            content.to_string()
        } else {
            let counting: Vec<CountingRule> = rules.iter().map(|r| r.rule).collect();
            let outcome = engine.splicer().splice(content, &counting, &mut |id: AdId| {
                match rules.iter().find(|r| r.rule.ad == id) {
                    Some(rule) => self.emit_for(rule.placement, id),
                    None => String::new(),
                }
            });
            tracing::debug!(emitted = outcome.emitted.len(), "Paragraph splice");
            outcome.content
        };

        let after = if bound.is_bound(AFTER_CONTENT) {
            self.place(AFTER_CONTENT)
        } else {
            String::new()
        };

        format!("{}{}{}", before, body, after)
    }

    /// Start a new occurrence of a loop stream. Counting starts at zero.
    pub fn begin_stream(&mut self, kind: StreamKind) {
        let rules = self.stream_rules(kind);
        tracing::debug!(stream = %kind, rules = rules.len(), "Stream started");
        self.streams.insert(
            kind,
            ActiveStream {
                counter: StreamCounter::new(kind),
                rules,
            },
        );
    }

    /// Replay the current stream from its first item. Non-repeating ads already
    /// shown in it are not shown again.
    pub fn rewind_stream(&mut self, kind: StreamKind) {
        if let Some(stream) = self.streams.get_mut(&kind) {
            stream.counter.rewind();
        }
    }

    /// Count one rendered item of a loop stream and return the ads to insert after it
    pub fn stream_item(&mut self, kind: StreamKind) -> String {
        if !self.streams.contains_key(&kind) {
            self.begin_stream(kind);
        }
        let fired: Vec<StreamRule> = match self.streams.get_mut(&kind) {
            Some(stream) => {
                let counting: Vec<CountingRule> = stream.rules.iter().map(|r| r.rule).collect();
                let ids = stream.counter.advance(&counting);
                ids.into_iter()
                    .filter_map(|id| stream.rules.iter().find(|r| r.rule.ad == id).copied())
                    .collect()
            }
            None => Vec::new(),
        };

        let mut output = String::new();
        for rule in fired {
            output.push_str(&self.emit_for(rule.placement, rule.rule.ad));
        }
        output
    }

    /// Shortcode output: an explicit ad, or a pick from the shortcode placement
    pub fn shortcode(&mut self, ad: Option<AdId>) -> String {
        let Some(id) = ad else {
            return self.place(SHORTCODE);
        };

        match self.explain(id) {
            Ok(Verdict::Eligible) => self.emit_for(SHORTCODE, id),
            Ok(verdict) => {
                tracing::debug!(ad = %id, %verdict, "Shortcode ad not shown");
                String::new()
            }
            Err(e) => {
                tracing::warn!(ad = %id, error = %e, "Shortcode references an unavailable ad");
                String::new()
            }
        }
    }

    /// Persist the views of this render. Call once, at the very end.
    ///
    /// Writes nothing when no ad was shown since the last flush.
    pub fn flush_frequency(&mut self) -> Result<()> {
        let Some(state) = self.frequency.flush() else {
            return Ok(());
        };
        let ttl = self.engine.config().frequency.session_ttl();
        self.sessions.write(&self.visitor_key, &state, ttl)?;
        tracing::debug!(visitor = %self.visitor_key, "Session frequency state flushed");
        Ok(())
    }

    fn load(&mut self, id: AdId) -> std::result::Result<(), StorageError> {
        if let Entry::Vacant(slot) = self.loaded.entry(id) {
            slot.insert(self.ads.get_ad(id)?);
        }
        Ok(())
    }

    fn verdict(&mut self, id: AdId) -> Option<Verdict> {
        let ad = self.loaded.get(&id)?;
        let targeting = *self.targeting.entry(id).or_insert_with(|| {
            let result = adplace_targeting::evaluate(ad, &self.ctx);
            if let Err(rejection) = result {
                tracing::debug!(ad = %id, %rejection, "Ad rejected by targeting");
            }
            result
        });

        Some(match targeting {
            Err(rejection) => Verdict::Rejected(rejection),
            Ok(()) if self.frequency.page_limit_reached() => Verdict::PageLimit,
            Ok(()) if !self.frequency.can_show(ad) => Verdict::SessionLimit,
            Ok(()) => Verdict::Eligible,
        })
    }

    /// Eligible ads of every bound placement consuming `kind`, in priority order
    fn stream_rules(&mut self, kind: StreamKind) -> Vec<StreamRule> {
        let engine = self.engine;
        let mut entries: Vec<(AdId, &'static str)> = Vec::new();
        for placement in engine.placements().for_stream(kind) {
            if !engine.bindings().is_bound(placement.tag()) {
                continue;
            }
            for id in self.eligible_ads_for(placement.tag()) {
                entries.push((id, placement.tag()));
            }
        }

        let mut ads: Vec<(&Ad, &'static str)> = entries
            .into_iter()
            .filter_map(|(id, tag)| self.loaded.get(&id).map(|ad| (ad, tag)))
            .collect();
        ads.sort_by_key(|(ad, _)| std::cmp::Reverse(ad.priority));

        ads.into_iter()
            .map(|(ad, tag)| {
                let rule = match ad.assignment(tag) {
                    Some(assignment) => CountingRule::from_assignment(ad.id, assignment),
                    None => CountingRule::new(ad.id, 1, false),
                };
                StreamRule { rule, placement: tag }
            })
            .collect()
    }

    fn emit_for(&mut self, tag: &str, id: AdId) -> String {
        let engine = self.engine;
        match engine.placements().get(tag) {
            Some(placement) => self.emit(placement, id),
            None => String::new(),
        }
    }

    /// Render one ad into a placement and track it. Re-checks the page cap.
    fn emit(&mut self, placement: &dyn Placement, id: AdId) -> String {
        if self.frequency.page_limit_reached() {
            tracing::debug!(ad = %id, placement = placement.tag(), "Page ad limit reached");
            return String::new();
        }

        let options = self.render_options(placement.tag());
        let markup = match self.render(id, &options) {
            Ok(markup) => markup,
            Err(e) => {
                tracing::warn!(ad = %id, error = %e, "Render failed");
                return String::new();
            }
        };
        if markup.is_empty() {
            return String::new();
        }

        self.frequency.track_shown(id);
        self.wrap(placement, id, markup)
    }

    fn render_options(&self, placement: &str) -> RenderOptions {
        RenderOptions::new(self.engine.config().markup.class_prefix.clone()).for_placement(placement)
    }

    fn wrap(&self, placement: &dyn Placement, id: AdId, markup: String) -> String {
        let markup_config = &self.engine.config().markup;
        if !markup_config.wrapper || !placement.wraps_output() {
            return markup;
        }

        let prefix = &markup_config.class_prefix;
        // Counting settings are consumed by the stream counter, not the markup
        let settings = match placement.stream() {
            Some(_) => &[][..],
            None => placement.settings(),
        };
        let mut attributes = String::new();
        for setting in settings {
            let configured = self
                .loaded
                .get(&id)
                .and_then(|ad| ad.assignment(placement.tag()))
                .and_then(|assignment| assignment.options.get(setting.key));
            let value = match (setting.kind, configured) {
                (SettingKind::Integer { min, .. }, Some(v)) => v
                    .as_u64()
                    .map(|n| n.max(u64::from(min)).to_string()),
                (SettingKind::Bool { .. }, Some(v)) => v.as_bool().map(|b| b.to_string()),
                (SettingKind::Integer { default, .. }, None) => Some(default.to_string()),
                (SettingKind::Bool { default }, None) => Some(default.to_string()),
            };
            if let Some(value) = value {
                attributes.push_str(&format!(r#" data-{}="{}""#, setting.key, value));
            }
        }

        format!(
            r#"<div class="{prefix} {prefix}-{tag}" data-ad-id="{id}"{attributes}>{markup}</div>"#,
            prefix = prefix,
            tag = placement.tag(),
            id = id,
            attributes = attributes,
            markup = markup,
        )
    }
}
