//! TOML fixtures describing one request and the ads it runs against

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use adplace_core::{Ad, CountryCode, DeviceClass, PageContext, RequestContext};
use adplace_storage::{MemoryAdStore, visitor_key};
use adplace_targeting::{StaticGeoProvider, classify_user_agent, resolve_country};
use anyhow::{Context, Result};
use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const NOW_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day] [hour]:[minute]");
const NOW_FORMAT_SECONDS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub request: RequestFixture,

    #[serde(default)]
    pub page: PageFixture,

    /// IP address to country code
    #[serde(default)]
    pub geo: BTreeMap<String, String>,

    #[serde(default)]
    pub ads: Vec<Ad>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestFixture {
    /// `YYYY-MM-DD HH:MM[:SS]` in site time, default now (UTC)
    pub now: Option<String>,
    pub device: Option<DeviceClass>,
    pub user_agent: Option<String>,
    pub logged_in: bool,
    pub roles: BTreeSet<String>,
    pub country: Option<CountryCode>,
    pub ip: Option<IpAddr>,
    pub page: PageContext,
}

/// Shape of the simulated page
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    pub content: String,
    pub archive_items: u32,
    pub comments: u32,
    pub forum_replies: u32,
    pub activity_entries: u32,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid fixture {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn store(&self) -> MemoryAdStore {
        MemoryAdStore::new(self.ads.clone())
    }

    pub fn geo_provider(&self) -> Result<StaticGeoProvider> {
        let mut provider = StaticGeoProvider::new();
        for (ip, country) in &self.geo {
            let ip: IpAddr = ip
                .parse()
                .with_context(|| format!("Invalid IP address in [geo]: {}", ip))?;
            provider = provider.with_entry(ip, country.as_str());
        }
        Ok(provider)
    }

    pub fn request_context(&self) -> Result<RequestContext> {
        let request = &self.request;

        let now = match &request.now {
            Some(text) => parse_now(text)?,
            None => {
                let now = OffsetDateTime::now_utc();
                PrimitiveDateTime::new(now.date(), now.time())
            }
        };

        // Explicit values win over derived ones
        let device = match (request.device, &request.user_agent) {
            (Some(device), _) => device,
            (None, Some(user_agent)) => classify_user_agent(user_agent),
            (None, None) => DeviceClass::default(),
        };

        let country = match (&request.country, request.ip) {
            (Some(country), _) => Some(country.clone()),
            (None, Some(ip)) => resolve_country(&self.geo_provider()?, ip),
            (None, None) => None,
        };

        let mut ctx = RequestContext::new(now)
            .with_page(request.page.clone())
            .with_device(device)
            .with_country(country);
        if request.logged_in {
            ctx = ctx.logged_in_as(request.roles.iter().cloned());
        }
        Ok(ctx)
    }

    pub fn visitor_key(&self) -> String {
        visitor_key(
            self.request.ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.request.user_agent.as_deref().unwrap_or_default(),
        )
    }
}

fn parse_now(text: &str) -> Result<PrimitiveDateTime> {
    let text = text.trim();
    PrimitiveDateTime::parse(text, NOW_FORMAT_SECONDS)
        .or_else(|_| PrimitiveDateTime::parse(text, NOW_FORMAT))
        .with_context(|| format!("Invalid request time '{}', expected YYYY-MM-DD HH:MM[:SS]", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adplace_core::AdId;
    use time::macros::datetime;

    const FIXTURE: &str = r#"
[request]
now = "2026-10-19 08:30"
user_agent = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148"
ip = "203.0.113.7"
logged_in = true
roles = ["subscriber"]

[request.page]
post_id = 42
categories = [3]

[page]
content = "<p>One</p><p>Two</p>"
comments = 4

[geo]
"203.0.113.7" = "de"

[[ads]]
id = 1
ad_type = "code"
priority = 12
payload = { code = "<b>hi</b>" }
placements = [{ placement = "after_paragraph", after = 1 }]
display = { mode = "specific", include = { categories = [3] } }
"#;

    #[test]
    fn test_parse_fixture() {
        let fixture = Fixture::parse(FIXTURE).unwrap();
        assert_eq!(fixture.page.comments, 4);
        assert_eq!(fixture.ads.len(), 1);

        let ad = &fixture.ads[0];
        assert_eq!(ad.id, AdId(1));
        assert_eq!(ad.priority.get(), 10);
        assert_eq!(ad.payload_str("code"), Some("<b>hi</b>"));
        assert_eq!(ad.assignment("after_paragraph").unwrap().position(), 1);
    }

    #[test]
    fn test_native_toml_schedule_dates() {
        let fixture = Fixture::parse(
            r#"
[[ads]]
id = 7
ad_type = "code"
schedule = { end_date = 2020-01-01, time_start = 08:00:00 }
"#,
        )
        .unwrap();

        let schedule = &fixture.ads[0].schedule;
        assert_eq!(schedule.end_date, Some(time::macros::date!(2020 - 01 - 01)));
        assert_eq!(schedule.time_start, Some(time::macros::time!(08:00)));
    }

    #[test]
    fn test_request_context_derives_device_and_country() {
        let ctx = Fixture::parse(FIXTURE).unwrap().request_context().unwrap();

        assert_eq!(ctx.now, datetime!(2026-10-19 08:30));
        assert_eq!(ctx.device, DeviceClass::Mobile);
        assert_eq!(ctx.country, Some(CountryCode::new("DE")));
        assert!(ctx.logged_in);
        assert!(ctx.roles.contains("subscriber"));
        assert_eq!(ctx.page.post_id, Some(42));
    }

    #[test]
    fn test_explicit_values_win() {
        let fixture = Fixture::parse(
            r#"
[request]
now = "2026-10-19 08:30:15"
device = "tablet"
user_agent = "iPhone Mobile"
country = "us"
ip = "203.0.113.7"

[geo]
"203.0.113.7" = "DE"
"#,
        )
        .unwrap();
        let ctx = fixture.request_context().unwrap();

        assert_eq!(ctx.now, datetime!(2026-10-19 08:30:15));
        assert_eq!(ctx.device, DeviceClass::Tablet);
        assert_eq!(ctx.country, Some(CountryCode::new("US")));
        assert!(!ctx.logged_in);
    }

    #[test]
    fn test_unknown_ip_is_unknown_country() {
        let fixture = Fixture::parse("[request]\nip = \"198.51.100.1\"\n").unwrap();
        assert_eq!(fixture.request_context().unwrap().country, None);
    }

    #[test]
    fn test_bad_time_is_an_error() {
        let fixture = Fixture::parse("[request]\nnow = \"yesterday\"\n").unwrap();
        assert!(fixture.request_context().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.toml");
        std::fs::write(&path, FIXTURE).unwrap();

        let fixture = Fixture::load(&path).unwrap();
        assert_eq!(fixture.visitor_key().len(), 32);
        assert!(Fixture::load(&dir.path().join("missing.toml")).is_err());
    }
}
