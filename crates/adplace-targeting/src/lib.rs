//! Targeting evaluator
//!
//! `should_display(ad, ctx)` is the AND of four independent checks, run cheapest
//! first: schedule, display rule, visitor conditions, geo. The evaluator is pure;
//! callers may memoize verdicts for the duration of one request.

pub mod device;
pub mod display;
pub mod geo;
pub mod schedule;
pub mod visitor;

use adplace_core::{Ad, RequestContext};
use thiserror::Error;

pub use device::classify_user_agent;
pub use geo::{GeoProvider, StaticGeoProvider, resolve_country};

/// Why an ad is not eligible for this request
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("ad is disabled")]
    Disabled,

    #[error("schedule has not started yet")]
    NotStarted,

    #[error("schedule has ended")]
    Expired,

    #[error("not scheduled for this day of the week")]
    Weekday,

    #[error("outside the scheduled time window")]
    TimeWindow,

    #[error("page is excluded by the display rule")]
    Excluded,

    #[error("page is not included by the display rule")]
    NotIncluded,

    #[error("device not targeted")]
    Device,

    #[error("login state not targeted")]
    LoginState,

    #[error("visitor role not targeted")]
    Role,

    #[error("visitor country unknown")]
    UnknownCountry,

    #[error("visitor country not included")]
    CountryNotIncluded,

    #[error("visitor country excluded")]
    CountryExcluded,
}

/// Evaluate every check, returning the first that rejects
pub fn evaluate(ad: &Ad, ctx: &RequestContext) -> Result<(), Rejection> {
    if !ad.enabled {
        return Err(Rejection::Disabled);
    }
    schedule::check(&ad.schedule, ctx.now)?;
    display::check(&ad.display, &ctx.page)?;
    visitor::check(&ad.visitor, ctx)?;
    geo::check(&ad.geo, ctx.country.as_ref())?;
    Ok(())
}

pub fn should_display(ad: &Ad, ctx: &RequestContext) -> bool {
    match evaluate(ad, ctx) {
        Ok(()) => true,
        Err(rejection) => {
            tracing::debug!(ad = %ad.id, %rejection, "Ad rejected by targeting");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adplace_core::{
        CountryCode, DayOfWeek, DeviceClass, DisplayRule, GeoMode, GeoRule, Schedule, TaxonomyFilter,
        UserStatus, VisitorConditions,
    };
    use proptest::prelude::*;
    use time::macros::datetime;

    fn ctx() -> RequestContext {
        RequestContext::new(datetime!(2026-10-19 12:00))
    }

    #[test]
    fn test_unrestricted_ad_displays() {
        assert!(should_display(&Ad::new(1, "code"), &ctx()));
    }

    #[test]
    fn test_disabled_checked_first() {
        let mut ad = Ad::new(1, "code").disabled();
        ad.display = DisplayRule::Specific {
            include: TaxonomyFilter::default(),
        };
        assert_eq!(evaluate(&ad, &ctx()), Err(Rejection::Disabled));
    }

    fn device_strategy() -> impl Strategy<Value = DeviceClass> {
        prop_oneof![Just(DeviceClass::Desktop), Just(DeviceClass::Tablet), Just(DeviceClass::Mobile)]
    }

    prop_compose! {
        fn any_disabled_ad()(
            priority in -5i64..20,
            session_limit in proptest::option::of(-2i64..10),
            devices in proptest::collection::btree_set(device_strategy(), 0..3),
            logged_in_only in any::<bool>(),
            geo_enabled in any::<bool>(),
            exclude in any::<bool>(),
            show_unknown in any::<bool>(),
            countries in proptest::collection::btree_set("[A-Z]{2}", 0..4),
            specific in any::<bool>(),
            categories in proptest::collection::btree_set(0u64..20, 0..4),
            weekend_only in any::<bool>(),
        ) -> Ad {
            let mut ad = Ad::new(1, "code").with_priority(priority).disabled();
            ad.session_limit = session_limit;
            ad.visitor = VisitorConditions {
                devices,
                user_status: if logged_in_only { UserStatus::LoggedIn } else { UserStatus::Any },
                ..VisitorConditions::default()
            };
            ad.geo = GeoRule {
                enabled: geo_enabled,
                mode: if exclude { GeoMode::Exclude } else { GeoMode::Include },
                countries: countries.iter().map(|c| CountryCode::new(c)).collect(),
                show_unknown,
            };
            let filter = TaxonomyFilter { categories, ..TaxonomyFilter::default() };
            ad.display = if specific {
                DisplayRule::Specific { include: filter }
            } else {
                DisplayRule::All { exclude: filter }
            };
            if weekend_only {
                ad.schedule = Schedule {
                    days: [DayOfWeek::Saturday, DayOfWeek::Sunday].into_iter().collect(),
                    ..Schedule::default()
                };
            }
            ad
        }
    }

    proptest! {
        #[test]
        fn prop_disabled_never_displays(
            ad in any_disabled_ad(),
            country in proptest::option::of("[A-Z]{2}"),
            device in device_strategy(),
            logged_in in any::<bool>(),
        ) {
            let mut ctx = ctx().with_device(device).with_country(country.map(|c| CountryCode::new(&c)));
            ctx.logged_in = logged_in;
            prop_assert!(!should_display(&ad, &ctx));
        }
    }
}
