//! Device, login-state and role conditions

use adplace_core::{RequestContext, UserStatus, VisitorConditions};

use crate::Rejection;

pub fn check(conditions: &VisitorConditions, ctx: &RequestContext) -> Result<(), Rejection> {
    if !conditions.devices.is_empty() && !conditions.devices.contains(&ctx.device) {
        return Err(Rejection::Device);
    }

    let status_ok = match conditions.user_status {
        UserStatus::Any => true,
        UserStatus::LoggedIn => ctx.logged_in,
        UserStatus::LoggedOut => !ctx.logged_in,
    };
    if !status_ok {
        return Err(Rejection::LoginState);
    }

    // Anonymous visitors hold no roles, so a role list rejects them too
    if !conditions.roles.is_empty() && conditions.roles.is_disjoint(&ctx.roles) {
        return Err(Rejection::Role);
    }
    Ok(())
}
