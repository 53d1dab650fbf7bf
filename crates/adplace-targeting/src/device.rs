//! User agent to device class

use adplace_core::DeviceClass;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TABLET: Regex = Regex::new(r"(?i)ipad|tablet|kindle|silk|playbook").unwrap();
    static ref ANDROID: Regex = Regex::new(r"(?i)android").unwrap();
    static ref MOBILE: Regex =
        Regex::new(r"(?i)mobile|iphone|ipod|android|blackberry|opera mini|iemobile|windows phone").unwrap();
}

/// Classify a user agent as desktop, tablet or mobile
pub fn classify_user_agent(user_agent: &str) -> DeviceClass {
    // Android tablets omit "Mobile"; checked before MOBILE since iPads may claim it
    let android_tablet =
        ANDROID.is_match(user_agent) && !user_agent.to_ascii_lowercase().contains("mobile");

    if TABLET.is_match(user_agent) || android_tablet {
        DeviceClass::Tablet
    } else if MOBILE.is_match(user_agent) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}
