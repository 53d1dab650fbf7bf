use adplace_core::{Ad, PageAssets, RenderOptions};

use crate::handler::{AdTypeHandler, missing_field};

const LOADER_KEY: &str = "adsense";
const LOADER_SRC: &str = "https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js";

/// Third-party AdSense unit. The loader script is queued once per page.
pub struct AdsenseHandler;

impl AdTypeHandler for AdsenseHandler {
    fn tag(&self) -> &'static str {
        "adsense"
    }

    fn label(&self) -> &'static str {
        "AdSense"
    }

    fn render(&self, ad: &Ad, _options: &RenderOptions, assets: &mut PageAssets) -> String {
        let Some(client) = ad.payload_str("client") else {
            return missing_field(ad, "client");
        };
        let Some(slot) = ad.payload_str("slot") else {
            return missing_field(ad, "slot");
        };
        let format = ad.payload_str("format").unwrap_or("auto");
        let responsive = if ad.payload_bool("responsive") {
            r#" data-full-width-responsive="true""#
        } else {
            ""
        };

        assets.enqueue(
            LOADER_KEY,
            format!(
                r#"<script async src="{}?client={}" crossorigin="anonymous"></script>"#,
                LOADER_SRC, client
            ),
        );

        format!(
            concat!(
                r#"<ins class="adsbygoogle" style="display:block" data-ad-client="{}" data-ad-slot="{}" data-ad-format="{}"{}></ins>"#,
                "<script>(adsbygoogle = window.adsbygoogle || []).push({{}});</script>"
            ),
            client, slot, format, responsive
        )
    }
}
