use adplace_core::{Ad, PageAssets, RenderOptions};

use crate::handler::{AdTypeHandler, missing_field};

/// Raw HTML/JS emitted verbatim
pub struct CodeHandler;

impl AdTypeHandler for CodeHandler {
    fn tag(&self) -> &'static str {
        "code"
    }

    fn label(&self) -> &'static str {
        "Code"
    }

    fn render(&self, ad: &Ad, _options: &RenderOptions, _assets: &mut PageAssets) -> String {
        // Untrimmed: whitespace can matter inside inline scripts
        match ad.payload.get("code").and_then(|v| v.as_str()) {
            Some(code) if !code.trim().is_empty() => code.to_string(),
            _ => missing_field(ad, "code"),
        }
    }
}
