use adplace_core::{Ad, PageAssets, RenderOptions};

use crate::handler::{AdTypeHandler, missing_field};

const SCRIPT_KEY: &str = "lead_form";

const SUBMIT_SCRIPT: &str = r#"<script>document.addEventListener('submit',function(e){var f=e.target;if(!f.matches('form[data-lead-form]'))return;e.preventDefault();fetch(f.action,{method:'POST',body:new FormData(f)}).then(function(){f.innerHTML='<p>'+f.dataset.success+'</p>';});});</script>"#;

/// Lead-capture form posting to a configured endpoint
pub struct LeadFormHandler;

impl AdTypeHandler for LeadFormHandler {
    fn tag(&self) -> &'static str {
        "lead_form"
    }

    fn label(&self) -> &'static str {
        "Lead Form"
    }

    fn render(&self, ad: &Ad, options: &RenderOptions, assets: &mut PageAssets) -> String {
        let Some(action) = ad.payload_str("action") else {
            return missing_field(ad, "action");
        };

        let mut fields = ad.payload_list("fields");
        if fields.is_empty() {
            fields.push("email".to_string());
        }

        let mut html = format!(
            r#"<form class="{}" method="post" action="{}" data-lead-form="{}" data-success="{}">"#,
            options.class("lead-form"),
            action,
            ad.id,
            ad.payload_str("success_message").unwrap_or("Thanks!")
        );
        if let Some(heading) = ad.payload_str("heading") {
            html.push_str(&format!("<h3>{}</h3>", heading));
        }
        if let Some(description) = ad.payload_str("description") {
            html.push_str(&format!("<p>{}</p>", description));
        }
        for field in &fields {
            let input_type = if field == "email" { "email" } else { "text" };
            html.push_str(&format!(
                r#"<input type="{}" name="{}" placeholder="{}" required />"#,
                input_type, field, field
            ));
        }
        html.push_str(&format!(
            r#"<button type="submit">{}</button></form>"#,
            ad.payload_str("button_label").unwrap_or("Subscribe")
        ));

        assets.enqueue(SCRIPT_KEY, SUBMIT_SCRIPT);
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_email_field() {
        let ad = Ad::new(5, "lead_form")
            .with_payload("action", "/subscribe")
            .with_payload("heading", "Join us");
        let mut assets = PageAssets::new();
        let html = LeadFormHandler.render(&ad, &RenderOptions::new("adplace"), &mut assets);

        assert!(html.starts_with(r#"<form class="adplace-lead-form" method="post" action="/subscribe""#));
        assert!(html.contains("<h3>Join us</h3>"));
        assert!(html.contains(r#"<input type="email" name="email""#));
        assert!(html.contains(">Subscribe</button>"));
        assert!(assets.contains(SCRIPT_KEY));
    }

    #[test]
    fn test_custom_fields() {
        let ad = Ad::new(5, "lead_form")
            .with_payload("action", "/subscribe")
            .with_payload("fields", serde_json::json!(["name", "email"]))
            .with_payload("button_label", "Send");
        let html = LeadFormHandler.render(&ad, &RenderOptions::default(), &mut PageAssets::new());

        let name_at = html.find(r#"name="name""#).unwrap();
        let email_at = html.find(r#"name="email""#).unwrap();
        assert!(name_at < email_at);
        assert!(html.contains(">Send</button>"));
    }

    #[test]
    fn test_missing_action_renders_nothing() {
        let mut assets = PageAssets::new();
        let ad = Ad::new(5, "lead_form").with_payload("heading", "Join us");
        assert_eq!(LeadFormHandler.render(&ad, &RenderOptions::default(), &mut assets), "");
        assert!(!assets.contains(SCRIPT_KEY));
    }
}
