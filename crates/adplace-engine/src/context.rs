use adplace_adtypes::AdTypeRegistry;
use adplace_config::Config;
use adplace_core::RequestContext;
use adplace_inject::ParagraphSplicer;
use adplace_placements::{HookBindings, HostCapabilities, PlacementRegistry};
use adplace_storage::{AdStore, SessionStore};

use crate::session::RenderSession;

/// Process-wide engine state: configuration, registries and render point bindings
pub struct EngineContext {
    config: Config,
    host: HostCapabilities,
    ad_types: AdTypeRegistry,
    placements: PlacementRegistry,
    bindings: HookBindings,
    splicer: ParagraphSplicer,
}

impl EngineContext {
    /// Engine with every built-in ad type and placement
    pub fn new(config: Config) -> Self {
        Self::with_registries(config, AdTypeRegistry::with_builtin(), PlacementRegistry::with_builtin())
    }

    pub fn with_registries(config: Config, ad_types: AdTypeRegistry, placements: PlacementRegistry) -> Self {
        let host = HostCapabilities::from(&config.host);

        let mut bindings = HookBindings::new();
        placements.bind_available(&host, &mut bindings);

        let splicer = ParagraphSplicer::new(&config.content.paragraph_delimiter).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid paragraph delimiter, using </p>");
            ParagraphSplicer::default()
        });

        Self {
            config,
            host,
            ad_types,
            placements,
            bindings,
            splicer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &HostCapabilities {
        &self.host
    }

    pub fn ad_types(&self) -> &AdTypeRegistry {
        &self.ad_types
    }

    pub fn placements(&self) -> &PlacementRegistry {
        &self.placements
    }

    pub fn bindings(&self) -> &HookBindings {
        &self.bindings
    }

    pub fn splicer(&self) -> &ParagraphSplicer {
        &self.splicer
    }

    /// Open a render session. Reads the visitor's frequency state once.
    pub fn begin<'e>(
        &'e self,
        ctx: RequestContext,
        visitor_key: impl Into<String>,
        ads: &'e dyn AdStore,
        sessions: &'e dyn SessionStore,
    ) -> RenderSession<'e> {
        RenderSession::new(self, ctx, visitor_key.into(), ads, sessions)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
