use crate::native::{DeviceContextOptions, Dpi};

const FALLBACK_FONT_ENV: &str = "PAINTBRIDGE_FALLBACK_FONT";
const DPI_ENV: &str = "PAINTBRIDGE_DPI";

/// Knobs shared by the paint engine and the render targets that own it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Face tried when the requested family cannot be resolved.
    pub fallback_font_family: String,
    /// DPI used by bitmap targets that are initialized lazily.
    pub default_dpi: Dpi,
    /// Pixel size used by bitmap targets that are initialized lazily.
    pub default_bitmap_size: (u32, u32),
    /// Options for the first device context a target creates.
    pub context_options: DeviceContextOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_font_family: "Arial".to_string(),
            default_dpi: Dpi::DEFAULT,
            default_bitmap_size: (100, 100),
            context_options: DeviceContextOptions::MultithreadedOptimizations,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `PAINTBRIDGE_FALLBACK_FONT` and `PAINTBRIDGE_DPI`.
    ///
    /// `PAINTBRIDGE_DPI` accepts either a single value or `x,y`. Malformed values are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(family) = std::env::var(FALLBACK_FONT_ENV) {
            let family = family.trim();
            if !family.is_empty() {
                config.fallback_font_family = family.to_string();
            }
        }
        if let Ok(raw) = std::env::var(DPI_ENV) {
            match parse_dpi(&raw) {
                Some(dpi) => config.default_dpi = dpi,
                None => tracing::warn!("ignoring malformed {DPI_ENV}={raw:?}"),
            }
        }
        config
    }

    pub fn with_fallback_font_family(mut self, family: impl Into<String>) -> Self {
        self.fallback_font_family = family.into();
        self
    }

    pub fn with_default_dpi(mut self, dpi: Dpi) -> Self {
        self.default_dpi = dpi;
        self
    }
}

fn parse_dpi(raw: &str) -> Option<Dpi> {
    let mut parts = raw.split(',').map(|part| part.trim().parse::<f32>());
    let x = parts.next()?.ok()?;
    let y = match parts.next() {
        Some(y) => y.ok()?,
        None => x,
    };
    if parts.next().is_some() || !(x > 0.0 && y > 0.0) {
        return None;
    }
    Some(Dpi::new(x, y))
}
