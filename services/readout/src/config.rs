//! Configuration loading for the readout binary.
//!
//! One YAML file holds the engine settings, the HTTP client settings and
//! the list of layers to probe.

use std::path::Path;

use anyhow::{bail, Context, Result};
use map_common::{TileLayer, UrlTemplate, BASE_TILE_SIZE};
use serde::Deserialize;
use tile_decoder::{EngineConfig, HttpFetcherConfig, PolicyOverride, RampKind};
use tracing::{debug, info};

/// Root of the readout YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadoutConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub http: HttpFetcherConfig,
    /// Bottom-most layer first
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

/// A probeable layer and how its tiles are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    #[serde(flatten)]
    pub layer: TileLayer,
    /// Minimum alpha of a data pixel; guessed from the URL when absent
    #[serde(default)]
    pub alpha_threshold: Option<u8>,
    /// Ramp the layer was drawn with; guessed from the URL when absent
    #[serde(default)]
    pub ramp: Option<RampKind>,
}

impl LayerConfig {
    pub fn policy(&self) -> PolicyOverride {
        PolicyOverride {
            alpha_threshold: self.alpha_threshold,
            ramp: self.ramp,
        }
    }
}

impl ReadoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ReadoutConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        info!(
            path = %path.display(),
            layers = config.layers.len(),
            search_radius = config.engine.search_radius,
            "Loaded readout config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.layers.iter().enumerate() {
            entry
                .layer
                .validate()
                .with_context(|| format!("layer {} ({})", i, entry.layer.id))?;

            if self.layers[..i].iter().any(|l| l.layer.id == entry.layer.id) {
                bail!("duplicate layer id: {}", entry.layer.id);
            }
        }
        Ok(())
    }

    /// Replace the configured layers with ad-hoc templates from the command line.
    pub fn with_templates(mut self, templates: &[String]) -> Result<Self> {
        if templates.is_empty() {
            return Ok(self);
        }

        self.layers = templates
            .iter()
            .enumerate()
            .map(|(i, template)| {
                let url_template = UrlTemplate::parse(template.as_str())
                    .with_context(|| format!("Invalid layer template: {}", template))?;
                let layer = TileLayer::new(format!("layer{}", i), url_template, BASE_TILE_SIZE)?;
                Ok(LayerConfig {
                    layer,
                    alpha_threshold: None,
                    ramp: None,
                })
            })
            .collect::<Result<_>>()?;

        debug!(layers = self.layers.len(), "Using layers from command line");
        Ok(self)
    }
}
