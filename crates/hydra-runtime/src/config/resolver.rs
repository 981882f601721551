//! Final override layer applied after [`ConfigLoader`](super::ConfigLoader).
//!
//! ```text
//! ConfigLoader.load()  →  HydraConfig (files + env)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()   (CLI flags)
//!                              │
//!                              ▼
//!                     HydraConfig (final)
//! ```

use super::HydraConfig;

/// Applies overrides that outrank every file and environment layer.
pub trait ConfigResolver {
    /// Applies overrides to the given configuration.
    ///
    /// Only values the caller actually specified should be applied.
    fn apply(&self, config: &mut HydraConfig);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_resolver() {
        struct DepthFlag(Option<usize>);

        impl ConfigResolver for DepthFlag {
            fn apply(&self, config: &mut HydraConfig) {
                if let Some(depth) = self.0 {
                    config.engine.max_dispatch_depth = depth;
                }
            }
        }

        let mut config = HydraConfig::default();
        DepthFlag(None).apply(&mut config);
        assert_eq!(config.engine.max_dispatch_depth, 8);

        DepthFlag(Some(2)).apply(&mut config);
        assert_eq!(config.engine.max_dispatch_depth, 2);
    }
}
