//! One-shot SDK loading

use super::PlayerSdk;
use crate::{Error, Result};
use async_trait::async_trait;
use std::rc::Rc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Makes the SDK available, e.g. by injecting its script into the page
#[async_trait(?Send)]
pub trait ScriptLoader {
    async fn load(&self) -> Result<Rc<dyn PlayerSdk>>;
}

/// Guards a [`ScriptLoader`] so the underlying load runs at most once.
///
/// Every caller of [`SdkLoader::ensure_loaded`] after a successful load gets
/// the same SDK handle. A failed load is reported to the caller that ran it
/// and to every later caller, without loading again.
pub struct SdkLoader {
    loader: Box<dyn ScriptLoader>,
    sdk: OnceCell<Rc<dyn PlayerSdk>>,
    failure: OnceCell<String>,
}

impl SdkLoader {
    pub fn new(loader: impl ScriptLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            sdk: OnceCell::new(),
            failure: OnceCell::new(),
        }
    }

    /// Resolve the SDK, loading it on first use
    pub async fn ensure_loaded(&self) -> Result<Rc<dyn PlayerSdk>> {
        if let Some(reason) = self.failure.get() {
            debug!(reason = %reason, "SDK load failed earlier; not retrying");
            return Err(Error::LoadFailure(reason.clone()));
        }

        let result = self
            .sdk
            .get_or_try_init(|| async {
                info!("Loading player SDK");
                self.loader.load().await
            })
            .await;

        match result {
            Ok(sdk) => Ok(Rc::clone(sdk)),
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "Player SDK failed to load");
                let reason = match &err {
                    Error::LoadFailure(reason) => reason.clone(),
                    other => other.to_string(),
                };
                let _ = self.failure.set(reason);
                Err(err)
            }
        }
    }

    /// Whether the SDK has been loaded successfully
    pub fn is_loaded(&self) -> bool {
        self.sdk.initialized()
    }
}
