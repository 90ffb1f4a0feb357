//! Engine lifetime ownership.
//!
//! The engine implementation is chosen once, at startup, by handing an [`EngineFactory`] to
//! [`EngineContext::new`]. There are no process-wide engine references: whoever owns the
//! context owns the engines.

use crate::engine::handle::EngineHandle;
use crate::foundation::core::ExecutionMode;
use crate::foundation::error::BridgeResult;

/// Builds engines for a given execution mode.
pub trait EngineFactory {
    /// Create a fresh engine for `mode`.
    fn create(&mut self, mode: ExecutionMode) -> BridgeResult<Box<dyn EngineHandle>>;
}

impl<F> EngineFactory for F
where
    F: FnMut(ExecutionMode) -> BridgeResult<Box<dyn EngineHandle>>,
{
    fn create(&mut self, mode: ExecutionMode) -> BridgeResult<Box<dyn EngineHandle>> {
        self(mode)
    }
}

/// Owns the preview engine and brackets final renders around it.
pub struct EngineContext {
    factory: Box<dyn EngineFactory>,
    preview: Option<Box<dyn EngineHandle>>,
}

impl EngineContext {
    /// Create the context and its preview engine.
    pub fn new(factory: impl EngineFactory + 'static) -> BridgeResult<Self> {
        let mut factory: Box<dyn EngineFactory> = Box::new(factory);
        let preview = factory.create(ExecutionMode::Preview)?;
        tracing::info!("preview engine created");
        Ok(Self {
            factory,
            preview: Some(preview),
        })
    }

    /// The live preview engine, if one is open.
    pub fn preview_mut(&mut self) -> Option<&mut (dyn EngineHandle + 'static)> {
        self.preview.as_deref_mut()
    }

    /// `true` while a preview engine is open.
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Close and drop the preview engine. Returns `false` when none was open.
    pub fn close_preview(&mut self) -> bool {
        let Some(mut preview) = self.preview.take() else {
            return false;
        };
        if let Err(e) = preview.close() {
            tracing::warn!(error = %e, "closing preview engine failed");
        }
        tracing::info!("preview engine closed");
        true
    }

    /// Recreate the preview engine if it is closed.
    pub fn resume_preview(&mut self) -> BridgeResult<()> {
        if self.preview.is_none() {
            self.preview = Some(self.factory.create(ExecutionMode::Preview)?);
            tracing::info!("preview engine recreated");
        }
        Ok(())
    }

    /// Run `render` on a dedicated final-render engine.
    ///
    /// The preview is closed before the render engine is created and recreated only after the
    /// render engine is closed, so the two never share the rendering context. The preview is
    /// resumed even when the render fails.
    pub fn render_final<T>(
        &mut self,
        render: impl FnOnce(&mut dyn EngineHandle) -> BridgeResult<T>,
    ) -> BridgeResult<T> {
        self.close_preview();

        let mut engine = match self.factory.create(ExecutionMode::Final) {
            Ok(engine) => engine,
            Err(e) => {
                self.resume_preview()?;
                return Err(e);
            }
        };
        let result = render(engine.as_mut());
        let closed = engine.close();
        drop(engine);

        let resumed = self.resume_preview();
        let value = result?;
        closed?;
        resumed?;
        Ok(value)
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        self.close_preview();
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
