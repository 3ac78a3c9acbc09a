use crate::core::index::OutlineIndex;
use crate::error::NavigationError;
use crate::SourceRef;
use log::{debug, warn};

/// Host-side action that brings a document location into view (scroll, select).
pub trait NavigationBridge {
    fn navigate(&mut self, target: &SourceRef) -> anyhow::Result<()>;
}

/// Resolve `id` against the current outline and hand its location to the host.
///
/// Unknown ids are reported as unavailable rather than retried: ids from an earlier
/// build cannot be rediscovered.
pub fn navigate_to<B: NavigationBridge + ?Sized>(
    index: &OutlineIndex<'_>,
    id: &str,
    bridge: &mut B,
) -> Result<(), NavigationError> {
    let target = index.source_ref(id).map_err(|_| {
        warn!("navigation target {} is not in the current outline", id);
        NavigationError::TargetUnavailable { id: id.to_string() }
    })?;

    debug!("navigating to {} ({})", id, target);
    bridge.navigate(target).map_err(|e| NavigationError::Bridge {
        target: target.to_string(),
        message: e.to_string(),
    })
}
