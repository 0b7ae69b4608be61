//! Render sequencing for interactive callers.
//!
//! Renders may resolve out of order when inputs change quickly. Every request takes a
//! [`RenderTicket`] from a shared [`RenderGate`]; a result is only delivered if no newer ticket
//! was issued in the meantime, so a stale frame can never replace a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::face::anchors::AnchorLocator;
use crate::foundation::core::Bitmap;
use crate::foundation::error::ShunneiResult;
use crate::render::compositor::{CompositeRenderer, CompositeSpec, ResolutionTier};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RenderGate {
    latest: AtomicU64,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request; every earlier ticket becomes stale.
    pub fn begin(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Pass `result` through only if `ticket` is still the latest request.
    pub fn accept<T>(&self, ticket: RenderTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            tracing::debug!(
                generation = ticket.0,
                latest = self.latest.load(Ordering::Acquire),
                "discarding stale render result"
            );
            None
        }
    }

    /// Take a ticket, render, and deliver the bitmap unless a newer request superseded it.
    ///
    /// Errors are returned regardless of staleness.
    pub fn render<L: AnchorLocator>(
        &self,
        renderer: &CompositeRenderer<L>,
        spec: &CompositeSpec<'_>,
    ) -> ShunneiResult<Option<Bitmap>> {
        let ticket = self.begin();
        let bitmap = renderer.render(spec)?;
        Ok(self.accept(ticket, bitmap))
    }
}

/// Preview and print composites of the same inputs, rendered concurrently.
#[derive(Clone, Debug, PartialEq)]
pub struct TierRenders {
    pub preview: Bitmap,
    pub print: Bitmap,
}

/// Render `spec` at both tiers' standard sizes on the rayon pool. Each render stays
/// single-threaded.
#[tracing::instrument(skip(renderer, spec))]
pub fn render_tiers<L: AnchorLocator>(
    renderer: &CompositeRenderer<L>,
    spec: &CompositeSpec<'_>,
) -> ShunneiResult<TierRenders> {
    let preview_spec = spec.at_tier(ResolutionTier::Preview);
    let print_spec = spec.at_tier(ResolutionTier::Print);
    let (preview, print) = rayon::join(
        || renderer.render(&preview_spec),
        || renderer.render(&print_spec),
    );
    Ok(TierRenders {
        preview: preview?,
        print: print?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
