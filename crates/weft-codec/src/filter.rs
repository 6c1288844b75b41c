//! Two-pass aligned-field filter.
//!
//! Every record is walked twice: once passing only alignment-tagged
//! fields, once passing everything else. The same ordered field list
//! drives both passes, so aligned segments form a stable leading group
//! without a second field list, and ordinary fields stay oblivious to
//! alignment.

use bytemuck::Pod;
use weft_buf::{ArrayView, ByteView, FixedView, ScatterView, TextView};

use crate::record::Record;
use crate::visit::Visit;

/// Pass filter wrapped around a concrete visitor.
///
/// `pass_aligned = true` forwards alignment-tagged primitives and
/// suppresses the rest; `pass_aligned = false` does the opposite.
/// Forwarded aligned fields reach the inner visitor de-tagged, through
/// the plain primitives.
pub struct AlignedFilter<'v, V> {
    inner: &'v mut V,
    pass_aligned: bool,
}

impl<'v, V> AlignedFilter<'v, V> {
    /// Wrap `inner` for one pass.
    #[inline(always)]
    pub fn new(inner: &'v mut V, pass_aligned: bool) -> Self {
        Self {
            inner,
            pass_aligned,
        }
    }
}

impl<'a, 'v, V: Visit<'a>> Visit<'a> for AlignedFilter<'v, V> {
    #[inline(always)]
    fn bytes(&mut self, view: &mut ByteView<'a>) {
        if !self.pass_aligned {
            self.inner.bytes(view);
        }
    }

    #[inline(always)]
    fn scatter(&mut self, view: &mut ScatterView<'a>) {
        if !self.pass_aligned {
            self.inner.scatter(view);
        }
    }

    #[inline(always)]
    fn aligned_bytes(&mut self, view: &mut ByteView<'a>) {
        if self.pass_aligned {
            self.inner.bytes(view);
        }
    }

    #[inline(always)]
    fn aligned_scatter(&mut self, view: &mut ScatterView<'a>) {
        if self.pass_aligned {
            self.inner.scatter(view);
        }
    }

    #[inline(always)]
    fn scalar<T: Pod>(&mut self, value: &mut T) {
        if !self.pass_aligned {
            self.inner.scalar(value);
        }
    }

    #[inline(always)]
    fn fixed<T: Pod>(&mut self, view: &mut FixedView<'a, T>) {
        if !self.pass_aligned {
            self.inner.fixed(view);
        }
    }

    #[inline(always)]
    fn array<T: Pod>(&mut self, view: &mut ArrayView<'a, T>) {
        if !self.pass_aligned {
            self.inner.array(view);
        }
    }

    #[inline(always)]
    fn text(&mut self, view: &mut TextView<'a>) {
        if !self.pass_aligned {
            self.inner.text(view);
        }
    }

    #[inline(always)]
    fn nested<R: Record<'a>>(&mut self, record: &mut R) {
        if !self.pass_aligned {
            self.inner.nested(record);
        }
    }
}
